//! Binary entry point for the netindex inspection CLI.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use netindex::{
    cli::{load_network, CliError},
    index::{NetworkSnapshot, SnapshotOptions},
    primitives::buffer::Shared,
    review::{spawn_review, ReviewReport},
};

#[derive(Parser, Debug)]
#[command(
    name = "netindex",
    version,
    about = "Build and query binary indexes of a pipe network",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Show asset counts and encoded buffer sizes")]
    Stats {
        #[arg(value_name = "CSV")]
        network: PathBuf,
    },

    #[command(about = "Report orphan and unsupplied nodes")]
    Review {
        #[arg(value_name = "CSV")]
        network: PathBuf,
    },

    #[command(about = "List the links attached to a node")]
    Links {
        #[arg(value_name = "CSV")]
        network: PathBuf,
        #[arg(value_name = "NODE")]
        node: i64,
    },

    #[command(about = "Show the endpoints of a link")]
    Nodes {
        #[arg(value_name = "CSV")]
        network: PathBuf,
        #[arg(value_name = "LINK")]
        link: i64,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct StatsReport {
    nodes: usize,
    links: usize,
    asset_index_bytes: usize,
    asset_type_bytes: usize,
    topology_bytes: usize,
    total_bytes: usize,
}

#[derive(Serialize)]
struct LinksReport {
    node: i64,
    links: Vec<u32>,
}

#[derive(Serialize)]
struct NodesReport {
    link: i64,
    start: u32,
    end: u32,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn snapshot_of(
    path: &Path,
    opts: &SnapshotOptions,
) -> Result<NetworkSnapshot<bytes::Bytes>, Box<dyn Error>> {
    let (network, _) = load_network(path)?;
    Ok(network.snapshot::<Shared>(opts)?)
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    // the CSV loader already rejects links whose endpoints are not nodes
    let opts = SnapshotOptions::default();

    match cli.command {
        Command::Stats { network } => {
            let snapshot = snapshot_of(&network, &opts)?;
            let report = StatsReport {
                nodes: snapshot.node_count(),
                links: snapshot.link_count(),
                asset_index_bytes: snapshot.asset_index_bytes(),
                asset_type_bytes: snapshot.asset_type_bytes(),
                topology_bytes: snapshot.topology_bytes(),
                total_bytes: snapshot.byte_size(),
            };
            emit(&cli.format, &report, |_| print_stats_text(&report))?;
        }
        Command::Review { network } => {
            let snapshot = snapshot_of(&network, &opts)?;
            let report = spawn_review(snapshot)
                .join()
                .map_err(|_| CliError::from("review worker panicked"))??;
            emit(&cli.format, &report, |_| print_review_text(&report))?;
        }
        Command::Links { network, node } => {
            let snapshot = snapshot_of(&network, &opts)?;
            let links = snapshot.topology_view().get_links(node)?;
            let report = LinksReport {
                node,
                links: links.into_iter().map(u32::from).collect(),
            };
            emit(&cli.format, &report, |_| {
                let joined: Vec<String> = report.links.iter().map(u32::to_string).collect();
                println!("{}", joined.join(" "));
            })?;
        }
        Command::Nodes { network, link } => {
            let snapshot = snapshot_of(&network, &opts)?;
            let [start, end] = snapshot.topology_view().get_nodes(link)?;
            let report = NodesReport {
                link,
                start: start.0,
                end: end.0,
            };
            emit(&cli.format, &report, |_| {
                println!("{} {}", report.start, report.end)
            })?;
        }
    }
    Ok(())
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_stats_text(report: &StatsReport) {
    println!("Assets: nodes={} links={}", report.nodes, report.links);
    println!(
        "Buffers: asset_index={} asset_type={} topology={} total={}",
        report.asset_index_bytes, report.asset_type_bytes, report.topology_bytes, report.total_bytes
    );
}

fn print_review_text(report: &ReviewReport) {
    println!(
        "Network: nodes={} links={} sources={}",
        report.nodes, report.links, report.sources
    );
    println!("Orphan nodes: {}", join_ids(&report.orphan_nodes));
    println!("Unsupplied nodes: {}", join_ids(&report.unsupplied_nodes));
}

fn join_ids(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
