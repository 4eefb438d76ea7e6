use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::debug;

use crate::model::Network;
use crate::types::{AssetId, AssetType, IndexError, InternalId};

/// Error type for CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// A network file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// CSV parsing error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// Index layer error.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        CliError::Message(value.to_string())
    }
}

/// Counts from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Nodes added.
    pub nodes: usize,
    /// Links added.
    pub links: usize,
}

struct Columns {
    id: usize,
    ty: usize,
    start: usize,
    end: usize,
}

struct LinkRow {
    line: u64,
    id: InternalId,
    ty: crate::types::LinkType,
    start: InternalId,
    end: InternalId,
}

/// Loads a network from a CSV file with columns `id,type,start,end`.
///
/// Node rows leave `start` and `end` empty. Links may reference nodes that
/// appear later in the file.
pub fn load_network(path: impl AsRef<Path>) -> Result<(Network, ImportSummary), CliError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_network_from_reader(file)
}

/// Loads a network from CSV text.
pub fn load_network_from_reader<R: io::Read>(
    input: R,
) -> Result<(Network, ImportSummary), CliError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let cols = Columns {
        id: find_column(&headers, "id")?,
        ty: find_column(&headers, "type")?,
        start: find_column(&headers, "start")?,
        end: find_column(&headers, "end")?,
    };

    let mut network = Network::new();
    let mut summary = ImportSummary::default();
    let mut links = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |pos| pos.line());
        let id = parse_id(get_required(&record, cols.id, "id")?, line)?;
        let ty: AssetType = get_required(&record, cols.ty, "type")?
            .parse()
            .map_err(|err| at_line(line, err))?;
        match ty {
            AssetType::Node(node) => {
                network
                    .add_node(id, node)
                    .map_err(|err| at_line(line, err))?;
                summary.nodes += 1;
            }
            AssetType::Link(link) => links.push(LinkRow {
                line,
                id,
                ty: link,
                start: parse_id(get_required(&record, cols.start, "start")?, line)?,
                end: parse_id(get_required(&record, cols.end, "end")?, line)?,
            }),
        }
    }

    for row in links {
        network
            .add_link(row.id, row.ty, row.start, row.end)
            .map_err(|err| at_line(row.line, err))?;
        summary.links += 1;
    }

    debug!(nodes = summary.nodes, links = summary.links, "cli.import.done");
    Ok((network, summary))
}

fn at_line(line: u64, err: IndexError) -> CliError {
    CliError::Message(format!("line {line}: {err}"))
}

fn parse_id(raw: &str, line: u64) -> Result<InternalId, CliError> {
    AssetId::new(raw)
        .internal_id()
        .map_err(|err| at_line(line, err))
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, CliError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| CliError::Message(format!("column '{}' not found", name)))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, CliError> {
    record
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::Message(format!("missing value for column '{}'", name)))
}
