#![forbid(unsafe_code)]

//! Command-line support: loading a network from CSV.

/// CSV network import.
///
/// Reads `id,type,start,end` rows into a live [`crate::model::Network`].
pub mod import;

pub use import::{load_network, load_network_from_reader, CliError, ImportSummary};
