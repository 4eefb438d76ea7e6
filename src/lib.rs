//! Binary index layer for pipe networks.
//!
//! Encodes a live network model (assets plus link/node adjacency) into
//! compact, immutable byte buffers with O(1) id lookups, and answers type
//! and adjacency queries from those buffers alone.

pub mod cli;
pub mod index;
pub mod model;
pub mod primitives;
pub mod review;
pub mod types;
