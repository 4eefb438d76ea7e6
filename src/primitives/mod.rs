//! Low-level primitives for building the index layer.
//!
//! Includes byte utilities and the write-once buffer builders and views
//! every encoder is assembled from.

/// Byte-level utilities and encoding/decoding.
///
/// Fixed-width word helpers and a cursor for parsing variable-size records.
pub mod bytes;

/// Fixed- and variable-size binary buffers.
///
/// Builders, read-only views, codecs, and the plain/shared allocation strategies.
pub mod buffer;
