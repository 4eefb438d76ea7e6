#![forbid(unsafe_code)]
//! Write-once binary buffers with pluggable record codecs.
//!
//! Two layouts are provided:
//!
//! - [`FixedSizeBufferBuilder`] / [`FixedSizeBufferView`]: records of a
//!   constant width addressed as `index * RECORD_SIZE`.
//! - [`VariableSizeBufferBuilder`] / [`VariableSizeBufferView`]: records of
//!   arbitrary width packed into a `data` buffer, with a parallel fixed-size
//!   `index` buffer holding the byte offset of every record (CSR layout).
//!
//! Builders preallocate their full size and never grow. The allocation
//! strategy is chosen by type parameter: [`Plain`] finalizes into an owned
//! boxed slice, [`Shared`] into a reference-counted [`bytes::Bytes`] that can be
//! cloned into another thread without copying the payload.

mod fixed;
mod variable;

pub use fixed::{FixedSizeBufferBuilder, FixedSizeBufferView, U32Codec, U8Codec};
pub use variable::{VariableBuffers, VariableSizeBufferBuilder, VariableSizeBufferView};

use crate::types::Result;

/// Allocation strategy for finalized buffers.
pub trait BufferStrategy {
    /// Immutable buffer produced by `finalize`.
    type Buffer: AsRef<[u8]> + Send + Sync + 'static;

    /// Strategy name used in logs.
    const NAME: &'static str;

    /// Converts the fully written scratch vector into the final buffer.
    fn freeze(bytes: Vec<u8>) -> Self::Buffer;
}

/// Owned heap buffer, private to the thread that built it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl BufferStrategy for Plain {
    type Buffer = Box<[u8]>;
    const NAME: &'static str = "plain";

    fn freeze(bytes: Vec<u8>) -> Self::Buffer {
        bytes.into_boxed_slice()
    }
}

/// Reference-counted buffer; clones share one allocation across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct Shared;

impl BufferStrategy for Shared {
    type Buffer = bytes::Bytes;
    const NAME: &'static str = "shared";

    fn freeze(bytes: Vec<u8>) -> Self::Buffer {
        bytes::Bytes::from(bytes)
    }
}

/// Codec for records of a constant width.
pub trait FixedCodec {
    /// Decoded record.
    type Value;

    /// Width of one record in bytes.
    const RECORD_SIZE: usize;

    /// Writes `value` into `dst`, which is exactly `RECORD_SIZE` bytes.
    fn encode(value: &Self::Value, dst: &mut [u8]);

    /// Reads a record from `src`, which is exactly `RECORD_SIZE` bytes.
    fn decode(src: &[u8]) -> Self::Value;
}

/// Codec for self-delimiting records of varying width.
pub trait VarCodec {
    /// Borrowed input accepted by the builder.
    type Value: ?Sized;

    /// Owned output produced by the view.
    type Decoded;

    /// Exact encoded width of `value`.
    fn size_of(value: &Self::Value) -> usize;

    /// Writes `value` into `dst`, which is exactly `size_of(value)` bytes.
    fn encode(value: &Self::Value, dst: &mut [u8]);

    /// Reads one record from the start of `src`; trailing bytes belong to
    /// later records.
    fn decode(src: &[u8]) -> Result<Self::Decoded>;
}
