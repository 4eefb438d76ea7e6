use std::fmt;
use std::marker::PhantomData;

use super::fixed::{FixedSizeBufferBuilder, FixedSizeBufferView, U32Codec};
use super::{BufferStrategy, VarCodec};
use crate::types::{IndexError, Result};

/// Finalized CSR pair: packed records plus the offset of each record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBuffers<B> {
    /// Packed record payloads.
    pub data: B,
    /// One `u32` byte offset into `data` per record.
    pub index: B,
}

impl<B: AsRef<[u8]>> VariableBuffers<B> {
    /// Combined size of both buffers in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.as_ref().len() + self.index.as_ref().len()
    }

    /// Borrows both buffers.
    pub fn as_slices(&self) -> VariableBuffers<&[u8]> {
        VariableBuffers {
            data: self.data.as_ref(),
            index: self.index.as_ref(),
        }
    }
}

/// Sequential builder of variable-width records.
///
/// The record count and the exact payload size must be known upfront.
pub struct VariableSizeBufferBuilder<C: VarCodec, S: BufferStrategy> {
    data: Vec<u8>,
    index: FixedSizeBufferBuilder<U32Codec, S>,
    cursor: usize,
    _codec: PhantomData<fn() -> C>,
}

impl<C: VarCodec, S: BufferStrategy> VariableSizeBufferBuilder<C, S> {
    /// Allocates room for `count` records totalling `data_len` bytes.
    pub fn new(count: usize, data_len: usize) -> Self {
        assert!(
            data_len <= u32::MAX as usize,
            "variable buffer payload exceeds u32 offsets ({data_len} bytes)"
        );
        Self {
            data: vec![0u8; data_len],
            index: FixedSizeBufferBuilder::new(count),
            cursor: 0,
            _codec: PhantomData,
        }
    }

    /// Appends one record and records its starting offset.
    pub fn add(&mut self, value: &C::Value) {
        let size = C::size_of(value);
        let end = self.cursor + size;
        assert!(
            end <= self.data.len(),
            "variable buffer data overflow: need {} bytes, capacity {}",
            end,
            self.data.len()
        );
        C::encode(value, &mut self.data[self.cursor..end]);
        self.index.add(&(self.cursor as u32));
        self.cursor = end;
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true before the first record is appended.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of record slots.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Freezes both buffers.
    ///
    /// Every record slot must have been filled; an unfilled offset would
    /// alias record 0.
    pub fn finalize(self) -> VariableBuffers<S::Buffer> {
        assert!(
            self.len() == self.capacity(),
            "variable buffer finalized with {} of {} records",
            self.len(),
            self.capacity()
        );
        VariableBuffers {
            data: S::freeze(self.data),
            index: self.index.finalize(),
        }
    }
}

impl<C: VarCodec, S: BufferStrategy> fmt::Debug for VariableSizeBufferBuilder<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSizeBufferBuilder")
            .field("strategy", &S::NAME)
            .field("records", &self.len())
            .field("capacity", &self.capacity())
            .field("data_cursor", &self.cursor)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Read-only view over a CSR pair.
pub struct VariableSizeBufferView<C: VarCodec, B> {
    data: B,
    index: FixedSizeBufferView<U32Codec, B>,
    _codec: PhantomData<fn() -> C>,
}

impl<C: VarCodec, B: AsRef<[u8]>> VariableSizeBufferView<C, B> {
    /// Wraps finalized buffers.
    pub fn new(buffers: VariableBuffers<B>) -> Self {
        Self {
            data: buffers.data,
            index: FixedSizeBufferView::new(buffers.index),
            _codec: PhantomData,
        }
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.index.count()
    }

    /// Decodes record `index`.
    pub fn get(&self, index: usize) -> Result<C::Decoded> {
        let offset = self
            .index
            .get(index)
            .ok_or(IndexError::Corruption("record index out of bounds"))?
            as usize;
        let data = self.data.as_ref();
        if offset > data.len() {
            return Err(IndexError::Corruption("record offset past data end"));
        }
        C::decode(&data[offset..])
    }
}

impl<C: VarCodec, B: Clone> Clone for VariableSizeBufferView<C, B> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            index: self.index.clone(),
            _codec: PhantomData,
        }
    }
}

impl<C: VarCodec, B: AsRef<[u8]>> fmt::Debug for VariableSizeBufferView<C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSizeBufferView")
            .field("count", &self.count())
            .field("data_len", &self.data.as_ref().len())
            .finish()
    }
}
