use std::fmt;
use std::marker::PhantomData;

use super::{BufferStrategy, FixedCodec};
use crate::primitives::bytes::le;

/// Preallocated builder of constant-width records.
pub struct FixedSizeBufferBuilder<C: FixedCodec, S: BufferStrategy> {
    bytes: Vec<u8>,
    capacity: usize,
    cursor: usize,
    _marker: PhantomData<fn() -> (C, S)>,
}

impl<C: FixedCodec, S: BufferStrategy> FixedSizeBufferBuilder<C, S> {
    /// Allocates `capacity` zeroed records.
    pub fn new(capacity: usize) -> Self {
        let len = capacity
            .checked_mul(C::RECORD_SIZE)
            .expect("fixed buffer size overflows usize");
        Self {
            bytes: vec![0u8; len],
            capacity,
            cursor: 0,
            _marker: PhantomData,
        }
    }

    /// Encodes `value` into record slot `index`.
    pub fn add_at_index(&mut self, index: usize, value: &C::Value) {
        assert!(
            index < self.capacity,
            "fixed buffer write out of capacity: index {} >= capacity {}",
            index,
            self.capacity
        );
        let start = index * C::RECORD_SIZE;
        C::encode(value, &mut self.bytes[start..start + C::RECORD_SIZE]);
    }

    /// Encodes `value` into the next sequential slot.
    pub fn add(&mut self, value: &C::Value) {
        self.add_at_index(self.cursor, value);
        self.cursor += 1;
    }

    /// Number of record slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records appended through [`Self::add`].
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// Returns true if nothing was appended through [`Self::add`].
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Total size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Freezes the buffer; unwritten slots stay zeroed.
    pub fn finalize(self) -> S::Buffer {
        S::freeze(self.bytes)
    }
}

impl<C: FixedCodec, S: BufferStrategy> fmt::Debug for FixedSizeBufferBuilder<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedSizeBufferBuilder")
            .field("strategy", &S::NAME)
            .field("capacity", &self.capacity)
            .field("record_size", &C::RECORD_SIZE)
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Read-only view over constant-width records.
pub struct FixedSizeBufferView<C: FixedCodec, B> {
    buf: B,
    _codec: PhantomData<fn() -> C>,
}

impl<C: FixedCodec, B: AsRef<[u8]>> FixedSizeBufferView<C, B> {
    /// Wraps a finalized buffer. A trailing partial record is ignored.
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            _codec: PhantomData,
        }
    }

    /// Number of whole records in the buffer.
    pub fn count(&self) -> usize {
        self.buf.as_ref().len() / C::RECORD_SIZE
    }

    /// Decodes record `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<C::Value> {
        if index >= self.count() {
            return None;
        }
        let start = index * C::RECORD_SIZE;
        Some(C::decode(&self.buf.as_ref()[start..start + C::RECORD_SIZE]))
    }

    /// Raw bytes of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }
}

impl<C: FixedCodec, B: Clone> Clone for FixedSizeBufferView<C, B> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            _codec: PhantomData,
        }
    }
}

impl<C: FixedCodec, B: AsRef<[u8]>> fmt::Debug for FixedSizeBufferView<C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedSizeBufferView")
            .field("count", &self.count())
            .field("record_size", &C::RECORD_SIZE)
            .finish()
    }
}

/// One little-endian `u32` per record.
#[derive(Clone, Copy, Debug)]
pub struct U32Codec;

impl FixedCodec for U32Codec {
    type Value = u32;
    const RECORD_SIZE: usize = le::U32_LEN;

    fn encode(value: &u32, dst: &mut [u8]) {
        le::put_u32(dst, *value);
    }

    fn decode(src: &[u8]) -> u32 {
        le::get_u32(src)
    }
}

/// One byte per record.
#[derive(Clone, Copy, Debug)]
pub struct U8Codec;

impl FixedCodec for U8Codec {
    type Value = u8;
    const RECORD_SIZE: usize = 1;

    fn encode(value: &u8, dst: &mut [u8]) {
        dst[0] = *value;
    }

    fn decode(src: &[u8]) -> u8 {
        src[0]
    }
}
