#![forbid(unsafe_code)]
//! Fixed-width word helpers and a slice cursor shared by the buffer codecs.

pub mod le {
    //! Little-endian words, the layout of every index buffer.

    /// Width in bytes of a 32-bit word.
    pub const U32_LEN: usize = core::mem::size_of::<u32>();

    /// Writes `v` into the first four bytes of `dst`.
    pub fn put_u32(dst: &mut [u8], v: u32) {
        assert!(dst.len() >= U32_LEN, "destination too small");
        dst[..U32_LEN].copy_from_slice(&v.to_le_bytes());
    }

    /// Reads a word from the first four bytes of `src`.
    pub fn get_u32(src: &[u8]) -> u32 {
        let head = src
            .get(..U32_LEN)
            .unwrap_or_else(|| panic!("u32 source shorter than 4 bytes (have {})", src.len()));
        let mut bytes = [0u8; U32_LEN];
        bytes.copy_from_slice(head);
        u32::from_le_bytes(bytes)
    }

    /// Writes consecutive words starting at `dst[0]`.
    pub fn put_u32_slice(dst: &mut [u8], values: impl IntoIterator<Item = u32>) {
        let mut off = 0;
        for v in values {
            put_u32(&mut dst[off..], v);
            off += U32_LEN;
        }
    }
}

pub mod buf {
    //! A slice-backed cursor for decoding variable-size records.

    use core::fmt;

    use super::le;
    use crate::types::{IndexError, Result};

    /// A cursor for reading bytes from a slice with offset tracking.
    pub struct Cursor<'a> {
        /// The underlying byte slice.
        pub buf: &'a [u8],
        /// Current read offset.
        pub off: usize,
    }

    impl<'a> Cursor<'a> {
        /// Creates a new cursor starting at offset 0.
        pub fn new(buf: &'a [u8]) -> Self {
            Self { buf, off: 0 }
        }

        /// Takes the next `n` bytes, failing if the record is truncated.
        pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
            let end = self
                .off
                .checked_add(n)
                .ok_or(IndexError::Corruption("cursor offset overflow"))?;
            if end > self.buf.len() {
                return Err(IndexError::Corruption("record truncated"));
            }
            let slice = &self.buf[self.off..end];
            self.off = end;
            Ok(slice)
        }

        /// Reads the next little-endian word.
        pub fn read_u32(&mut self) -> Result<u32> {
            self.take(le::U32_LEN).map(le::get_u32)
        }

        /// Returns the number of bytes remaining in the buffer.
        pub fn remaining(&self) -> usize {
            self.buf.len().saturating_sub(self.off)
        }
    }

    impl<'a> fmt::Debug for Cursor<'a> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Cursor")
                .field("off", &self.off)
                .field("remaining", &self.remaining())
                .finish()
        }
    }
}
