//! Accumulating raw body bytes.

use bytes::{Buf, Bytes, BytesMut};


//------------ ChunkBuffer ---------------------------------------------------

/// A buffer collecting the not yet consumed bytes of a request body.
///
/// Chunks are appended at the end as they arrive from the transport and
/// consumed from the front by the decoder, either by handing them out as
/// a [`Bytes`] value or by skipping them.
#[derive(Clone, Debug, Default)]
pub struct ChunkBuffer {
    buf: BytesMut,
}

impl ChunkBuffer {
    /// Creates a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer that starts out with the given bytes.
    pub fn with_prefix(prefix: &[u8]) -> Self {
        ChunkBuffer { buf: BytesMut::from(prefix) }
    }

    /// Appends a chunk to the end of the buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk)
    }

    /// Returns the number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Returns whether the buffered data starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.buf.starts_with(prefix)
    }

    /// Returns the position of the first occurrence of `needle`.
    ///
    /// Only the first `limit` bytes of the buffer are searched, i.e., a
    /// match has to end at or before `limit`.
    pub fn find(&self, needle: &[u8], limit: usize) -> Option<usize> {
        let haystack = &self.buf[..limit.min(self.buf.len())];
        if needle.is_empty() || haystack.len() < needle.len() {
            return None
        }
        haystack.windows(needle.len()).position(|window| window == needle)
    }

    /// Removes the first `len` bytes and returns them.
    ///
    /// # Panics
    ///
    /// The method panics if `len` is larger than the buffer.
    pub fn split_to(&mut self, len: usize) -> Bytes {
        self.buf.split_to(len).freeze()
    }

    /// Drops the first `len` bytes.
    ///
    /// # Panics
    ///
    /// The method panics if `len` is larger than the buffer.
    pub fn advance(&mut self, len: usize) {
        self.buf.advance(len)
    }

    /// Drops all buffered bytes and releases the memory.
    pub fn clear(&mut self) {
        self.buf = BytesMut::new()
    }
}


//============ Tests =========================================================
