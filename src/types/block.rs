use bytes::BytesMut;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A fixed-capacity byte buffer handed out by the pool.
///
/// Blocks are backed by `BytesMut` and own their storage exclusively between
/// `get` and `put`. The pool identifies a returned block by its
/// [`capacity`](Block::capacity), so growing the underlying buffer through
/// [`as_bytes_mut`](Block::as_bytes_mut) changes which sub-pool reclaims it.
pub struct Block(BytesMut);

impl Block {
    /// Allocate a zero-filled block of exactly `size` bytes.
    #[inline]
    pub fn zeroed(size: usize) -> Self {
        Self(BytesMut::zeroed(size))
    }

    /// Number of readable bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the block has no readable bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Allocated capacity. This is the key used to route the block on `put`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    /// Address of the underlying storage, stable while the block is not grown.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Mutable access to the backing buffer for callers that need to resize.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.0
    }

    /// Restore the readable length to `len` without reallocating.
    ///
    /// Only called by the sub-pool with `len == capacity`.
    #[inline]
    pub(crate) fn reset_len(&mut self, len: usize) {
        if self.0.len() != len {
            self.0.resize(len, 0);
        }
    }

    /// Detach the backing buffer.
    #[inline]
    pub fn into_inner(self) -> BytesMut {
        self.0
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl From<BytesMut> for Block {
    fn from(buf: BytesMut) -> Self {
        Self(buf)
    }
}
