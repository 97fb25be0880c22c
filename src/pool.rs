use core::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::codec::{encode_into, BencodeEncode};
use crate::BencodeError;

/// Default number of idle buffers a pool keeps.
pub const DEFAULT_MAX_RETAINED: usize = 32;

/// Default capacity above which a returned buffer is freed instead of kept.
pub const DEFAULT_MAX_BUFFER_CAPACITY: usize = 1 << 20;

static GLOBAL: BufferPool = BufferPool::new(DEFAULT_MAX_RETAINED, DEFAULT_MAX_BUFFER_CAPACITY);

/// A free list of reusable output buffers.
///
/// Buffers are handed out as [`PooledBuffer`] guards and come back cleared, with their capacity
/// intact, when the guard drops. The lock is held only to push or pop the free list.
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    max_retained: usize,
    max_buffer_capacity: usize,
}

impl BufferPool {
    /// Create a pool that keeps at most `max_retained` idle buffers of at most
    /// `max_buffer_capacity` bytes each.
    #[must_use]
    pub const fn new(max_retained: usize, max_buffer_capacity: usize) -> Self {
        Self {
            free: parking_lot::const_mutex(Vec::new()),
            max_retained,
            max_buffer_capacity,
        }
    }

    /// The process-wide pool used by [`crate::Writer::new`].
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Take a cleared buffer from the pool, or a fresh one if none is idle.
    #[must_use]
    pub fn checkout(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_default();
        PooledBuffer { pool: self, buf }
    }

    /// Encode `value` into a pooled buffer.
    ///
    /// # Errors
    ///
    /// Returns any encode error; the buffer goes back to the pool.
    pub fn encode<T: BencodeEncode + ?Sized>(
        &self,
        value: &T,
    ) -> Result<PooledBuffer<'_>, BencodeError> {
        let mut buf = self.checkout();
        encode_into(&mut buf, value)?;
        Ok(buf)
    }

    /// Number of idle buffers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() == 0 {
            return;
        }
        if buf.capacity() > self.max_buffer_capacity {
            tracing::trace!(
                capacity = buf.capacity(),
                max = self.max_buffer_capacity,
                "dropping oversized pooled buffer"
            );
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(buf);
        } else {
            tracing::trace!(idle = free.len(), "buffer pool full, dropping buffer");
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETAINED, DEFAULT_MAX_BUFFER_CAPACITY)
    }
}

impl core::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("max_retained", &self.max_retained)
            .field("max_buffer_capacity", &self.max_buffer_capacity)
            .finish()
    }
}

/// A buffer checked out of a [`BufferPool`]; returns itself to the pool on drop.
pub struct PooledBuffer<'p> {
    pool: &'p BufferPool,
    buf: Vec<u8>,
}

impl PooledBuffer<'_> {
    /// Take the buffer out of the pool's custody.
    #[must_use]
    pub fn detach(mut self) -> Vec<u8> {
        core::mem::take(&mut self.buf)
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl AsRef<[u8]> for PooledBuffer<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(core::mem::take(&mut self.buf));
    }
}

impl core::fmt::Debug for PooledBuffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
