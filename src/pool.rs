//! Scratch buffer pool for framed reads and writes.
//!
//! Buffers are grouped in power-of-two size classes from [`MIN_CLASS_SIZE`]
//! to [`MAX_CLASS_SIZE`]. A checkout is a [`PooledBuf`] guard: it derefs to a
//! slice of exactly the requested length and hands its storage back to the
//! pool when dropped, so a buffer is returned on every exit path of the
//! caller, `?` included.
//!
//! # Usage
//!
//! ```
//! use relay_conn::pool::BufferPool;
//!
//! let pool = BufferPool::new();
//! {
//!     let mut buf = pool.acquire(1500);
//!     buf[0] = 0xAB;
//!     assert_eq!(buf.len(), 1500);
//! }
//! assert_eq!(pool.idle_count(1500), 1);
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, OnceLock};

/// Smallest size class in bytes.
pub const MIN_CLASS_SIZE: usize = 64;

/// Largest pooled size class in bytes. Covers a maximum-size datagram
/// together with its length prefix.
pub const MAX_CLASS_SIZE: usize = 128 * 1024;

/// Default number of idle buffers kept per class.
pub const DEFAULT_MAX_PER_CLASS: usize = 16;

const CLASS_COUNT: usize =
    (MAX_CLASS_SIZE.trailing_zeros() - MIN_CLASS_SIZE.trailing_zeros() + 1) as usize;

/// A pool of reusable byte buffers keyed by size class.
///
/// Shared between connections behind an `Arc`; each class has its own lock
/// so checkouts of different sizes do not contend.
#[derive(Debug)]
pub struct BufferPool {
    classes: [Mutex<Vec<Vec<u8>>>; CLASS_COUNT],
    max_per_class: usize,
}

impl BufferPool {
    /// Create a pool with the default per-class limit.
    pub fn new() -> Self {
        Self::with_max_per_class(DEFAULT_MAX_PER_CLASS)
    }

    /// Create a pool keeping at most `max_per_class` idle buffers per class.
    pub fn with_max_per_class(max_per_class: usize) -> Self {
        Self {
            classes: std::array::from_fn(|_| Mutex::new(Vec::new())),
            max_per_class,
        }
    }

    /// Process-wide shared pool.
    pub fn global() -> Arc<BufferPool> {
        static GLOBAL: OnceLock<Arc<BufferPool>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(BufferPool::new())).clone()
    }

    /// Check out a zeroed-or-reused buffer of exactly `size` bytes.
    ///
    /// The content is NOT cleared when a buffer is reused.
    pub fn acquire(&self, size: usize) -> PooledBuf<'_> {
        let buf = match class_index(size) {
            Some(idx) => {
                let reused = self.classes[idx]
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .pop();
                let mut buf = reused.unwrap_or_else(|| Vec::with_capacity(class_size(idx)));
                buf.resize(size, 0);
                buf
            }
            None => vec![0u8; size],
        };

        PooledBuf { buf, pool: self }
    }

    /// Number of idle buffers in the class serving `size`.
    pub fn idle_count(&self, size: usize) -> usize {
        match class_index(size) {
            Some(idx) => self.classes[idx]
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .len(),
            None => 0,
        }
    }

    fn release(&self, mut buf: Vec<u8>) {
        // Only buffers that still fill a whole class go back.
        let Some(idx) = class_index(buf.capacity()) else {
            return;
        };
        if buf.capacity() < class_size(idx) {
            return;
        }

        let mut free = self.classes[idx].lock().unwrap_or_else(|e| e.into_inner());
        if free.len() < self.max_per_class {
            buf.clear();
            free.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Size class index for a request, `None` above [`MAX_CLASS_SIZE`].
fn class_index(size: usize) -> Option<usize> {
    if size > MAX_CLASS_SIZE {
        return None;
    }
    let rounded = size.max(MIN_CLASS_SIZE).next_power_of_two();
    Some((rounded.trailing_zeros() - MIN_CLASS_SIZE.trailing_zeros()) as usize)
}

#[inline]
fn class_size(idx: usize) -> usize {
    MIN_CLASS_SIZE << idx
}

/// Buffer checked out of a [`BufferPool`], returned on drop.
#[derive(Debug)]
pub struct PooledBuf<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
