//! Scratch color buffers shared by tiles and draw calls

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use glam::Vec3;

/// One bucket per power of two
const BUCKETS: usize = 32;

/// Usage counters of a [`ColorBufferPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers handed out so far
    pub requested: usize,
    /// Requests served from a bucket instead of a fresh allocation
    pub reused: usize,
    /// Buffers currently waiting in the buckets
    pub pooled: usize,
}

/// Pool of color buffers bucketed by size rounded up to a power of two
///
/// Safe to use from several tiles at once; each bucket has its own lock.
#[derive(Debug)]
pub struct ColorBufferPool {
    buckets: Vec<Mutex<Vec<Vec<Vec3>>>>,
    pooling: bool,
    requested: AtomicUsize,
    reused: AtomicUsize,
}

impl Default for ColorBufferPool {
    fn default() -> Self {
        ColorBufferPool {
            buckets: (0..BUCKETS).map(|_| Mutex::new(Vec::new())).collect(),
            pooling: true,
            requested: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }
}

impl ColorBufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool that allocates on every request and drops returned buffers
    pub fn without_pooling() -> Self {
        ColorBufferPool {
            pooling: false,
            ..Self::default()
        }
    }

    /// Zeroed buffer of at least `len` colors, returned to the pool on drop
    pub fn acquire(&self, len: usize) -> PooledBuffer<'_> {
        self.requested.fetch_add(1, Ordering::Relaxed);
        let capacity = len.max(1).next_power_of_two();
        let recycled = self
            .bucket(capacity)
            .filter(|_| self.pooling)
            .and_then(|bucket| bucket.lock().unwrap_or_else(PoisonError::into_inner).pop());

        let mut data = match recycled {
            Some(buffer) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buffer
            }
            None => vec![Vec3::ZERO; capacity],
        };
        data[..len].fill(Vec3::ZERO);
        PooledBuffer {
            pool: self,
            data,
            len,
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            requested: self.requested.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            pooled: self
                .buckets
                .iter()
                .map(|b| b.lock().unwrap_or_else(PoisonError::into_inner).len())
                .sum(),
        }
    }

    fn bucket(&self, capacity: usize) -> Option<&Mutex<Vec<Vec<Vec3>>>> {
        self.buckets.get(capacity.trailing_zeros() as usize)
    }

    fn release(&self, data: Vec<Vec3>) {
        if !self.pooling {
            return;
        }
        if let Some(bucket) = self.bucket(data.len()) {
            bucket
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(data);
        }
    }
}

/// Borrowed scratch buffer; dereferences to exactly the requested length
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a ColorBufferPool,
    data: Vec<Vec3>,
    len: usize,
}

impl Deref for PooledBuffer<'_> {
    type Target = [Vec3];

    fn deref(&self) -> &[Vec3] {
        &self.data[..self.len]
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [Vec3] {
        &mut self.data[..self.len]
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.data));
    }
}
