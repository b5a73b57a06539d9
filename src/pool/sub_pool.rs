//! Lock-free freelist of same-capacity blocks.
//!
//! A `SubPool` never takes a lock: idle blocks live in a crossbeam queue,
//! so concurrent `acquire`/`release` calls for one size only contend on the
//! queue itself, never on the owning shard.

use crossbeam::queue::{ArrayQueue, SegQueue};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::Block;

/// Idle block storage. Unbounded unless a retention cap was configured.
enum Freelist {
    Unbounded(SegQueue<Block>),
    Bounded(ArrayQueue<Block>),
}

impl Freelist {
    #[inline]
    fn pop(&self) -> Option<Block> {
        match self {
            Freelist::Unbounded(q) => q.pop(),
            Freelist::Bounded(q) => q.pop(),
        }
    }

    /// Returns `false` if the block was dropped because the freelist is full.
    #[inline]
    fn push(&self, block: Block) -> bool {
        match self {
            Freelist::Unbounded(q) => {
                q.push(block);
                true
            }
            Freelist::Bounded(q) => q.push(block).is_ok(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        match self {
            Freelist::Unbounded(q) => q.len(),
            Freelist::Bounded(q) => q.len(),
        }
    }
}

/// Freelist of blocks whose capacity is exactly `size`.
pub struct SubPool {
    /// Capacity of every block this pool yields.
    size: usize,
    /// Idle blocks waiting for reuse.
    idle: Freelist,
    /// Blocks served from the freelist.
    hits: AtomicUsize,
    /// Blocks allocated fresh because the freelist was empty.
    misses: AtomicUsize,
    /// Blocks accepted back.
    returns: AtomicUsize,
    /// Blocks freed because the freelist was at its cap.
    drops: AtomicUsize,
}

impl SubPool {
    /// Create a sub-pool that retains every released block.
    pub fn new(size: usize) -> Self {
        Self::with_max_idle(size, None)
    }

    /// Create a sub-pool, optionally capping the number of idle blocks kept.
    ///
    /// A cap of zero is treated as one; `PoolConfig::validate` rejects it
    /// before it gets here.
    pub fn with_max_idle(size: usize, max_idle: Option<usize>) -> Self {
        let idle = match max_idle {
            Some(cap) => Freelist::Bounded(ArrayQueue::new(cap.max(1))),
            None => Freelist::Unbounded(SegQueue::new()),
        };

        Self {
            size,
            idle,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            returns: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
        }
    }

    /// Block capacity served by this pool.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Take an idle block, or allocate a zeroed one if none is idle.
    ///
    /// The returned block always has `len() == size()`.
    #[inline]
    pub fn acquire(&self) -> Block {
        if let Some(mut block) = self.idle.pop() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            block.reset_len(self.size);
            block
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            Block::zeroed(self.size)
        }
    }

    /// Hand a block back for later reuse.
    ///
    /// The caller routes blocks by capacity, so `block.capacity() == size()`
    /// holds by construction.
    #[inline]
    pub fn release(&self, block: Block) {
        debug_assert_eq!(block.capacity(), self.size);

        if self.idle.push(block) {
            self.returns.fetch_add(1, Ordering::Relaxed);
        } else {
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle blocks currently held.
    #[inline]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Get sub-pool statistics.
    pub fn stats(&self) -> SubPoolStats {
        SubPoolStats {
            size: self.size,
            idle: self.idle.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// Per-size statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPoolStats {
    /// Block capacity of the sub-pool.
    pub size: usize,
    /// Idle blocks currently held.
    pub idle: usize,
    /// Blocks served from the freelist.
    pub hits: usize,
    /// Blocks allocated fresh.
    pub misses: usize,
    /// Blocks accepted back.
    pub returns: usize,
    /// Blocks freed because the freelist was full.
    pub drops: usize,
}

impl SubPoolStats {
    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_allocates_when_empty() {
        let pool = SubPool::new(1024);
        let block = pool.acquire();
        assert_eq!(block.len(), 1024);
        assert_eq!(block.capacity(), 1024);

        let stats = pool.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_release_then_acquire_reuses_storage() {
        let pool = SubPool::new(256);
        let block = pool.acquire();
        let ptr = block.as_ptr();

        pool.release(block);
        assert_eq!(pool.idle(), 1);

        let again = pool.acquire();
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(pool.idle(), 0);

        let stats = pool.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.returns, 1);
    }

    #[test]
    fn test_reused_block_restores_length() {
        let pool = SubPool::new(128);
        let mut block = pool.acquire();
        block.as_bytes_mut().truncate(3);
        pool.release(block);

        let block = pool.acquire();
        assert_eq!(block.len(), 128);
    }

    #[test]
    fn test_unbounded_retention() {
        let pool = SubPool::new(64);
        let blocks: Vec<_> = (0..500).map(|_| pool.acquire()).collect();
        for block in blocks {
            pool.release(block);
        }
        assert_eq!(pool.idle(), 500);
        assert_eq!(pool.stats().drops, 0);
    }

    #[test]
    fn test_bounded_retention_drops_excess() {
        let pool = SubPool::with_max_idle(64, Some(2));
        let blocks: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        for block in blocks {
            pool.release(block);
        }

        let stats = pool.stats();
        assert_eq!(stats.idle, 2);
        assert_eq!(stats.returns, 2);
        assert_eq!(stats.drops, 3);
    }

    #[test]
    fn test_zero_size_pool() {
        let pool = SubPool::new(0);
        let block = pool.acquire();
        assert!(block.is_empty());
        pool.release(block);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let stats = SubPoolStats {
            size: 512,
            idle: 0,
            hits: 75,
            misses: 25,
            returns: 70,
            drops: 5,
        };
        assert!((stats.hit_rate() - 0.75).abs() < 0.001);
    }
}
