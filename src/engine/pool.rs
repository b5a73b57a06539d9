use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::router::{shard_index, Fnv1aDecimal, SizeHasher, SHARD_COUNT};
use crate::engine::Shard;
use crate::error::Result;
use crate::metrics::MetricsRecorder;
use crate::pool::{PoolConfig, PooledBlock, SubPool, SubPoolStats};
use crate::types::Block;

/// Thread-safe, size-bucketed block pool.
///
/// Sizes are routed to one of `SHARD_COUNT` shards by a pure hash of the
/// size. Each shard's `size -> SubPool` map sits behind its own RwLock; the
/// lock covers map membership only, and blocks move in and out of the
/// sub-pool after it is released.
///
/// Shard routing: shard_index = hash(size) % SHARD_COUNT
pub struct ShardedPool<H = Fnv1aDecimal> {
    shards: [RwLock<Shard>; SHARD_COUNT],
    hasher: H,
    max_idle: Option<usize>,
    metrics: MetricsRecorder,
}

impl ShardedPool<Fnv1aDecimal> {
    /// Create a pool with a sub-pool pre-created for each listed size.
    ///
    /// Duplicate sizes collapse to one sub-pool. Sizes not listed are still
    /// served; their sub-pool is created on first `get`.
    pub fn new(sizes: &[usize]) -> Self {
        Self::build(sizes, None, Fnv1aDecimal)
    }

    /// Create a pool from a validated configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        Self::with_hasher(config, Fnv1aDecimal)
    }
}

impl<H: SizeHasher> ShardedPool<H> {
    /// Create a pool routing sizes with a custom hasher.
    pub fn with_hasher(config: PoolConfig, hasher: H) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config.sizes, config.max_idle, hasher))
    }

    fn build(sizes: &[usize], max_idle: Option<usize>, hasher: H) -> Self {
        let pool = Self {
            shards: std::array::from_fn(|id| RwLock::new(Shard::new(id))),
            hasher,
            max_idle,
            metrics: MetricsRecorder::new(),
        };

        for &size in sizes {
            let idx = pool.shard_of(size);
            pool.shards[idx].write().get_or_insert(size, max_idle);
        }

        tracing::debug!(
            "Pool created with {} pre-populated sizes, max_idle={:?}",
            pool.sub_pool_count(),
            max_idle
        );
        pool
    }

    /// Shard index responsible for `size`.
    #[inline]
    pub fn shard_of(&self, size: usize) -> usize {
        shard_index(&self.hasher, size)
    }

    /// Number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        SHARD_COUNT
    }

    /// Resolve the sub-pool for `size`, creating it if needed.
    ///
    /// Optimistic read lookup first; on a miss take the write lock and
    /// re-check, so a sub-pool created by a racing caller in between is
    /// reused instead of overwritten.
    fn sub_pool(&self, size: usize) -> Arc<SubPool> {
        let shard = &self.shards[self.shard_of(size)];

        let existing = shard.read().get(size);
        if let Some(sub_pool) = existing {
            return sub_pool;
        }

        shard.write().get_or_insert(size, self.max_idle)
    }

    /// Get a block of exactly `size` bytes.
    ///
    /// Reuses an idle block when one exists, otherwise allocates. Never fails.
    pub fn get(&self, size: usize) -> Block {
        let start = Instant::now();

        let block = self.sub_pool(size).acquire();

        self.metrics.record_allocation();
        self.metrics.add_allocation_time(start.elapsed());
        block
    }

    /// Return a block for reuse.
    ///
    /// The sub-pool is chosen by `block.capacity()`, not by the size it was
    /// requested with. If no sub-pool exists for that capacity the block is
    /// dropped and counted as a discard.
    pub fn put(&self, block: Block) {
        let start = Instant::now();

        let size = block.capacity();
        let existing = self.shards[self.shard_of(size)].read().get(size);

        match existing {
            Some(sub_pool) => {
                sub_pool.release(block);
                self.metrics.record_reuse();
                self.metrics.add_reuse_time(start.elapsed());
            }
            None => {
                drop(block);
                self.metrics.record_discard();
                tracing::trace!("Discarded {} byte block with no matching sub-pool", size);
            }
        }
    }

    /// Get a block that is returned to this pool when dropped.
    pub fn get_pooled(&self, size: usize) -> PooledBlock<'_, H> {
        PooledBlock::new(self, self.get(size))
    }

    /// Metrics recorded by this pool.
    #[inline]
    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Check whether a sub-pool exists for `size`.
    pub fn contains(&self, size: usize) -> bool {
        self.shards[self.shard_of(size)].read().contains(size)
    }

    /// Total number of sub-pools across all shards.
    pub fn sub_pool_count(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    /// Statistics for one size, if its sub-pool exists.
    pub fn sub_pool_stats(&self, size: usize) -> Option<SubPoolStats> {
        let existing = self.shards[self.shard_of(size)].read().get(size);
        existing.map(|p| p.stats())
    }

    /// Statistics across every sub-pool, sorted by size.
    pub fn stats(&self) -> PoolStats {
        let mut per_size: Vec<SubPoolStats> = self
            .shards
            .iter()
            .flat_map(|s| s.read().stats().collect::<Vec<_>>())
            .collect();
        per_size.sort_unstable_by_key(|s| s.size);

        PoolStats {
            sub_pools: per_size.len(),
            idle_blocks: per_size.iter().map(|s| s.idle).sum(),
            per_size,
        }
    }
}

impl Default for ShardedPool<Fnv1aDecimal> {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Pool-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of sub-pools.
    pub sub_pools: usize,
    /// Idle blocks held across all sub-pools.
    pub idle_blocks: usize,
    /// Per-size breakdown, sorted by size.
    pub per_size: Vec<SubPoolStats>,
}
