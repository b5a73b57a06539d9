use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::pool::{SubPool, SubPoolStats};

/// One partition of the pool.
///
/// A shard only tracks which sizes it owns. Block transfers happen on the
/// `SubPool` after the map lookup, so the lock wrapping a shard is held for
/// a hash lookup or insert and nothing else.
pub struct Shard {
    /// Shard ID for debugging/metrics
    id: usize,

    /// Sub-pools keyed by block capacity
    sub_pools: FxHashMap<usize, Arc<SubPool>>,
}

impl Shard {
    /// Create an empty shard
    pub fn new(id: usize) -> Self {
        Self {
            id,
            sub_pools: FxHashMap::default(),
        }
    }

    /// Get the shard ID
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Look up the sub-pool for a size
    #[inline]
    pub fn get(&self, size: usize) -> Option<Arc<SubPool>> {
        self.sub_pools.get(&size).cloned()
    }

    /// Return the sub-pool for `size`, creating it if no caller has yet.
    ///
    /// An existing entry is never replaced: a racing creator that got the
    /// write lock first wins and everyone shares its freelist.
    pub fn get_or_insert(&mut self, size: usize, max_idle: Option<usize>) -> Arc<SubPool> {
        let id = self.id;
        self.sub_pools
            .entry(size)
            .or_insert_with(|| {
                tracing::debug!("Shard {} created sub-pool for {} byte blocks", id, size);
                Arc::new(SubPool::with_max_idle(size, max_idle))
            })
            .clone()
    }

    /// Check whether a sub-pool exists for `size`
    #[inline]
    pub fn contains(&self, size: usize) -> bool {
        self.sub_pools.contains_key(&size)
    }

    /// Number of sub-pools owned by this shard
    #[inline]
    pub fn len(&self) -> usize {
        self.sub_pools.len()
    }

    /// Check if the shard owns no sub-pools
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sub_pools.is_empty()
    }

    /// Statistics for every sub-pool in this shard
    pub fn stats(&self) -> impl Iterator<Item = SubPoolStats> + '_ {
        self.sub_pools.values().map(|p| p.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing() {
        let shard = Shard::new(3);
        assert_eq!(shard.id(), 3);
        assert!(shard.get(512).is_none());
        assert!(shard.is_empty());
    }

    #[test]
    fn test_get_or_insert_keeps_existing() {
        let mut shard = Shard::new(0);
        let first = shard.get_or_insert(1024, None);
        let second = shard.get_or_insert(1024, None);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_distinct_sizes_get_distinct_pools() {
        let mut shard = Shard::new(2);
        let a = shard.get_or_insert(1024, None);
        let b = shard.get_or_insert(4096, None);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.size(), 1024);
        assert_eq!(b.size(), 4096);
        assert!(shard.contains(1024));
        assert!(shard.contains(4096));
        assert_eq!(shard.len(), 2);
    }

    #[test]
    fn test_stats_cover_all_pools() {
        let mut shard = Shard::new(0);
        shard.get_or_insert(8, None);
        shard.get_or_insert(16, Some(4));

        let mut sizes: Vec<_> = shard.stats().map(|s| s.size).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![8, 16]);
    }
}
