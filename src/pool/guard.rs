use crate::engine::router::{Fnv1aDecimal, SizeHasher};
use crate::engine::ShardedPool;
use crate::types::Block;

/// RAII guard that returns its block to the pool on drop.
pub struct PooledBlock<'a, H: SizeHasher = Fnv1aDecimal> {
    pool: &'a ShardedPool<H>,
    block: Option<Block>,
}

impl<'a, H: SizeHasher> PooledBlock<'a, H> {
    pub(crate) fn new(pool: &'a ShardedPool<H>, block: Block) -> Self {
        Self {
            pool,
            block: Some(block),
        }
    }

    /// Take the block, preventing return to the pool.
    pub fn take(mut self) -> Block {
        match self.block.take() {
            Some(block) => block,
            None => unreachable!("block is only taken on drop"),
        }
    }
}

impl<H: SizeHasher> std::ops::Deref for PooledBlock<'_, H> {
    type Target = Block;

    fn deref(&self) -> &Self::Target {
        match &self.block {
            Some(block) => block,
            None => unreachable!("block is only taken on drop"),
        }
    }
}

impl<H: SizeHasher> std::ops::DerefMut for PooledBlock<'_, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.block {
            Some(block) => block,
            None => unreachable!("block is only taken on drop"),
        }
    }
}

impl<H: SizeHasher> Drop for PooledBlock<'_, H> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.pool.put(block);
        }
    }
}
