mod pool;
pub mod router;
mod shard;

pub use pool::{PoolStats, ShardedPool};
pub use router::{FxSizeHasher, Fnv1aDecimal, SizeHasher, SHARD_COUNT};
pub use shard::Shard;
