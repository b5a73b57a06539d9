//! Per-size freelists and the handles that move blocks in and out of them.
//!
//! A `SubPool` owns the idle blocks for one capacity. `PooledBlock` returns
//! its block to the owning `ShardedPool` when dropped.

mod config;
mod guard;
mod sub_pool;

pub use config::PoolConfig;
pub use guard::PooledBlock;
pub use sub_pool::{SubPool, SubPoolStats};
