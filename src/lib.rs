pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod pool;
pub mod profiling;
pub mod types;

pub use config::Config;
pub use engine::{ShardedPool, SizeHasher};
pub use error::{Error, Result};
pub use pool::PoolConfig;
pub use types::Block;
