use crate::error::{Error, Result};

/// Configuration for a `ShardedPool`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolConfig {
    /// Block sizes to create sub-pools for up front (duplicates collapse)
    pub sizes: Vec<usize>,

    /// Maximum idle blocks retained per size (default: unbounded)
    pub max_idle: Option<usize>,
}

impl PoolConfig {
    /// Create a config pre-populating the given sizes.
    pub fn new(sizes: &[usize]) -> Self {
        Self {
            sizes: sizes.to_vec(),
            ..Default::default()
        }
    }

    /// Cap the number of idle blocks kept per size.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = Some(max_idle);
        self
    }

    /// Check the configuration for values the pool cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_idle == Some(0) {
            return Err(Error::InvalidConfig(
                "max_idle must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
