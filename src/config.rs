use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use crate::error::{Error, Result};
use crate::pool::PoolConfig;

/// blockpool - sharded pool of reusable byte blocks
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Block sizes to pre-populate (comma-separated, e.g. "512,1024,4096")
    #[arg(short, long, value_delimiter = ',', default_value = "512,1024,4096")]
    pub sizes: Vec<usize>,

    /// Number of gets in the reuse loop
    #[arg(short, long, default_value = "1000")]
    pub iterations: usize,

    /// Worker threads for the concurrent phase
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Maximum idle blocks retained per size (unbounded if unset)
    #[arg(long)]
    pub max_idle: Option<usize>,

    /// File a sample block is persisted to
    #[arg(short, long, default_value = "block.bin")]
    pub output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Build the pool configuration, rejecting an empty or zero size list.
    pub fn pool_config(&self) -> Result<PoolConfig> {
        if self.sizes.is_empty() {
            return Err(Error::InvalidConfig("at least one size is required".to_string()));
        }
        if self.sizes.contains(&0) {
            return Err(Error::InvalidConfig("sizes must be positive".to_string()));
        }

        let config = PoolConfig {
            sizes: self.sizes.clone(),
            max_idle: self.max_idle,
        };
        config.validate()?;
        Ok(config)
    }

    /// Tracing level for the configured log level, defaulting to INFO
    pub fn tracing_level(&self) -> Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sizes: vec![512, 1024, 4096],
            iterations: 1000,
            threads: 4,
            max_idle: None,
            output: PathBuf::from("block.bin"),
            log_level: "info".to_string(),
        }
    }
}
