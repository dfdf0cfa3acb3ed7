use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Default number of entries each worker's pool allocates per batch.
pub const POOL_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pool_size: usize,         // Entries per pool batch; batching only, never correctness
    pub workers: usize,           // Partition driver thread count
    pub channel_capacity: usize,  // Bound of the chunk transfer channel
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_size: POOL_SIZE,
            workers: num_cpus::get(),
            channel_capacity: 64,
        }
    }
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidArgument,
                format!("cannot read config {}: {}", path.display(), e),
            )
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "pool_size must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "workers must be at least 1".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "channel_capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}
