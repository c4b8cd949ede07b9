use serde::{Deserialize, Serialize};

use super::defaults;

/// Storage subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` keeps everything in memory.
    pub db_path: Option<String>,
    /// Number of read connections for file-backed databases.
    pub read_pool_size: usize,
    /// SQLite busy timeout.
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}
