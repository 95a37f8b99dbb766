//! Runtime configuration sourced from environment variables.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the maximum accepted input size in bytes.
pub const ENV_MAX_FILE_BYTES: &str = "OFFICEMD_MAX_FILE_BYTES";

/// Default maximum accepted input size (50 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 << 20;

/// Conversion settings shared read-only by every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Inputs larger than this are rejected before they are opened.
    pub max_file_size_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    /// Load from the environment, keeping defaults for missing or invalid values.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(ENV_MAX_FILE_BYTES).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = value {
            match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => config.max_file_size_bytes = n,
                _ => log::warn!(
                    "Ignoring invalid {}={:?}; using {} bytes",
                    ENV_MAX_FILE_BYTES,
                    raw,
                    config.max_file_size_bytes
                ),
            }
        }
        config
    }

    /// Override the size ceiling.
    pub fn with_max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// The size ceiling in whole megabytes.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_bytes >> 20
    }

    /// Reject inputs above the ceiling.
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size_bytes {
            return Err(Error::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }
        Ok(())
    }
}
