//! Batch configuration via `docbatch.toml`
//!
//! The chunk weight bound is imposed by the target store, so it is read from
//! configuration rather than compiled in. Missing keys fall back to the
//! defaults of [`Limits`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use docbatch_core::{BatchError, BatchResult, Limits, MAX_CHUNK_WEIGHT, MAX_DOCUMENT_ID_BYTES};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docbatch.toml";

/// Batching configuration loaded from `docbatch.toml`.
///
/// # Example
///
/// ```toml
/// # Maximum operations per atomic unit accepted by the store
/// max_chunk_weight = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum summed operation weight per chunk.
    #[serde(default = "default_max_chunk_weight")]
    pub max_chunk_weight: usize,
    /// Maximum document id length in bytes.
    #[serde(default = "default_max_id_bytes")]
    pub max_id_bytes: usize,
}

fn default_max_chunk_weight() -> usize {
    MAX_CHUNK_WEIGHT
}

fn default_max_id_bytes() -> usize {
    MAX_DOCUMENT_ID_BYTES
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_chunk_weight: default_max_chunk_weight(),
            max_id_bytes: default_max_id_bytes(),
        }
    }
}

impl BatchConfig {
    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if either bound is zero.
    pub fn validate(&self) -> BatchResult<()> {
        if self.max_chunk_weight == 0 {
            return Err(BatchError::config(
                "max_chunk_weight must be at least 1 in docbatch.toml",
            ));
        }
        if self.max_id_bytes == 0 {
            return Err(BatchError::config(
                "max_id_bytes must be at least 1 in docbatch.toml",
            ));
        }
        Ok(())
    }

    /// Limits enforced by accumulators built from this config.
    pub fn limits(&self) -> Limits {
        Limits {
            max_chunk_weight: self.max_chunk_weight,
            max_id_bytes: self.max_id_bytes,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docbatch configuration
#
# Maximum operations per atomic unit accepted by the target store (default: 100).
# An update counts as 2 (replace of the old document + create of the new one).
max_chunk_weight = 100

# Maximum document id length in bytes (default: 255).
max_id_bytes = 255
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> BatchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BatchError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: BatchConfig = toml::from_str(&content).map_err(|e| {
            BatchError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> BatchResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                BatchError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> BatchResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BatchError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            BatchError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
