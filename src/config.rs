//! Analysis configuration
//!
//! Values come from defaults, optionally overlaid by a TOML file, then by
//! command-line flags.
//!
//! ```toml
//! bin_width_secs = 0.5
//! top_n = 20
//! chunk_lines = 50000
//! case_sensitive_paths = false
//! ```

use crate::ingest::DEFAULT_CHUNK_LINES;
use crate::stats::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid bin_width_secs: {0} (must be a finite number > 0)")]
    InvalidBinWidth(f64),

    #[error("Invalid chunk_lines: must be at least 1")]
    InvalidChunkLines,
}

/// Settings shared by the parse, bin and summary stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Time bin width in seconds (fractional allowed)
    #[serde(default = "default_bin_width")]
    pub bin_width_secs: f64,

    /// Rows shown in truncated ranked tables
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Lines parsed per chunk between progress updates
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: usize,

    /// Match path filters case-sensitively
    pub case_sensitive_paths: bool,
}

fn default_bin_width() -> f64 {
    1.0
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_chunk_lines() -> usize {
    DEFAULT_CHUNK_LINES
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bin_width_secs: default_bin_width(),
            top_n: default_top_n(),
            chunk_lines: default_chunk_lines(),
            case_sensitive_paths: false,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bin_width_secs.is_finite() || self.bin_width_secs <= 0.0 {
            return Err(ConfigError::InvalidBinWidth(self.bin_width_secs));
        }
        if self.chunk_lines == 0 {
            return Err(ConfigError::InvalidChunkLines);
        }
        Ok(())
    }
}
