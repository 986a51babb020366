//! TOML configuration file for the receiver.
//!
//! Unlike a persisted settings store, the file is optional and read-only: it
//! is only consulted when `--config <path>` is given, and a missing file is
//! an error because the user asked for it explicitly.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::ReceiverConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses receiver settings from TOML text.  Absent keys take their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or a key has the
/// wrong type.
pub fn parse_config(content: &str) -> Result<ReceiverConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Reads and parses the file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid.
pub fn load_config(path: &Path) -> Result<ReceiverConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
