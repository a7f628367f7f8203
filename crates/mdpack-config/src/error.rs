use std::io;

use thiserror::Error;

/// Error type for mdpack-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error(
    "Invalid version '{0}'. Expected formats: X.Y (e.g., 4.0), X.Y.Z (e.g., \
     4.0.1), latest, all"
  )]
  InvalidVersion(String),

  #[error("Version {version} not found in sidebar (available: {})", .available.join(", "))]
  VersionNotFound {
    version:   String,
    available: Vec<String>,
  },
}
