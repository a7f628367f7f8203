use std::{io, path::PathBuf};

use mdpack_markdown::ProcessError;
use thiserror::Error;

/// Errors raised while reading the docs tree or writing artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
  #[error("Directory not found: {}", .0.display())]
  DirectoryNotFound(PathBuf),

  #[error("Path is not a directory: {}", .0.display())]
  NotADirectory(PathBuf),

  #[error("Failed to create directory {}: {source}", .path.display())]
  CreateDir {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write {}: {source}", .path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to walk {}: {source}", .path.display())]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error("Template error: {0}")]
  Template(#[from] tera::Error),

  #[error("Serialization error: {0}")]
  Serialize(#[from] serde_json::Error),
}
