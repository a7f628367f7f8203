use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading or processing a single source document.
///
/// These are fatal to the document being processed but never to its
/// siblings in a batch; see [`crate::MarkdownProcessor::process_files`].
#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("File not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("Path is not a file: {}", .0.display())]
  NotAFile(PathBuf),

  #[error("File too large: {} ({size} bytes, max: {max})", .path.display())]
  TooLarge { path: PathBuf, size: u64, max: u64 },

  #[error("Failed to read {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

impl ProcessError {
  /// Path of the file the error refers to.
  #[must_use]
  pub const fn path(&self) -> &PathBuf {
    match self {
      Self::NotFound(path) | Self::NotAFile(path) => path,
      Self::TooLarge { path, .. } | Self::Io { path, .. } => path,
    }
  }

  /// Short machine-friendly code, used in run reports.
  #[must_use]
  pub const fn code(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "FILE_NOT_FOUND",
      Self::NotAFile(_) => "NOT_A_FILE",
      Self::TooLarge { .. } => "FILE_TOO_LARGE",
      Self::Io { .. } => "IO_ERROR",
    }
  }
}

/// Result type for document processing.
pub type ProcessResult<T> = Result<T, ProcessError>;
