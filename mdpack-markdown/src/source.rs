//! Bounded reads of source documents.
use std::{
  fs,
  path::{Path, PathBuf},
};

use crate::error::{ProcessError, ProcessResult};

/// Default upper bound for a single source file: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a UTF-8 source file, refusing missing paths, directories and files
/// larger than `max_size` bytes.
///
/// # Errors
///
/// Returns [`ProcessError::NotFound`], [`ProcessError::NotAFile`],
/// [`ProcessError::TooLarge`] or [`ProcessError::Io`].
pub fn read_source(path: &Path, max_size: u64) -> ProcessResult<String> {
  let metadata = fs::metadata(path).map_err(|e| {
    if e.kind() == std::io::ErrorKind::NotFound {
      ProcessError::NotFound(path.to_path_buf())
    } else {
      ProcessError::Io {
        path:   path.to_path_buf(),
        source: e,
      }
    }
  })?;

  if !metadata.is_file() {
    return Err(ProcessError::NotAFile(path.to_path_buf()));
  }

  if metadata.len() > max_size {
    return Err(ProcessError::TooLarge {
      path: path.to_path_buf(),
      size: metadata.len(),
      max:  max_size,
    });
  }

  fs::read_to_string(path).map_err(|source| {
    ProcessError::Io {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Make `path` absolute against the current directory and fold `.` and `..`
/// components lexically. The path does not need to exist.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
  let joined = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir()
      .map(|cwd| cwd.join(path))
      .unwrap_or_else(|_| path.to_path_buf())
  };
  normalize_path(&joined)
}

/// Lexically normalise a path, removing `.` and resolving `..` against the
/// preceding component. Leading `..` on a relative path are kept.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
  use std::path::Component;

  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        let popped = match out.components().next_back() {
          Some(Component::Normal(_)) => out.pop(),
          _ => false,
        };
        if !popped && !out.has_root() {
          out.push("..");
        }
      },
      other => out.push(other.as_os_str()),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_normalize_path_folds_dots() {
    assert_eq!(
      normalize_path(Path::new("/docs/3.0/./fields/../index.md")),
      PathBuf::from("/docs/3.0/index.md")
    );
    assert_eq!(
      normalize_path(Path::new("../shared/x.md")),
      PathBuf::from("../shared/x.md")
    );
    assert_eq!(normalize_path(Path::new("/../a.md")), PathBuf::from("/a.md"));
  }

  #[test]
  fn test_read_source_errors() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("missing.md");
    assert!(matches!(
      read_source(&missing, DEFAULT_MAX_FILE_SIZE),
      Err(ProcessError::NotFound(_))
    ));
    assert!(matches!(
      read_source(dir.path(), DEFAULT_MAX_FILE_SIZE),
      Err(ProcessError::NotAFile(_))
    ));

    let big = dir.path().join("big.md");
    fs::write(&big, "0123456789").expect("write");
    assert!(matches!(
      read_source(&big, 4),
      Err(ProcessError::TooLarge { size: 10, max: 4, .. })
    ));
    assert_eq!(read_source(&big, 10).expect("read"), "0123456789");
  }
}
