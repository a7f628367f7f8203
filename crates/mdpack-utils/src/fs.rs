//! Reading, writing and enumerating files under the documentation root.
use std::{
  fs,
  path::{Path, PathBuf},
};

use jiff::Timestamp;
use log::{debug, warn};
use mdpack_config::{
  IgnoreSet,
  version::{compare_versions, is_version},
};
use mdpack_markdown::source::{absolutize, read_source};
use walkdir::WalkDir;

use crate::error::OutputError;

/// Metadata about a path on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
  pub path:     PathBuf,
  pub size:     u64,
  pub is_file:  bool,
  pub is_dir:   bool,
  pub modified: Option<Timestamp>,
}

/// Outcome of a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteInfo {
  pub path:    PathBuf,
  /// Bytes written.
  pub size:    usize,
  /// Whether the file did not exist before.
  pub created: bool,
}

/// A Markdown file found while walking a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
  pub path:          PathBuf,
  /// Path relative to the accessor root.
  pub relative_path: PathBuf,
  pub size:          u64,
}

/// Bounded file access rooted at the documentation directory.
#[derive(Debug, Clone)]
pub struct FileAccessor {
  root:          PathBuf,
  max_file_size: u64,
}

fn is_markdown(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

impl FileAccessor {
  #[must_use]
  pub fn new<P: AsRef<Path>>(root: P, max_file_size: u64) -> Self {
    Self {
      root: absolutize(root.as_ref()),
      max_file_size,
    }
  }

  /// Absolute documentation root.
  #[must_use]
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// `path` relative to the root, when it lies under it.
  #[must_use]
  pub fn relative_to_root(&self, path: &Path) -> Option<PathBuf> {
    absolutize(path)
      .strip_prefix(&self.root)
      .ok()
      .map(Path::to_path_buf)
  }

  /// Whether `path` is excluded by `ignore`. Paths outside the root are
  /// matched as given.
  #[must_use]
  pub fn is_ignored(&self, path: &Path, ignore: &IgnoreSet) -> bool {
    let relative = self
      .relative_to_root(path)
      .unwrap_or_else(|| path.to_path_buf());
    ignore.is_ignored(&relative)
  }

  /// Read a UTF-8 file, refusing anything over the size limit.
  ///
  /// # Errors
  ///
  /// Returns an error if the path is missing, is not a file, is too large or
  /// cannot be read.
  pub fn read(&self, path: &Path) -> Result<String, OutputError> {
    Ok(read_source(path, self.max_file_size)?)
  }

  /// Write `content` to `path`, creating parent directories.
  ///
  /// # Errors
  ///
  /// Returns an error if a directory cannot be created or the file cannot be
  /// written.
  pub fn write(&self, path: &Path, content: &str) -> Result<WriteInfo, OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      Self::ensure_directory(parent)?;
    }

    let created = !path.exists();
    fs::write(path, content).map_err(|source| {
      OutputError::Write {
        path: path.to_path_buf(),
        source,
      }
    })?;
    debug!("Wrote {} ({} bytes)", path.display(), content.len());

    Ok(WriteInfo {
      path: path.to_path_buf(),
      size: content.len(),
      created,
    })
  }

  /// Create `dir` and its parents. Returns whether anything was created.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory cannot be created.
  pub fn ensure_directory(dir: &Path) -> Result<bool, OutputError> {
    if dir.is_dir() {
      return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|source| {
      OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
      }
    })?;
    debug!("Created directory {}", dir.display());
    Ok(true)
  }

  /// Metadata for `path`, or `None` if it cannot be inspected.
  #[must_use]
  pub fn file_info(path: &Path) -> Option<FileInfo> {
    let meta = fs::metadata(path).ok()?;
    Some(FileInfo {
      path:     absolutize(path),
      size:     meta.len(),
      is_file:  meta.is_file(),
      is_dir:   meta.is_dir(),
      modified: meta
        .modified()
        .ok()
        .and_then(|t| Timestamp::try_from(t).ok()),
    })
  }

  /// Map a sidebar link to the Markdown file behind it.
  ///
  /// `/3.0/fields` resolves to `3.0/fields.md` (or `3.0/fields/index.md`
  /// when only that exists), `/3.0/` to `3.0/index.md` and `.html` links to
  /// their `.md` source. Query strings and fragments are ignored.
  #[must_use]
  pub fn page_source_path(&self, link: &str) -> PathBuf {
    let link = link
      .split(['#', '?'])
      .next()
      .unwrap_or_default()
      .trim_start_matches('/');

    if link.is_empty() || link.ends_with('/') {
      return self.root.join(link).join("index.md");
    }

    if let Some(stem) = link.strip_suffix(".html") {
      return self.root.join(format!("{stem}.md"));
    }

    let direct = self.root.join(link);
    if is_markdown(&direct) {
      return direct;
    }

    let with_ext = self.root.join(format!("{link}.md"));
    let index = direct.join("index.md");
    if !with_ext.is_file() && index.is_file() {
      index
    } else {
      with_ext
    }
  }

  /// Names of the root's immediate subdirectories that look like versions
  /// (`X.Y` or `X.Y.Z`), sorted.
  ///
  /// # Errors
  ///
  /// Returns an error if the root cannot be listed.
  pub fn version_directories(&self) -> Result<Vec<String>, OutputError> {
    if !self.root.is_dir() {
      return Err(OutputError::DirectoryNotFound(self.root.clone()));
    }

    let mut versions = Vec::new();
    for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
      let entry = entry.map_err(|source| {
        OutputError::Walk {
          path: self.root.clone(),
          source,
        }
      })?;
      if !entry.file_type().is_dir() {
        continue;
      }
      if let Some(name) = entry.file_name().to_str()
        && is_version(name)
      {
        versions.push(name.to_string());
      }
    }

    versions.sort_by(|a, b| compare_versions(a, b));
    Ok(versions)
  }

  /// Every Markdown file under `dir` that `ignore` does not exclude,
  /// sorted by path relative to the root.
  ///
  /// # Errors
  ///
  /// Returns an error if `dir` is missing or is not a directory.
  pub fn find_markdown_files(
    &self,
    dir: &Path,
    ignore: &IgnoreSet,
  ) -> Result<Vec<MarkdownFile>, OutputError> {
    let dir = absolutize(dir);
    if !dir.exists() {
      return Err(OutputError::DirectoryNotFound(dir));
    }
    if !dir.is_dir() {
      return Err(OutputError::NotADirectory(dir));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir).follow_links(true) {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          warn!("Skipping unreadable entry under {}: {e}", dir.display());
          continue;
        },
      };

      let path = entry.path();
      if !entry.file_type().is_file() || !is_markdown(path) {
        continue;
      }

      let relative_path = self
        .relative_to_root(path)
        .unwrap_or_else(|| path.to_path_buf());
      if ignore.is_ignored(&relative_path) {
        debug!("Ignoring {}", relative_path.display());
        continue;
      }

      files.push(MarkdownFile {
        path: path.to_path_buf(),
        relative_path,
        size: entry.metadata().map(|m| m.len()).unwrap_or(0),
      });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    debug!("Found {} Markdown files under {}", files.len(), dir.display());
    Ok(files)
  }
}
