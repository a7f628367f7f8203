//! Per-run state threaded through the transformer.
use std::{
  collections::{HashMap, HashSet},
  path::{Path, PathBuf},
};

/// State owned by one pipeline invocation.
///
/// Holds the include cache (resolved path to raw file content) and the set
/// of absolute paths currently being expanded, used for cycle detection.
/// The cache is shared by every document processed with the same context;
/// the in-flight set is always empty again between two root documents.
#[derive(Debug, Default)]
pub struct PipelineContext {
  include_cache: HashMap<PathBuf, String>,
  in_flight:     HashSet<PathBuf>,
}

/// Snapshot of a context's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextStats {
  /// Number of distinct include files read so far.
  pub cache_size: usize,
  /// Number of documents currently being expanded.
  pub in_flight:  usize,
}

impl PipelineContext {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Raw content of an include file read earlier in this run.
  #[must_use]
  pub fn cached_include(&self, path: &Path) -> Option<&str> {
    self.include_cache.get(path).map(String::as_str)
  }

  pub fn cache_include(&mut self, path: PathBuf, content: String) {
    self.include_cache.insert(path, content);
  }

  /// Whether `path` is already being expanded further up the call chain.
  #[must_use]
  pub fn is_in_flight(&self, path: &Path) -> bool {
    self.in_flight.contains(path)
  }

  /// Mark `path` as being expanded. Returns `false` if it already was.
  pub fn enter(&mut self, path: PathBuf) -> bool {
    self.in_flight.insert(path)
  }

  pub fn leave(&mut self, path: &Path) {
    self.in_flight.remove(path);
  }

  /// Drop cached includes and in-flight markers.
  pub fn clear(&mut self) {
    self.include_cache.clear();
    self.in_flight.clear();
  }

  #[must_use]
  pub fn stats(&self) -> ContextStats {
    ContextStats {
      cache_size: self.include_cache.len(),
      in_flight:  self.in_flight.len(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_enter_leave() {
    let mut ctx = PipelineContext::new();
    let path = PathBuf::from("/docs/a.md");

    assert!(ctx.enter(path.clone()));
    assert!(!ctx.enter(path.clone()));
    assert!(ctx.is_in_flight(&path));

    ctx.leave(&path);
    assert!(!ctx.is_in_flight(&path));
    assert_eq!(ctx.stats().in_flight, 0);
  }

  #[test]
  fn test_cache_and_clear() {
    let mut ctx = PipelineContext::new();
    ctx.cache_include(PathBuf::from("/docs/x.md"), "X".to_string());
    assert_eq!(ctx.cached_include(Path::new("/docs/x.md")), Some("X"));
    assert_eq!(ctx.stats(), ContextStats {
      cache_size: 1,
      in_flight:  0,
    });

    ctx.clear();
    assert_eq!(ctx.cached_include(Path::new("/docs/x.md")), None);
  }
}
