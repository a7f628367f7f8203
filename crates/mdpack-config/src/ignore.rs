//! Glob-based ignore filtering of documentation files.
use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::{config::IgnoreConfig, error::ConfigError};

/// Patterns active unless disabled or overridden: dotfiles, editor and
/// backup files, logs, build output and generated `everything.md` copies.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
  ".*",
  "**/.*/**",
  "*~",
  "*.tmp",
  "*.temp",
  "*.bak",
  "*.swp",
  "*.orig",
  "*.log",
  "**/node_modules/**",
  "**/dist/**",
  "**/build/**",
  "everything.md",
];

/// A compiled set of ignore patterns.
///
/// Paths are matched relative to the documentation root. `*` and `?` never
/// cross a `/`, `**` spans any number of directories, and a pattern without
/// a `/` also matches against the bare file name.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
  patterns: Vec<String>,
  path_set: GlobSet,
  name_set: GlobSet,
}

fn compile(pattern: &str) -> Result<Glob, ConfigError> {
  GlobBuilder::new(pattern)
    .literal_separator(true)
    .build()
    .map_err(|e| {
      ConfigError::Config(format!("Invalid ignore pattern '{pattern}': {e}"))
    })
}

impl IgnoreSet {
  /// Compile a pattern list.
  ///
  /// # Errors
  ///
  /// Returns an error if any pattern is not a valid glob.
  pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut path_builder = GlobSetBuilder::new();
    let mut name_builder = GlobSetBuilder::new();
    let mut kept = Vec::new();

    for pattern in patterns {
      let pattern = pattern.as_ref().trim();
      if pattern.is_empty() {
        continue;
      }
      let glob = compile(pattern)?;
      if !pattern.contains('/') {
        name_builder.add(glob.clone());
      }
      path_builder.add(glob);
      kept.push(pattern.to_string());
    }

    let build_err =
      |e: globset::Error| ConfigError::Config(format!("Invalid ignore patterns: {e}"));

    Ok(Self {
      patterns: kept,
      path_set: path_builder.build().map_err(build_err)?,
      name_set: name_builder.build().map_err(build_err)?,
    })
  }

  /// The active pattern list for an [`IgnoreConfig`]: `only` when set,
  /// otherwise the defaults (unless disabled) followed by `extra`.
  #[must_use]
  pub fn active_patterns(config: &IgnoreConfig) -> Vec<String> {
    if let Some(only) = &config.only {
      return only.clone();
    }

    let mut patterns: Vec<String> = if config.use_defaults {
      DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(ToString::to_string)
        .collect()
    } else {
      Vec::new()
    };
    patterns.extend(config.extra.iter().cloned());
    patterns
  }

  /// Compile the active patterns of an [`IgnoreConfig`].
  ///
  /// # Errors
  ///
  /// Returns an error if any pattern is not a valid glob.
  pub fn from_config(config: &IgnoreConfig) -> Result<Self, ConfigError> {
    Self::new(Self::active_patterns(config))
  }

  /// Whether a path relative to the documentation root is ignored.
  #[must_use]
  pub fn is_ignored(&self, relative: &Path) -> bool {
    if self.path_set.is_match(relative) {
      return true;
    }
    relative
      .file_name()
      .is_some_and(|name| self.name_set.is_match(Path::new(name)))
  }

  #[must_use]
  pub fn patterns(&self) -> &[String] {
    &self.patterns
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  fn defaults() -> IgnoreSet {
    IgnoreSet::from_config(&IgnoreConfig::default()).expect("default patterns")
  }

  #[test]
  fn test_defaults() {
    let set = defaults();
    assert!(set.is_ignored(Path::new(".DS_Store")));
    assert!(set.is_ignored(Path::new("3.0/.hidden.md")));
    assert!(set.is_ignored(Path::new(".vitepress/theme/index.md")));
    assert!(set.is_ignored(Path::new("3.0/notes.md~")));
    assert!(set.is_ignored(Path::new("3.0/draft.md.bak")));
    assert!(set.is_ignored(Path::new("node_modules/pkg/readme.md")));
    assert!(set.is_ignored(Path::new("3.0/everything.md")));
    assert!(!set.is_ignored(Path::new("3.0/index.md")));
    assert!(!set.is_ignored(Path::new("3.0/fields/text.md")));
  }

  #[test]
  fn test_file_name_patterns() {
    let set = IgnoreSet::new(["upgrade.md"]).expect("patterns");
    assert!(set.is_ignored(Path::new("3.0/upgrade.md")));
    assert!(!set.is_ignored(Path::new("3.0/index.md")));
  }

  #[test]
  fn test_path_patterns_respect_separators() {
    let set = IgnoreSet::new(["3.0/*.md", "drafts/**"]).expect("patterns");
    assert!(set.is_ignored(Path::new("3.0/index.md")));
    assert!(!set.is_ignored(Path::new("3.0/fields/text.md")));
    assert!(set.is_ignored(Path::new("drafts/a/b.md")));
    assert!(!set.is_ignored(Path::new("4.0/index.md")));
  }

  #[test]
  fn test_active_patterns() {
    let extra = IgnoreConfig {
      extra: vec!["upgrade.md".to_string()],
      ..Default::default()
    };
    let patterns = IgnoreSet::active_patterns(&extra);
    assert_eq!(patterns.len(), DEFAULT_IGNORE_PATTERNS.len() + 1);
    assert_eq!(patterns.last().map(String::as_str), Some("upgrade.md"));

    let no_defaults = IgnoreConfig {
      use_defaults: false,
      ..Default::default()
    };
    assert!(IgnoreSet::active_patterns(&no_defaults).is_empty());

    let only = IgnoreConfig {
      only: Some(vec!["*.md".to_string()]),
      extra: vec!["ignored.md".to_string()],
      ..Default::default()
    };
    assert_eq!(IgnoreSet::active_patterns(&only), vec!["*.md"]);
  }

  #[test]
  fn test_invalid_pattern() {
    assert!(matches!(
      IgnoreSet::new(["a[b"]),
      Err(ConfigError::Config(_))
    ));
  }
}
