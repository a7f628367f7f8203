//! Type definitions for the Markdown processor.
//!
//! # Examples
//!
//! ```
//! use mdpack_markdown::{LinkPolicy, MarkdownProcessor, ProcessorOptions};
//!
//! let options = ProcessorOptions {
//!   link_policy: LinkPolicy::Strip,
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```
use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  error::ProcessError,
  source::DEFAULT_MAX_FILE_SIZE,
  types::ProcessedDocument,
};

/// What to do with a relative link once documents are merged into one file.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
  /// Rewrite `[text](page.md)` to `[text](#first-heading-of-page)`.
  #[default]
  Anchor,
  /// Replace the link with its text.
  Strip,
}

impl FromStr for LinkPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "anchor" => Ok(Self::Anchor),
      "strip" => Ok(Self::Strip),
      other => Err(format!("unknown link policy: {other}")),
    }
  }
}

impl fmt::Display for LinkPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Anchor => f.write_str("anchor"),
      Self::Strip => f.write_str("strip"),
    }
  }
}

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct ProcessorOptions {
  /// Strip a leading frontmatter block.
  pub remove_frontmatter: bool,

  /// Expand include directives.
  pub process_includes: bool,

  /// Rewrite relative links for the merged document.
  pub transform_links: bool,

  /// Line that opens and closes a frontmatter block.
  pub frontmatter_delimiter: String,

  pub link_policy: LinkPolicy,

  /// Largest source or include file that will be read, in bytes.
  pub max_file_size: u64,

  /// Documentation root. Root-relative link targets (`/3.0/guide`) resolve
  /// against it and document paths are reported relative to it.
  pub docs_root: Option<PathBuf>,
}

impl Default for ProcessorOptions {
  fn default() -> Self {
    Self {
      remove_frontmatter:    true,
      process_includes:      true,
      transform_links:       true,
      frontmatter_delimiter: "---".to_string(),
      link_policy:           LinkPolicy::Anchor,
      max_file_size:         DEFAULT_MAX_FILE_SIZE,
      docs_root:             None,
    }
  }
}

/// Builder for constructing `ProcessorOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct ProcessorOptionsBuilder {
  options: ProcessorOptions,
}

impl ProcessorOptionsBuilder {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub const fn remove_frontmatter(mut self, enabled: bool) -> Self {
    self.options.remove_frontmatter = enabled;
    self
  }

  #[must_use]
  pub const fn process_includes(mut self, enabled: bool) -> Self {
    self.options.process_includes = enabled;
    self
  }

  #[must_use]
  pub const fn transform_links(mut self, enabled: bool) -> Self {
    self.options.transform_links = enabled;
    self
  }

  #[must_use]
  pub fn frontmatter_delimiter<S: Into<String>>(mut self, delimiter: S) -> Self {
    self.options.frontmatter_delimiter = delimiter.into();
    self
  }

  #[must_use]
  pub const fn link_policy(mut self, policy: LinkPolicy) -> Self {
    self.options.link_policy = policy;
    self
  }

  #[must_use]
  pub const fn max_file_size(mut self, bytes: u64) -> Self {
    self.options.max_file_size = bytes;
    self
  }

  /// Set the documentation root.
  #[must_use]
  pub fn docs_root<P: Into<PathBuf>>(mut self, root: Option<P>) -> Self {
    self.options.docs_root = root.map(Into::into);
    self
  }

  /// Build the final `ProcessorOptions`.
  #[must_use]
  pub fn build(self) -> ProcessorOptions {
    self.options
  }
}

/// Main Markdown processor.
///
/// Stateless apart from its options; per-run state lives in a
/// [`crate::PipelineContext`] passed to every call.
#[derive(Debug, Clone, Default)]
pub struct MarkdownProcessor {
  pub(crate) options: ProcessorOptions,
}

/// A document that failed to process inside a batch.
#[derive(Debug)]
pub struct BatchFailure {
  pub path:  PathBuf,
  pub error: ProcessError,
}

/// Totals for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
  pub total:              usize,
  pub successful:         usize,
  pub failed:             usize,
  /// Sum of the transformed content lengths, in bytes.
  pub total_content_size: usize,
}

/// Outcome of [`MarkdownProcessor::process_files`]: successes in input order
/// plus every failure, so one bad file never hides the others.
#[derive(Debug, Default)]
pub struct BatchResult {
  pub documents: Vec<ProcessedDocument>,
  pub failures:  Vec<BatchFailure>,
  pub summary:   BatchSummary,
}
