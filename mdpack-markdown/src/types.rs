//! Types for the mdpack-markdown public API.
use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// A heading found in a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
  /// Heading text (inline content, no markdown formatting).
  pub text:   String,
  /// Heading level (1-6).
  pub level:  u8,
  /// Slugged anchor for the heading.
  pub anchor: String,
}

/// A fenced code block found in a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeBlock {
  /// Language tag of the fence, `text` when absent.
  pub language:   String,
  /// Number of lines in the (trimmed) block body.
  pub line_count: usize,
}

/// Result of splitting a leading frontmatter block from a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
  /// Everything after the closing delimiter, or the whole input when no
  /// frontmatter was stripped.
  pub body:        String,
  /// Lines strictly between the delimiters, trimmed. `None` when absent,
  /// unterminated or empty.
  pub frontmatter: Option<String>,
}

/// Audit record for a single include directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncludeRecord {
  /// The full directive text, delimiters included.
  pub directive:     String,
  /// The path as written in the directive.
  pub path:          String,
  /// Absolute, lexically normalised path the directive resolved to.
  pub resolved_path: PathBuf,
  /// Whether the include target exists.
  pub found:         bool,
  /// Whether the include was cut short by cycle detection.
  pub circular:      bool,
  /// Length in bytes of the substituted text.
  pub size:          usize,
}

/// Classification of a Markdown inline link target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
  /// `http://`, `https://` or `mailto:` targets.
  External,
  /// In-document `#fragment` targets.
  Anchor,
  /// Anything else.
  Relative,
}

/// Audit record for a single Markdown link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
  /// The full link text as matched, `[text](target)`.
  pub original:      String,
  /// Link text.
  pub text:          String,
  /// Link target.
  pub target:        String,
  pub kind:          LinkKind,
  /// Replacement text, when the link was rewritten.
  pub rewritten:     Option<String>,
  /// File the target resolved to, for relative links that exist.
  pub resolved_path: Option<PathBuf>,
}

/// A processing step applied to a document, in application order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Transformation {
  FrontmatterRemoved,
  IncludesProcessed,
  LinksTransformed,
}

impl fmt::Display for Transformation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::FrontmatterRemoved => "frontmatter-removed",
      Self::IncludesProcessed => "includes-processed",
      Self::LinksTransformed => "links-transformed",
    };
    f.write_str(name)
  }
}

/// A fully transformed source document.
///
/// Created by [`crate::MarkdownProcessor::process_file`] and never mutated
/// afterwards; the section templater reads it and drops it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedDocument {
  /// Transformed content.
  pub content:         String,
  /// Absolute path of the source file.
  pub source_path:     PathBuf,
  /// Source path relative to the processor's root, or the absolute path when
  /// the file lives outside of it.
  pub relative_path:   String,
  /// Stripped frontmatter text, if any.
  pub frontmatter:     Option<String>,
  pub includes:        Vec<IncludeRecord>,
  pub links:           Vec<LinkRecord>,
  pub transformations: Vec<Transformation>,
  /// Size in bytes of the raw source.
  pub original_size:   usize,
}
