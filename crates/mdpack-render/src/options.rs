//! Templating options, output formats and presets.
use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How each section is rendered.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
  /// Markdown with a metadata header.
  Markdown,
  /// Markdown markup stripped to plain text.
  #[serde(rename = "text", alias = "plain_text")]
  PlainText,
  /// Machine-readable JSON record.
  Structured,
  /// LLM-oriented Markdown: title, optional TOC, comments removed.
  #[default]
  #[serde(alias = "llms-txt")]
  LlmsTxt,
}

impl FromStr for OutputFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "markdown" | "md" => Ok(Self::Markdown),
      "text" | "plain" | "plain_text" => Ok(Self::PlainText),
      "structured" | "json" => Ok(Self::Structured),
      "llms_txt" | "llms-txt" | "llms" => Ok(Self::LlmsTxt),
      other => {
        Err(format!(
          "Invalid output format: {other}. Expected markdown, text, \
           structured or llms_txt"
        ))
      },
    }
  }
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Markdown => "markdown",
      Self::PlainText => "text",
      Self::Structured => "structured",
      Self::LlmsTxt => "llms_txt",
    })
  }
}

/// Named option sets for common uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplatePreset {
  /// LLM format with tables of contents, sections capped at 50000 bytes.
  Llms,
  /// Annotated Markdown with metadata and tables of contents.
  Documentation,
  /// Structured records with word counts.
  Analysis,
}

impl FromStr for TemplatePreset {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "llms" => Ok(Self::Llms),
      "documentation" => Ok(Self::Documentation),
      "analysis" => Ok(Self::Analysis),
      other => Err(format!("Unknown template preset: {other}")),
    }
  }
}

/// Options controlling section templating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct TemplateOptions {
  pub format:              OutputFormat,
  /// Add per-section metadata (source, word count).
  pub include_metadata:    bool,
  /// Build a per-section table of contents.
  pub include_toc:         bool,
  pub include_word_count:  bool,
  pub include_timestamp:   bool,
  /// Record the absolute source path in section metadata.
  pub include_source_path: bool,
  /// Cap on section content length in bytes.
  pub max_section_length:  Option<usize>,
  pub section_separator:   String,
  /// Extra key/value pairs copied into every section's metadata.
  pub custom_headers:      IndexMap<String, String>,
}

impl Default for TemplateOptions {
  fn default() -> Self {
    Self {
      format:              OutputFormat::LlmsTxt,
      include_metadata:    true,
      include_toc:         false,
      include_word_count:  true,
      include_timestamp:   true,
      include_source_path: true,
      max_section_length:  None,
      section_separator:   "\n\n---\n\n".to_string(),
      custom_headers:      IndexMap::new(),
    }
  }
}

impl TemplateOptions {
  /// Options for a named preset.
  #[must_use]
  pub fn preset(preset: TemplatePreset) -> Self {
    let base = Self {
      include_toc: true,
      ..Self::default()
    };
    match preset {
      TemplatePreset::Llms => {
        Self {
          format: OutputFormat::LlmsTxt,
          max_section_length: Some(50_000),
          ..base
        }
      },
      TemplatePreset::Documentation => {
        Self {
          format: OutputFormat::Markdown,
          include_metadata: true,
          ..base
        }
      },
      TemplatePreset::Analysis => {
        Self {
          format: OutputFormat::Structured,
          include_metadata: true,
          include_word_count: true,
          ..base
        }
      },
    }
  }

  /// Non-fatal problems with these options.
  #[must_use]
  pub fn warnings(&self) -> Vec<String> {
    let mut warnings = Vec::new();
    if self.max_section_length.is_some_and(|max| max < 100) {
      warnings.push(
        "Very small max_section_length may result in truncated content"
          .to_string(),
      );
    }
    if self.section_separator.is_empty() {
      warnings.push("Empty section_separator runs sections together".to_string());
    }
    warnings
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_output_format_names() {
    for format in [
      OutputFormat::Markdown,
      OutputFormat::PlainText,
      OutputFormat::Structured,
      OutputFormat::LlmsTxt,
    ] {
      assert_eq!(format.to_string().parse::<OutputFormat>(), Ok(format));
    }
    assert_eq!("llms-txt".parse::<OutputFormat>(), Ok(OutputFormat::LlmsTxt));
    assert!("html".parse::<OutputFormat>().is_err());
  }

  #[test]
  fn test_presets() {
    let llms = TemplateOptions::preset(TemplatePreset::Llms);
    assert_eq!(llms.format, OutputFormat::LlmsTxt);
    assert_eq!(llms.max_section_length, Some(50_000));
    assert!(llms.include_toc);

    let docs = TemplateOptions::preset(TemplatePreset::Documentation);
    assert_eq!(docs.format, OutputFormat::Markdown);

    let analysis = TemplateOptions::preset(TemplatePreset::Analysis);
    assert_eq!(analysis.format, OutputFormat::Structured);
  }

  #[test]
  fn test_warnings() {
    assert!(TemplateOptions::default().warnings().is_empty());
    let tiny = TemplateOptions {
      max_section_length: Some(10),
      ..Default::default()
    };
    assert_eq!(tiny.warnings().len(), 1);
  }
}
