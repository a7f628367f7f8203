//! Joining sections into a single document.
use log::info;
use serde::Serialize;

use crate::section::{Section, now_rfc3339};

/// Title used when the caller provides none.
pub const DEFAULT_COMBINED_TITLE: &str = "Combined Documentation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedMetadata {
  pub title:            String,
  pub total_sections:   usize,
  /// Sum of section word counts; sections without one count as zero.
  pub total_word_count: usize,
  /// Source files in input order.
  pub sources:          Vec<String>,
  pub generated_at:     String,
}

/// Index entry for one section of a combined document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedEntry {
  pub id:     String,
  pub title:  String,
  pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedDocument {
  pub metadata: CombinedMetadata,
  pub entries:  Vec<CombinedEntry>,
  pub content:  String,
}

/// Concatenate sections in input order.
///
/// Each section contributes its `formatted` text, or its raw `content` when
/// it was never formatted.
#[must_use]
pub fn combine_sections(
  sections: &[Section],
  separator: &str,
  title: Option<&str>,
) -> CombinedDocument {
  info!("Combining {} sections", sections.len());

  let content = sections
    .iter()
    .map(|s| {
      if s.formatted.is_empty() {
        s.content.as_str()
      } else {
        s.formatted.as_str()
      }
    })
    .collect::<Vec<_>>()
    .join(separator);

  let entries = sections
    .iter()
    .map(|s| {
      CombinedEntry {
        id:     s.id.clone(),
        title:  s.metadata.title.clone(),
        source: s.metadata.source_file.clone(),
      }
    })
    .collect();

  CombinedDocument {
    metadata: CombinedMetadata {
      title:            title.unwrap_or(DEFAULT_COMBINED_TITLE).to_string(),
      total_sections:   sections.len(),
      total_word_count: sections
        .iter()
        .filter_map(|s| s.metadata.word_count)
        .sum(),
      sources:          sections
        .iter()
        .map(|s| s.metadata.source_file.clone())
        .collect(),
      generated_at:     now_rfc3339(),
    },
    entries,
    content,
  }
}
