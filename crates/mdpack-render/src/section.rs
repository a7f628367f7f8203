//! Section generation from processed documents.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, error, info, warn};
use mdpack_markdown::{
  CodeBlock,
  Header,
  ProcessedDocument,
  Transformation,
  utils::{self, count_words, reading_minutes, slugify},
};
use serde::Serialize;

use crate::{
  combine::{CombinedDocument, combine_sections},
  error::RenderError,
  format,
  options::{OutputFormat, TemplateOptions},
};

/// Size and transformation details of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingInfo {
  pub transformations: Vec<Transformation>,
  pub original_size:   usize,
  pub final_size:      usize,
}

/// Per-section metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionMetadata {
  pub title:                     String,
  /// Source path as reported by the processor (relative to the docs root).
  pub source_file:               String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub word_count:                Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub estimated_reading_minutes: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub absolute_path:             Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generated_at:              Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub frontmatter:               Option<String>,
  pub processing:                ProcessingInfo,
  #[serde(skip_serializing_if = "IndexMap::is_empty")]
  pub custom:                    IndexMap<String, String>,
}

/// Summary numbers over a section's structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructureStats {
  pub heading_count:     usize,
  pub code_block_count:  usize,
  pub max_heading_level: u8,
  pub has_code:          bool,
}

/// Headings and code blocks of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStructure {
  pub headings:    Vec<Header>,
  pub code_blocks: Vec<CodeBlock>,
  pub stats:       StructureStats,
}

impl SectionStructure {
  #[must_use]
  pub fn analyze(content: &str) -> Self {
    let headings = utils::extract_headings(content);
    let code_blocks = utils::extract_code_blocks(content);
    let stats = StructureStats {
      heading_count:     headings.len(),
      code_block_count:  code_blocks.len(),
      max_heading_level: headings.iter().map(|h| h.level).max().unwrap_or(0),
      has_code:          !code_blocks.is_empty(),
    };
    Self {
      headings,
      code_blocks,
      stats,
    }
  }
}

/// One table-of-contents line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
  pub level:  u8,
  pub text:   String,
  pub anchor: String,
}

impl TocEntry {
  /// Two spaces per level below 1.
  #[must_use]
  pub fn indent(&self) -> String {
    "  ".repeat(usize::from(self.level.saturating_sub(1)))
  }
}

/// A templated document, ready to be aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  pub id:                String,
  pub metadata:          SectionMetadata,
  /// Document content after truncation.
  pub content:           String,
  pub structure:         SectionStructure,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub table_of_contents: Vec<TocEntry>,
  /// Content rendered in the configured output format.
  pub formatted:         String,
}

/// A document that could not be templated.
#[derive(Debug)]
pub struct SectionFailure {
  pub source: PathBuf,
  pub error:  RenderError,
}

/// Collection-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionMetadata {
  pub total_sections:       usize,
  pub total_content_length: usize,
  pub failed_sections:      usize,
  pub generated_at:         String,
  pub format:               OutputFormat,
}

/// Sections generated from a batch of documents.
#[derive(Debug)]
pub struct SectionCollection {
  pub sections: Vec<Section>,
  pub failures: Vec<SectionFailure>,
  pub metadata: CollectionMetadata,
  /// Pre-joined aggregate, present when there is more than one section.
  pub combined: Option<CombinedDocument>,
}

impl SectionCollection {
  /// Wrap already generated sections, joining them when there is more than
  /// one.
  #[must_use]
  pub fn from_sections(
    sections: Vec<Section>,
    format: OutputFormat,
    separator: &str,
  ) -> Self {
    let metadata = CollectionMetadata {
      total_sections:       sections.len(),
      total_content_length: sections.iter().map(|s| s.content.len()).sum(),
      failed_sections:      0,
      generated_at:         now_rfc3339(),
      format,
    };
    let combined =
      (sections.len() > 1).then(|| combine_sections(&sections, separator, None));

    Self {
      sections,
      failures: Vec::new(),
      metadata,
      combined,
    }
  }

  /// Sum of section word counts.
  #[must_use]
  pub fn total_word_count(&self) -> usize {
    self.sections.iter().filter_map(|s| s.metadata.word_count).sum()
  }

  /// Source files in section order.
  #[must_use]
  pub fn sources(&self) -> Vec<&str> {
    self
      .sections
      .iter()
      .map(|s| s.metadata.source_file.as_str())
      .collect()
  }
}

/// Generates sections, numbering them in generation order.
#[derive(Debug, Clone)]
pub struct SectionGenerator {
  options: TemplateOptions,
  counter: usize,
}

pub(crate) fn now_rfc3339() -> String {
  jiff::Timestamp::now().to_string()
}

impl SectionGenerator {
  #[must_use]
  pub fn new(options: TemplateOptions) -> Self {
    for warning in options.warnings() {
      warn!("{warning}");
    }
    Self {
      options,
      counter: 0,
    }
  }

  #[must_use]
  pub const fn options(&self) -> &TemplateOptions {
    &self.options
  }

  /// Number of sections generated since creation or the last reset.
  #[must_use]
  pub const fn sections_generated(&self) -> usize {
    self.counter
  }

  pub const fn reset_counter(&mut self) {
    self.counter = 0;
  }

  fn next_id(&mut self, relative_path: &str) -> String {
    self.counter += 1;
    let stem = Path::new(relative_path)
      .file_stem()
      .map(|s| slugify(&s.to_string_lossy()))
      .unwrap_or_default();
    format!("section-{}-{stem}", self.counter)
  }

  /// Template one processed document.
  ///
  /// # Errors
  ///
  /// Returns an error if the structured record cannot be serialized.
  pub fn generate_section(
    &mut self,
    document: &ProcessedDocument,
  ) -> Result<Section, RenderError> {
    let options = &self.options;
    debug!("Generating section for {}", document.relative_path);

    let word_count = options
      .include_word_count
      .then(|| count_words(&document.content));

    let metadata = SectionMetadata {
      title: format::extract_title(&document.content),
      source_file: document.relative_path.clone(),
      word_count,
      estimated_reading_minutes: word_count.map(reading_minutes),
      absolute_path: options
        .include_source_path
        .then(|| document.source_path.clone()),
      generated_at: options.include_timestamp.then(now_rfc3339),
      frontmatter: document.frontmatter.clone(),
      processing: ProcessingInfo {
        transformations: document.transformations.clone(),
        original_size:   document.original_size,
        final_size:      document.content.len(),
      },
      custom: options.custom_headers.clone(),
    };

    let content = match options.max_section_length {
      Some(max) => format::truncate_content(&document.content, max),
      None => document.content.clone(),
    };

    let structure = SectionStructure::analyze(&document.content);
    let table_of_contents = if options.include_toc {
      structure
        .headings
        .iter()
        .map(|h| {
          TocEntry {
            level:  h.level,
            text:   h.text.clone(),
            anchor: h.anchor.clone(),
          }
        })
        .collect()
    } else {
      Vec::new()
    };

    let format = options.format;
    let include_metadata = options.include_metadata;
    let mut section = Section {
      id: self.next_id(&document.relative_path),
      metadata,
      content,
      structure,
      table_of_contents,
      formatted: String::new(),
    };

    section.formatted = match format {
      OutputFormat::Markdown => format::format_markdown(&section, include_metadata),
      OutputFormat::PlainText => format::format_plain_text(&section),
      OutputFormat::Structured => format::format_structured(&section)?,
      OutputFormat::LlmsTxt => format::format_llms(&section, include_metadata),
    };

    debug!(
      "Section {} generated ({} bytes, {format})",
      section.id,
      section.content.len()
    );
    Ok(section)
  }

  /// Template documents in order; failures are collected, not fatal.
  pub fn generate_sections(
    &mut self,
    documents: &[ProcessedDocument],
  ) -> SectionCollection {
    info!("Generating {} sections", documents.len());

    let mut sections = Vec::with_capacity(documents.len());
    let mut failures = Vec::new();

    for document in documents {
      match self.generate_section(document) {
        Ok(section) => sections.push(section),
        Err(e) => {
          error!("Failed to generate section for {}: {e}", document.relative_path);
          failures.push(SectionFailure {
            source: document.source_path.clone(),
            error:  e,
          });
        },
      }
    }

    let mut collection = SectionCollection::from_sections(
      sections,
      self.options.format,
      &self.options.section_separator,
    );
    collection.metadata.failed_sections = failures.len();
    collection.failures = failures;
    collection
  }
}
