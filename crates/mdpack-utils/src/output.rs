//! Aggregate output: header, table of contents, body and footer.
use std::path::{Path, PathBuf};

use log::info;
use mdpack_markdown::utils::{count_words, slugify};
use mdpack_render::{OutputFormat, SectionCollection, format::structured_record};
use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};

use crate::{error::OutputError, fs::FileAccessor};

/// What goes around the section bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
  pub title:             Option<String>,
  pub description:       Option<String>,
  pub include_header:    bool,
  /// Table of contents built from section titles.
  pub include_toc:       bool,
  pub include_footer:    bool,
  /// Used when the collection has no pre-joined content.
  pub section_separator: String,
}

impl Default for OutputOptions {
  fn default() -> Self {
    Self {
      title:             None,
      description:       None,
      include_header:    true,
      include_toc:       false,
      include_footer:    true,
      section_separator: "\n\n---\n\n".to_string(),
    }
  }
}

/// A written aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
  pub path:       PathBuf,
  /// Size in bytes.
  pub size:       usize,
  pub word_count: usize,
  pub sections:   usize,
  /// RFC 3339 timestamp.
  pub written_at: String,
  pub created:    bool,
}

#[derive(Serialize)]
struct TocItem<'a> {
  title:  &'a str,
  anchor: String,
}

/// Renders collections through the embedded templates and writes them.
#[derive(Debug)]
pub struct OutputGenerator {
  tera:     Tera,
  accessor: FileAccessor,
}

impl OutputGenerator {
  /// # Errors
  ///
  /// Returns an error if an embedded template does not compile.
  pub fn new(accessor: FileAccessor) -> Result<Self, OutputError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(mdpack_templates::all_templates())?;
    Ok(Self { tera, accessor })
  }

  #[must_use]
  pub const fn accessor(&self) -> &FileAccessor {
    &self.accessor
  }

  /// Render a collection into the final document text.
  ///
  /// Structured collections become a single JSON document; every other
  /// format gets the optional header, table of contents and footer around
  /// the joined sections.
  ///
  /// # Errors
  ///
  /// Returns an error if a template fails to render or the JSON document
  /// cannot be serialized.
  pub fn render(
    &self,
    collection: &SectionCollection,
    options: &OutputOptions,
  ) -> Result<String, OutputError> {
    let generated_at = jiff::Timestamp::now().to_string();
    let total_words = collection.total_word_count();

    if collection.metadata.format == OutputFormat::Structured {
      let sections: Vec<_> =
        collection.sections.iter().map(structured_record).collect();
      let document = json!({
        "metadata": {
          "title": options.title,
          "description": options.description,
          "generated_at": generated_at,
          "total_sections": collection.sections.len(),
          "total_word_count": total_words,
          "sources": collection.sources(),
        },
        "sections": sections,
      });
      return Ok(serde_json::to_string_pretty(&document)? + "\n");
    }

    let mut context = Context::new();
    context.insert("title", &options.title);
    context.insert("description", &options.description);
    context.insert("generated_at", &generated_at);
    context.insert("section_count", &collection.sections.len());
    context.insert("total_words", &total_words);
    context.insert("sources", &collection.sources());

    let mut out = String::new();

    if options.include_header {
      out.push_str(&self.tera.render("header.md", &context)?);
    }

    if options.include_toc && !collection.sections.is_empty() {
      let entries: Vec<TocItem<'_>> = collection
        .sections
        .iter()
        .map(|s| {
          TocItem {
            title:  &s.metadata.title,
            anchor: slugify(&s.metadata.title),
          }
        })
        .collect();
      context.insert("entries", &entries);
      out.push_str(&self.tera.render("toc.md", &context)?);
    }

    if let Some(combined) = &collection.combined {
      out.push_str(&combined.content);
    } else {
      let body = collection
        .sections
        .iter()
        .map(|s| {
          if s.formatted.is_empty() {
            s.content.as_str()
          } else {
            s.formatted.as_str()
          }
        })
        .collect::<Vec<_>>()
        .join(&options.section_separator);
      out.push_str(&body);
    }

    if options.include_footer {
      out.push_str(&self.tera.render("footer.md", &context)?);
    }

    Ok(out)
  }

  /// Render a collection and write it to `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if rendering or writing fails.
  pub fn generate_output(
    &self,
    collection: &SectionCollection,
    path: &Path,
    options: &OutputOptions,
  ) -> Result<WriteResult, OutputError> {
    info!(
      "Generating {} ({} sections)",
      path.display(),
      collection.sections.len()
    );

    let content = self.render(collection, options)?;
    self.write_rendered(&content, path, collection.sections.len())
  }

  /// Write already rendered content, e.g. a second copy of an aggregate.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn write_rendered(
    &self,
    content: &str,
    path: &Path,
    sections: usize,
  ) -> Result<WriteResult, OutputError> {
    let written = self.accessor.write(path, content)?;

    let result = WriteResult {
      path: written.path,
      size: written.size,
      word_count: count_words(content),
      sections,
      written_at: jiff::Timestamp::now().to_string(),
      created: written.created,
    };

    info!(
      "Wrote {} ({} bytes, {} words)",
      result.path.display(),
      result.size,
      result.word_count
    );
    Ok(result)
  }
}
