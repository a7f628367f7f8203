//! Core implementation of the Markdown processor: the per-document pipeline
//! and batch processing.
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::{
  context::PipelineContext,
  extensions::{resolve_includes, strip_frontmatter, transform_links},
  types::{
    BatchFailure,
    BatchResult,
    BatchSummary,
    MarkdownProcessor,
    ProcessorOptions,
  },
};
use crate::{
  error::ProcessResult,
  source::{absolutize, read_source},
  types::{ProcessedDocument, Transformation},
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  #[must_use]
  pub fn new(options: ProcessorOptions) -> Self {
    let options = ProcessorOptions {
      docs_root: options.docs_root.as_deref().map(absolutize),
      ..options
    };
    Self { options }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &ProcessorOptions {
    &self.options
  }

  /// Read and transform a single document.
  ///
  /// # Errors
  ///
  /// Returns an error if the file is missing, is not a regular file, is
  /// larger than the configured maximum or cannot be read. Problems with
  /// includes and links never fail the document.
  pub fn process_file(
    &self,
    ctx: &mut PipelineContext,
    path: impl AsRef<Path>,
  ) -> ProcessResult<ProcessedDocument> {
    let absolute = absolutize(path.as_ref());
    debug!("Processing markdown file {}", absolute.display());

    let raw = read_source(&absolute, self.options.max_file_size)?;
    Ok(self.process_source(ctx, &raw, &absolute))
  }

  /// Transform already-loaded document content as if it had been read from
  /// `source_path`.
  ///
  /// If `source_path` is already being expanded in `ctx` the document is
  /// cut short with a circular-include marker.
  #[must_use]
  pub fn process_source(
    &self,
    ctx: &mut PipelineContext,
    raw: &str,
    source_path: &Path,
  ) -> ProcessedDocument {
    let source_path = absolutize(source_path);
    let relative_path = self.relative_path(&source_path);
    let mut document = ProcessedDocument {
      content: String::new(),
      source_path: source_path.clone(),
      relative_path,
      frontmatter: None,
      includes: Vec::new(),
      links: Vec::new(),
      transformations: Vec::new(),
      original_size: raw.len(),
    };

    if !ctx.enter(source_path.clone()) {
      warn!("Circular include detected, skipping {}", source_path.display());
      document.content = format!(
        "<!-- Circular include detected: {} -->",
        source_path.display()
      );
      return document;
    }

    let base_dir = source_path
      .parent()
      .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
    let mut content = raw.to_string();

    if self.options.remove_frontmatter {
      let stripped =
        strip_frontmatter(&content, &self.options.frontmatter_delimiter);
      content = stripped.body;
      document.frontmatter = stripped.frontmatter;
      document.transformations.push(Transformation::FrontmatterRemoved);
    }

    if self.options.process_includes {
      let (expanded, includes) = resolve_includes(
        ctx,
        &content,
        &base_dir,
        self.options.max_file_size,
      );
      debug!("Includes processed: {}", includes.len());
      content = expanded;
      document.includes = includes;
      document.transformations.push(Transformation::IncludesProcessed);
    }

    if self.options.transform_links {
      let (linked, links) = transform_links(&content, &base_dir, &self.options);
      debug!("Links transformed: {}", links.len());
      content = linked;
      document.links = links;
      document.transformations.push(Transformation::LinksTransformed);
    }

    ctx.leave(&source_path);

    debug!(
      "Processed {} ({} -> {} bytes)",
      document.relative_path,
      document.original_size,
      content.len()
    );
    document.content = content;
    document
  }

  /// Process files in order, collecting failures instead of stopping at the
  /// first one.
  pub fn process_files<P: AsRef<Path>>(
    &self,
    ctx: &mut PipelineContext,
    paths: &[P],
  ) -> BatchResult {
    info!("Processing {} markdown files", paths.len());

    let mut result = BatchResult::default();
    for path in paths {
      let path = path.as_ref();
      match self.process_file(ctx, path) {
        Ok(document) => result.documents.push(document),
        Err(e) => {
          error!("Failed to process {}: {e}", path.display());
          result.failures.push(BatchFailure {
            path:  path.to_path_buf(),
            error: e,
          });
        },
      }
    }

    result.summary = BatchSummary {
      total:              paths.len(),
      successful:         result.documents.len(),
      failed:             result.failures.len(),
      total_content_size: result
        .documents
        .iter()
        .map(|doc| doc.content.len())
        .sum(),
    };

    info!(
      "Batch processing completed: {} total, {} successful, {} failed",
      result.summary.total, result.summary.successful, result.summary.failed
    );
    result
  }

  fn relative_path(&self, path: &Path) -> String {
    self
      .options
      .docs_root
      .as_deref()
      .and_then(|root| path.strip_prefix(root).ok())
      .unwrap_or(path)
      .display()
      .to_string()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use std::fs;

  use tempfile::tempdir;

  use super::*;
  use crate::{LinkPolicy, ProcessError, ProcessorOptionsBuilder};

  #[test]
  fn test_process_source_applies_steps_in_order() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("guide.md"), "# Guide\n").expect("write");
    fs::write(dir.path().join("note.md"), "See [guide](guide.md).").expect("write");

    let processor = MarkdownProcessor::new(
      ProcessorOptionsBuilder::new()
        .docs_root(Some(dir.path()))
        .build(),
    );
    let mut ctx = PipelineContext::new();
    let raw = "---\ntitle: Index\n---\n# Index\n\n<!-- @include: note.md -->\n";
    let doc = processor.process_source(&mut ctx, raw, &dir.path().join("index.md"));

    assert_eq!(doc.frontmatter.as_deref(), Some("title: Index"));
    assert_eq!(doc.content, "# Index\n\nSee [guide](#guide).\n");
    assert_eq!(doc.relative_path, "index.md");
    assert_eq!(doc.transformations, vec![
      Transformation::FrontmatterRemoved,
      Transformation::IncludesProcessed,
      Transformation::LinksTransformed,
    ]);
    assert_eq!(ctx.stats().in_flight, 0);
    assert_eq!(ctx.stats().cache_size, 1);
  }

  #[test]
  fn test_disabled_steps_are_not_recorded() {
    let processor = MarkdownProcessor::new(
      ProcessorOptionsBuilder::new()
        .remove_frontmatter(false)
        .process_includes(false)
        .link_policy(LinkPolicy::Strip)
        .build(),
    );
    let mut ctx = PipelineContext::new();
    let raw = "---\na: b\n---\n[x](missing.md)";
    let doc = processor.process_source(&mut ctx, raw, Path::new("/nowhere/a.md"));

    assert_eq!(doc.frontmatter, None);
    assert_eq!(doc.content, "---\na: b\n---\nx");
    assert_eq!(doc.transformations, vec![Transformation::LinksTransformed]);
  }

  #[test]
  fn test_process_files_collects_failures() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("good.md");
    fs::write(&good, "# Good\n").expect("write");
    let missing = dir.path().join("missing.md");

    let processor = MarkdownProcessor::default();
    let mut ctx = PipelineContext::new();
    let result = processor.process_files(&mut ctx, &[&missing, &good]);

    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.successful, 1);
    assert_eq!(result.summary.failed, 1);
    assert_eq!(result.summary.total_content_size, "# Good\n".len());
    assert_eq!(result.documents[0].content, "# Good\n");
    assert!(matches!(
      result.failures[0].error,
      ProcessError::NotFound(_)
    ));
    assert_eq!(ctx.stats().in_flight, 0);
  }
}
