//! Drives one run: sidebar, file selection, transformation, templating and
//! output, version by version.
use std::{collections::HashSet, path::PathBuf};

use log::{debug, info, warn};
use mdpack_config::{Config, ConfigError, IgnoreSet, SidebarTree, VersionSelector};
use mdpack_markdown::{MarkdownProcessor, PipelineContext};
use mdpack_render::{Section, SectionCollection, SectionGenerator};
use mdpack_utils::{FileAccessor, OutputGenerator, OutputOptions};

use crate::{
  error::MdpackError,
  report::{Artifact, ArtifactKind, FileFailure, RunReport, VersionReport},
};

/// Header title used when none is configured.
pub const DEFAULT_TITLE: &str = "VitePress Documentation";

/// Header description used when none is configured.
pub const DEFAULT_DESCRIPTION: &str =
  "Generated from VitePress documentation for LLM consumption";

/// Run the pipeline for every version `selector` picks.
///
/// Configuration problems and unknown versions fail the whole run before
/// anything is written. With `all`, a version that fails is recorded in the
/// report and the remaining versions still run; no cross-version output is
/// written in that case.
///
/// # Errors
///
/// Returns an error if the sidebar cannot be loaded, the selector names an
/// unknown version, an ignore pattern is invalid, or (outside an `all` run)
/// an artifact cannot be written.
pub fn run(
  config: &Config,
  selector: &VersionSelector,
  dry_run: bool,
) -> Result<RunReport, MdpackError> {
  let mut pipeline = Pipeline::new(config, dry_run)?;
  let versions = pipeline.resolve_versions(selector)?;
  info!(
    "Processing {} version(s): {}",
    versions.len(),
    versions.join(", ")
  );

  let mut report = RunReport {
    dry_run,
    ..RunReport::default()
  };
  let mut all_sections = Vec::new();

  for version in &versions {
    let mut version_report = VersionReport::new(version);
    match pipeline.process_version(version, &mut version_report) {
      Ok(sections) => all_sections.extend(sections),
      Err(e) if selector.is_all() => {
        warn!("Version {version} failed: {e}");
        version_report.error = Some(e.to_string());
      },
      Err(e) => return Err(e),
    }
    report.versions.push(version_report);
  }

  if selector.is_all() {
    debug!("Skipping combined output for an all-versions run");
  } else {
    report.combined = pipeline.write_combined(all_sections)?;
  }

  report.cache_size = pipeline.ctx.stats().cache_size;
  Ok(report)
}

struct Pipeline<'a> {
  config:    &'a Config,
  sidebar:   SidebarTree,
  ignore:    IgnoreSet,
  processor: MarkdownProcessor,
  generator: SectionGenerator,
  output:    OutputGenerator,
  ctx:       PipelineContext,
  dry_run:   bool,
}

impl<'a> Pipeline<'a> {
  fn new(config: &'a Config, dry_run: bool) -> Result<Self, MdpackError> {
    let sidebar = match SidebarTree::load(&config.sidebar_path) {
      Ok(tree) => tree,
      Err(e) if config.discover => {
        warn!("No sidebar loaded, relying on directory discovery: {e}");
        SidebarTree::default()
      },
      Err(e) => return Err(e.into()),
    };

    let accessor =
      FileAccessor::new(&config.docs_dir, config.transform.max_file_size);

    Ok(Self {
      config,
      sidebar,
      ignore: IgnoreSet::from_config(&config.ignore)?,
      processor: MarkdownProcessor::new(config.processor_options()),
      generator: SectionGenerator::new(config.template.section_options()),
      output: OutputGenerator::new(accessor)?,
      ctx: PipelineContext::new(),
      dry_run,
    })
  }

  fn accessor(&self) -> &FileAccessor {
    self.output.accessor()
  }

  /// Versions the run can pick from: the configured list, else the sidebar
  /// keys, else (when discovering) version-named directories.
  fn known_versions(&self) -> Result<Vec<String>, MdpackError> {
    if !self.config.versions.is_empty() {
      return Ok(self.config.versions.clone());
    }
    if !self.sidebar.is_empty() || !self.config.discover {
      return Ok(self.sidebar.versions());
    }
    Ok(self.accessor().version_directories()?)
  }

  fn resolve_versions(
    &self,
    selector: &VersionSelector,
  ) -> Result<Vec<String>, MdpackError> {
    let known = self.known_versions()?;
    let versions = selector.resolve(&known)?;

    // Every explicitly requested version must have a source before anything
    // is written.
    if !selector.is_all() {
      for version in &versions {
        if !self.has_source(version) {
          return Err(
            ConfigError::VersionNotFound {
              version:   version.clone(),
              available: known,
            }
            .into(),
          );
        }
      }
    }

    Ok(versions)
  }

  fn has_source(&self, version: &str) -> bool {
    if self.config.discover {
      self.config.docs_dir.join(version).is_dir()
    } else {
      self.sidebar.get(version).is_some()
    }
  }

  fn output_options(&self) -> OutputOptions {
    let template = &self.config.template;
    OutputOptions {
      title: Some(
        template
          .title
          .clone()
          .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
      ),
      description: Some(
        template
          .description
          .clone()
          .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
      ),
      include_toc: template.include_toc,
      section_separator: template.section_separator.clone(),
      ..OutputOptions::default()
    }
  }

  /// Candidate files for `version`, in navigation (or path) order.
  fn candidates(
    &self,
    version: &str,
    report: &mut VersionReport,
  ) -> Result<Vec<PathBuf>, MdpackError> {
    if self.config.discover {
      // Ignore filtering happens in `select_files` so it can be reported.
      let unfiltered = IgnoreSet::new(Vec::<String>::new())?;
      let files = self
        .accessor()
        .find_markdown_files(&self.config.docs_dir.join(version), &unfiltered)?;
      report.pages = files.len();
      return Ok(files.into_iter().map(|f| f.path).collect());
    }

    let pages = self.sidebar.extract_pages(version)?;
    report.pages = pages.len();
    Ok(
      pages
        .iter()
        .filter(|page| {
          let external = page.link.contains("://");
          if external {
            debug!("Skipping external sidebar link {}", page.link);
          }
          !external
        })
        .map(|page| self.accessor().page_source_path(&page.link))
        .collect(),
    )
  }

  /// Apply ignore patterns and existence checks once per version.
  fn select_files(
    &self,
    version: &str,
    report: &mut VersionReport,
  ) -> Result<Vec<PathBuf>, MdpackError> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for path in self.candidates(version, report)? {
      if self.accessor().is_ignored(&path, &self.ignore) {
        debug!("Ignoring {}", path.display());
        report.skipped_ignored.push(path);
      } else if !path.is_file() {
        warn!("File not found: {}", path.display());
        report.skipped_missing.push(path);
      } else if seen.insert(path.clone()) {
        selected.push(path);
      } else {
        debug!("Skipping repeated sidebar entry {}", path.display());
      }
    }

    Ok(selected)
  }

  fn process_version(
    &mut self,
    version: &str,
    report: &mut VersionReport,
  ) -> Result<Vec<Section>, MdpackError> {
    info!("Processing version {version}");

    let files = self.select_files(version, report)?;
    report.files_selected.clone_from(&files);
    if files.is_empty() {
      warn!("No files selected for version {version}");
    }

    let version_path = self.config.version_output_path(version);
    let everything_path = self
      .config
      .write_everything
      .then(|| self.config.everything_path(version));

    if self.dry_run {
      for file in &files {
        info!("Would process {}", file.display());
      }
      report.artifacts.push(planned(ArtifactKind::Version, version_path));
      if let Some(path) = everything_path {
        report.artifacts.push(planned(ArtifactKind::Everything, path));
      }
      return Ok(Vec::new());
    }

    let batch = self.processor.process_files(&mut self.ctx, &files);
    report.processed = batch.summary.successful;
    report
      .failures
      .extend(batch.failures.iter().map(|failure| {
        FileFailure {
          path:   failure.path.clone(),
          reason: failure.error.to_string(),
        }
      }));

    let collection = self.generator.generate_sections(&batch.documents);
    report
      .failures
      .extend(collection.failures.iter().map(|failure| {
        FileFailure {
          path:   failure.source.clone(),
          reason: failure.error.to_string(),
        }
      }));
    report.sections = collection.sections.len();
    report.words = collection.total_word_count();

    let content = self.output.render(&collection, &self.output_options())?;
    let sections = collection.sections.len();

    let written = self.output.write_rendered(&content, &version_path, sections)?;
    report.artifacts.push(Artifact {
      kind:    ArtifactKind::Version,
      path:    written.path,
      size:    Some(written.size),
      written: true,
    });

    if let Some(path) = everything_path {
      let written = self.output.write_rendered(&content, &path, sections)?;
      report.artifacts.push(Artifact {
        kind:    ArtifactKind::Everything,
        path:    written.path,
        size:    Some(written.size),
        written: true,
      });
    }

    info!(
      "Version {version}: {} sections, {} words",
      report.sections, report.words
    );
    Ok(collection.sections)
  }

  /// Write (or plan) the cross-version output.
  fn write_combined(
    &self,
    sections: Vec<Section>,
  ) -> Result<Option<Artifact>, MdpackError> {
    let path = &self.config.output;

    if self.dry_run {
      return Ok(Some(planned(ArtifactKind::Combined, path.clone())));
    }
    if sections.is_empty() {
      warn!("No sections generated, not writing {}", path.display());
      return Ok(None);
    }

    let template = &self.config.template;
    let collection = SectionCollection::from_sections(
      sections,
      template.format,
      &template.section_separator,
    );
    let written =
      self
        .output
        .generate_output(&collection, path, &self.output_options())?;

    Ok(Some(Artifact {
      kind:    ArtifactKind::Combined,
      path:    written.path,
      size:    Some(written.size),
      written: true,
    }))
  }
}

fn planned(kind: ArtifactKind, path: PathBuf) -> Artifact {
  Artifact {
    kind,
    path,
    size: None,
    written: false,
  }
}
