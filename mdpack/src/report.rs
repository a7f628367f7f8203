//! What a pipeline run did, per version.
use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

/// Kind of file an artifact entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  /// Per-version aggregate, e.g. `public/3.0/llms-full.txt`.
  Version,
  /// `<docs>/<version>/everything.md`.
  Everything,
  /// Cross-version output.
  Combined,
}

/// An output file, either written or, in a dry run, planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub kind:    ArtifactKind,
  pub path:    PathBuf,
  /// Bytes written; `None` for planned files.
  pub size:    Option<usize>,
  pub written: bool,
}

/// A file that was selected but could not be turned into a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
  pub path:   PathBuf,
  pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionReport {
  pub version:         String,
  /// Pages listed by the sidebar, or files found in discover mode.
  pub pages:           usize,
  pub files_selected:  Vec<PathBuf>,
  pub skipped_ignored: Vec<PathBuf>,
  pub skipped_missing: Vec<PathBuf>,
  pub processed:       usize,
  pub failures:        Vec<FileFailure>,
  pub sections:        usize,
  pub words:           usize,
  pub artifacts:       Vec<Artifact>,
  /// Set when the whole version failed.
  pub error:           Option<String>,
}

impl VersionReport {
  #[must_use]
  pub fn new(version: &str) -> Self {
    Self {
      version: version.to_string(),
      ..Self::default()
    }
  }

  #[must_use]
  pub const fn is_failed(&self) -> bool {
    self.error.is_some()
  }
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub versions:   Vec<VersionReport>,
  pub combined:   Option<Artifact>,
  pub dry_run:    bool,
  /// Distinct include files read during the run.
  pub cache_size: usize,
}

impl RunReport {
  #[must_use]
  pub fn total_processed(&self) -> usize {
    self.versions.iter().map(|v| v.processed).sum()
  }

  #[must_use]
  pub fn total_sections(&self) -> usize {
    self.versions.iter().map(|v| v.sections).sum()
  }

  #[must_use]
  pub fn total_words(&self) -> usize {
    self.versions.iter().map(|v| v.words).sum()
  }

  #[must_use]
  pub fn total_failures(&self) -> usize {
    self.versions.iter().map(|v| v.failures.len()).sum()
  }

  /// Versions that aborted.
  #[must_use]
  pub fn failed_versions(&self) -> Vec<&VersionReport> {
    self.versions.iter().filter(|v| v.is_failed()).collect()
  }

  /// Every artifact, per-version ones first.
  pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
    self
      .versions
      .iter()
      .flat_map(|v| &v.artifacts)
      .chain(self.combined.as_ref())
  }

  /// Log the end-of-run summary.
  pub fn log_summary(&self) {
    let verb = if self.dry_run { "Would write" } else { "Wrote" };

    info!("Summary:");
    info!("  Versions: {}", self.versions.len());
    info!("  Files processed: {}", self.total_processed());
    info!("  Sections generated: {}", self.total_sections());
    info!("  Total words: {}", self.total_words());

    for version in &self.versions {
      if let Some(error) = &version.error {
        warn!("  {}: failed: {error}", version.version);
        continue;
      }
      info!(
        "  {}: {} pages, {} selected, {} ignored, {} missing, {} sections",
        version.version,
        version.pages,
        version.files_selected.len(),
        version.skipped_ignored.len(),
        version.skipped_missing.len(),
        version.sections
      );
      for failure in &version.failures {
        warn!("    {}: {}", failure.path.display(), failure.reason);
      }
    }

    for artifact in self.artifacts() {
      match artifact.size {
        Some(size) => info!("  {verb} {} ({size} bytes)", artifact.path.display()),
        None => info!("  {verb} {}", artifact.path.display()),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_totals() {
    let mut a = VersionReport::new("2.0");
    a.processed = 3;
    a.sections = 3;
    a.words = 120;
    a.failures.push(FileFailure {
      path:   PathBuf::from("docs/2.0/bad.md"),
      reason: "File not found".to_string(),
    });

    let mut b = VersionReport::new("3.0");
    b.error = Some("Version 3.0 not found".to_string());

    let report = RunReport {
      versions: vec![a, b],
      ..RunReport::default()
    };

    assert_eq!(report.total_processed(), 3);
    assert_eq!(report.total_words(), 120);
    assert_eq!(report.total_failures(), 1);
    assert_eq!(report.failed_versions().len(), 1);
    assert_eq!(report.failed_versions()[0].version, "3.0");
  }
}
