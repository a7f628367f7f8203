//! Markdown transformation pipeline.
//!
//! # Architecture
//!
//! - [`core`]: the per-document pipeline and batch processing
//! - [`context`]: include cache and in-flight set for one run
//! - [`extensions`]: the individual transforms as free functions
//! - [`types`]: options, builder and batch result types
pub mod context;
pub mod core;
pub mod extensions;
pub mod types;

pub use context::{ContextStats, PipelineContext};
pub use extensions::{
  anchor_for_file,
  classify_link,
  resolve_includes,
  strip_frontmatter,
  transform_links,
};
pub use types::{
  BatchFailure,
  BatchResult,
  BatchSummary,
  LinkPolicy,
  MarkdownProcessor,
  ProcessorOptions,
  ProcessorOptionsBuilder,
};
