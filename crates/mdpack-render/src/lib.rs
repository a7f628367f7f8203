//! Section templating: turns processed documents into formatted sections
//! and joins them into one aggregate.
//!
//! ```
//! use mdpack_render::{OutputFormat, SectionGenerator, TemplateOptions};
//!
//! let options = TemplateOptions {
//!   format: OutputFormat::Markdown,
//!   ..Default::default()
//! };
//! let mut generator = SectionGenerator::new(options);
//! let collection = generator.generate_sections(&[]);
//! assert!(collection.sections.is_empty());
//! ```
pub mod combine;
mod error;
pub mod format;
pub mod options;
pub mod section;

pub use combine::{CombinedDocument, CombinedEntry, CombinedMetadata, combine_sections};
pub use error::RenderError;
pub use options::{OutputFormat, TemplateOptions, TemplatePreset};
pub use section::{
  CollectionMetadata,
  ProcessingInfo,
  Section,
  SectionCollection,
  SectionFailure,
  SectionGenerator,
  SectionMetadata,
  SectionStructure,
  StructureStats,
  TocEntry,
};
