//! # mdpack-markdown
//!
//! Markdown transformation pipeline used by mdpack to merge a tree of
//! documentation pages into a single document. Each page goes through:
//!
//! 1. frontmatter removal (`---` delimited, fail-open when unterminated)
//! 2. include resolution (`<!-- @include: path -->` and `@@include(path)`),
//!    with an include cache and cycle detection scoped to a
//!    [`PipelineContext`]
//! 3. link rewriting, turning cross-file links into in-document anchors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdpack_markdown::{MarkdownProcessor, PipelineContext, ProcessorOptions};
//!
//! let processor = MarkdownProcessor::new(ProcessorOptions::default());
//! let mut ctx = PipelineContext::new();
//! let doc = processor.process_file(&mut ctx, "docs/3.0/index.md")?;
//!
//! println!("{}", doc.content);
//! println!("{:?}", doc.transformations);
//! # Ok::<(), mdpack_markdown::ProcessError>(())
//! ```
//!
//! The individual steps are also exposed as free functions
//! ([`strip_frontmatter`], [`resolve_includes`], [`transform_links`]) for
//! callers that only need one of them.

mod error;
pub mod processor;
pub mod source;
mod types;
pub mod utils;

pub use crate::{
  error::{ProcessError, ProcessResult},
  processor::{
    BatchFailure,
    BatchResult,
    BatchSummary,
    ContextStats,
    LinkPolicy,
    MarkdownProcessor,
    PipelineContext,
    ProcessorOptions,
    ProcessorOptionsBuilder,
    resolve_includes,
    strip_frontmatter,
    transform_links,
  },
  types::{
    CodeBlock,
    Frontmatter,
    Header,
    IncludeRecord,
    LinkKind,
    LinkRecord,
    ProcessedDocument,
    Transformation,
  },
};
