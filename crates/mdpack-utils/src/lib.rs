//! Filesystem access and aggregate output writing.
pub mod error;
pub mod fs;
pub mod output;

pub use error::OutputError;
pub use fs::{FileAccessor, FileInfo, MarkdownFile, WriteInfo};
pub use output::{OutputGenerator, OutputOptions, WriteResult};
