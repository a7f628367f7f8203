pub mod config;
pub mod error;
pub mod ignore;
pub mod scan;
pub mod sidebar;
pub mod templates;
pub mod version;

pub use config::{Config, IgnoreConfig, TemplateConfig, TransformConfig};
pub use error::ConfigError;
pub use ignore::{DEFAULT_IGNORE_PATTERNS, IgnoreSet};
pub use sidebar::{
  DocumentationPage,
  SidebarNode,
  SidebarTree,
  ValidationReport,
  validate_structure,
};
pub use version::VersionSelector;
