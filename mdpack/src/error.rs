use mdpack_config::ConfigError;
use mdpack_markdown::ProcessError;
use mdpack_render::RenderError;
use mdpack_utils::OutputError;
use thiserror::Error;

/// Top-level error type for the mdpack binary.
#[derive(Debug, Error)]
pub enum MdpackError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error(transparent)]
  Render(#[from] RenderError),

  #[error(transparent)]
  Output(#[from] OutputError),

  #[error("Failed to set up logging: {0}")]
  Logging(String),
}
