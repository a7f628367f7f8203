use thiserror::Error;

/// Errors raised while templating a section.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("Failed to serialize section {id}: {source}")]
  Serialize {
    id:     String,
    #[source]
    source: serde_json::Error,
  },
}
