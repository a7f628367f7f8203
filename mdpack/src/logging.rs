use std::{fs, path::Path};

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

use crate::error::MdpackError;

/// Initialize the global logger, writing to `log_file` when given.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a logger is already
/// installed.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), MdpackError> {
  let mut builder = Builder::new();
  builder.filter_level(level);

  if let Some(path) = log_file {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|e| {
        MdpackError::Logging(format!("{}: {e}", parent.display()))
      })?;
    }
    let file = fs::File::create(path)
      .map_err(|e| MdpackError::Logging(format!("{}: {e}", path.display())))?;
    builder
      .target(Target::Pipe(Box::new(file)))
      .write_style(WriteStyle::Never);
  } else {
    builder.write_style(WriteStyle::Auto);
  }

  builder
    .try_init()
    .map_err(|e| MdpackError::Logging(e.to_string()))
}
