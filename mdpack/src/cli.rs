use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use mdpack_config::Config;
use mdpack_render::OutputFormat;

/// Logging verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
  #[value(alias = "silent")]
  Off,
  Error,
  Warn,
  #[default]
  Info,
  Debug,
  Trace,
}

impl From<LogLevel> for LevelFilter {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Off => Self::Off,
      LogLevel::Error => Self::Error,
      LogLevel::Warn => Self::Warn,
      LogLevel::Info => Self::Info,
      LogLevel::Debug => Self::Debug,
      LogLevel::Trace => Self::Trace,
    }
  }
}

/// Command line interface for mdpack
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Aggregate VitePress documentation into llms.txt artifacts"
)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "CLI flags are independent switches"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Version to process: X.Y, X.Y.Z, latest or all
  #[arg(id = "selector", value_name = "VERSION", default_value = "latest")]
  pub version: String,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files
  /// overriding earlier ones
  #[arg(long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "set", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  /// Path to the VitePress config or sidebar export
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Path of the combined output file
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Documentation root
  #[arg(short, long)]
  pub docs_dir: Option<PathBuf>,

  /// Additional ignore patterns
  #[arg(long, num_args = 1.., action = clap::ArgAction::Append)]
  pub ignore: Vec<String>,

  /// Replace every ignore pattern with these
  #[arg(long, num_args = 1.., action = clap::ArgAction::Append)]
  pub ignore_only: Vec<String>,

  /// Do not apply the default ignore patterns
  #[arg(long)]
  pub no_default_ignores: bool,

  /// Walk the version directory instead of following the sidebar
  #[arg(long)]
  pub discover: bool,

  /// Include tables of contents
  #[arg(long)]
  pub include_toc: bool,

  /// Include per-section metadata
  #[arg(long, num_args = 0..=1, default_missing_value = "true")]
  pub include_metadata: Option<bool>,

  /// Truncate sections longer than this many bytes
  #[arg(long)]
  pub max_section_length: Option<usize>,

  /// Output format: markdown, text, llms_txt or structured
  #[arg(long)]
  pub format: Option<OutputFormat>,

  /// Title of the generated files
  #[arg(long)]
  pub title: Option<String>,

  /// Description of the generated files
  #[arg(long)]
  pub description: Option<String>,

  /// Select files and report what would be written, without writing
  #[arg(long)]
  pub dry_run: bool,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Logging level
  #[arg(long, value_enum, default_value_t = LogLevel::Info)]
  pub log_level: LogLevel,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  pub log_file: Option<PathBuf>,
}

/// All supported subcommands for the mdpack CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new mdpack configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "mdpack.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Effective log level; `--verbose` wins over `--log-level`.
  #[must_use]
  pub fn log_filter(&self) -> LevelFilter {
    if self.verbose {
      LevelFilter::Debug
    } else {
      self.log_level.into()
    }
  }

  /// Apply command line flags on top of a loaded configuration.
  pub fn apply_to(&self, config: &mut Config) {
    if let Some(path) = &self.config {
      config.sidebar_path.clone_from(path);
    }
    if let Some(path) = &self.output {
      config.output.clone_from(path);
    }
    if let Some(dir) = &self.docs_dir {
      config.docs_dir.clone_from(dir);
    }

    config.ignore.extra.extend(self.ignore.iter().cloned());
    if !self.ignore_only.is_empty() {
      config.ignore.only = Some(self.ignore_only.clone());
    }
    if self.no_default_ignores {
      config.ignore.use_defaults = false;
    }
    if self.discover {
      config.discover = true;
    }

    let template = &mut config.template;
    if self.include_toc {
      template.include_toc = true;
    }
    if let Some(include) = self.include_metadata {
      template.include_metadata = include;
    }
    if let Some(max) = self.max_section_length {
      template.max_section_length = Some(max);
    }
    if let Some(format) = self.format {
      template.format = format;
    }
    if let Some(title) = &self.title {
      template.title = Some(title.clone());
    }
    if let Some(description) = &self.description {
      template.description = Some(description.clone());
    }
  }
}
