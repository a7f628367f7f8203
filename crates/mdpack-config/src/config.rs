//! The mdpack configuration file model.
use std::{
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use indexmap::IndexMap;
use mdpack_markdown::{LinkPolicy, ProcessorOptions, ProcessorOptionsBuilder};
use mdpack_render::{OutputFormat, TemplateOptions, TemplatePreset};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder substituted into [`Config::version_output`].
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Markdown transformer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct TransformConfig {
  pub remove_frontmatter:    bool,
  pub process_includes:      bool,
  pub transform_links:       bool,
  pub frontmatter_delimiter: String,
  pub link_policy:           LinkPolicy,
  /// Largest file read, in bytes.
  pub max_file_size:         u64,
}

impl Default for TransformConfig {
  fn default() -> Self {
    Self {
      remove_frontmatter:    true,
      process_includes:      true,
      transform_links:       true,
      frontmatter_delimiter: "---".to_string(),
      link_policy:           LinkPolicy::Anchor,
      max_file_size:         mdpack_markdown::source::DEFAULT_MAX_FILE_SIZE,
    }
  }
}

/// Section templating and aggregate header settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct TemplateConfig {
  /// When set, replaces the format, flags and length cap below.
  pub preset:              Option<TemplatePreset>,
  pub format:              OutputFormat,
  pub include_toc:         bool,
  pub include_metadata:    bool,
  pub include_word_count:  bool,
  pub include_timestamp:   bool,
  pub include_source_path: bool,
  pub max_section_length:  Option<usize>,
  pub section_separator:   String,
  /// Title of the aggregate header.
  pub title:               Option<String>,
  /// Description of the aggregate header.
  pub description:         Option<String>,
  pub custom_headers:      IndexMap<String, String>,
}

impl Default for TemplateConfig {
  fn default() -> Self {
    let options = TemplateOptions::default();
    Self {
      preset:              None,
      format:              options.format,
      include_toc:         options.include_toc,
      include_metadata:    options.include_metadata,
      include_word_count:  options.include_word_count,
      include_timestamp:   options.include_timestamp,
      include_source_path: options.include_source_path,
      max_section_length:  options.max_section_length,
      section_separator:   options.section_separator,
      title:               None,
      description:         None,
      custom_headers:      IndexMap::new(),
    }
  }
}

impl TemplateConfig {
  /// Section generator options for this configuration.
  #[must_use]
  pub fn section_options(&self) -> TemplateOptions {
    let base = match self.preset {
      Some(preset) => TemplateOptions::preset(preset),
      None => {
        TemplateOptions {
          format: self.format,
          include_toc: self.include_toc,
          include_metadata: self.include_metadata,
          include_word_count: self.include_word_count,
          include_timestamp: self.include_timestamp,
          include_source_path: self.include_source_path,
          max_section_length: self.max_section_length,
          ..TemplateOptions::default()
        }
      },
    };

    TemplateOptions {
      section_separator: self.section_separator.clone(),
      custom_headers: self.custom_headers.clone(),
      ..base
    }
  }

  fn merge(&mut self, other: Self) {
    if other.preset.is_some() {
      self.preset = other.preset;
    }
    self.format = other.format;
    self.include_toc = other.include_toc;
    self.include_metadata = other.include_metadata;
    self.include_word_count = other.include_word_count;
    self.include_timestamp = other.include_timestamp;
    self.include_source_path = other.include_source_path;
    if other.max_section_length.is_some() {
      self.max_section_length = other.max_section_length;
    }
    self.section_separator = other.section_separator;
    if other.title.is_some() {
      self.title = other.title;
    }
    if other.description.is_some() {
      self.description = other.description;
    }
    self.custom_headers.extend(other.custom_headers);
  }
}

/// Ignore-pattern settings, see [`crate::IgnoreSet::active_patterns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
  /// Start from [`crate::DEFAULT_IGNORE_PATTERNS`].
  pub use_defaults: bool,
  /// Patterns added to the defaults.
  pub extra:        Vec<String>,
  /// Full replacement for defaults and extras.
  pub only:         Option<Vec<String>>,
}

impl Default for IgnoreConfig {
  fn default() -> Self {
    Self {
      use_defaults: true,
      extra:        Vec::new(),
      only:         None,
    }
  }
}

impl IgnoreConfig {
  fn merge(&mut self, other: Self) {
    self.use_defaults = other.use_defaults;
    self.extra.extend(other.extra);
    if other.only.is_some() {
      self.only = other.only;
    }
  }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Navigation source: a JSON/TOML export or a script config to scan.
  pub sidebar_path:     PathBuf,
  /// Documentation root.
  pub docs_dir:         PathBuf,
  /// Combined cross-version artifact.
  pub output:           PathBuf,
  /// Per-version artifact, relative to `docs_dir`; `{version}` is
  /// substituted.
  pub version_output:   String,
  /// Also write `<docs_dir>/<version>/everything.md`.
  pub write_everything: bool,
  /// Supported versions. Empty means whatever the sidebar provides.
  pub versions:         Vec<String>,
  /// Walk `<docs_dir>/<version>` instead of following the sidebar.
  pub discover:         bool,
  pub transform:        TransformConfig,
  pub template:         TemplateConfig,
  pub ignore:           IgnoreConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      sidebar_path:     PathBuf::from("docs/.vitepress/config.js"),
      docs_dir:         PathBuf::from("docs"),
      output:           PathBuf::from("docs/public/llms.txt"),
      version_output:   "public/{version}/llms-full.txt".to_string(),
      write_everything: true,
      versions:         Vec::new(),
      discover:         false,
      transform:        TransformConfig::default(),
      template:         TemplateConfig::default(),
      ignore:           IgnoreConfig::default(),
    }
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}'"))
  })
}

fn parse_optional<T: FromStr>(
  key: &str,
  value: &str,
) -> Result<Option<T>, ConfigError> {
  if value.is_empty() {
    Ok(None)
  } else {
    parse_value(key, value).map(Some)
  }
}

fn parse_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(ToString::to_string)
    .collect()
}

fn optional_string(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn unknown_key(key: &str) -> ConfigError {
  ConfigError::Config(format!(
    "Unknown configuration key: '{key}'. See documentation for supported keys."
  ))
}

impl Config {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format
  /// is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {e}",
        path.display()
      ))
    })?;

    let ext = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match ext.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {e}",
            path.display()
          ))
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {e}",
            path.display()
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load the given config files merged in order, or a discovered one, or
  /// the defaults; then apply `KEY=VALUE` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    config.apply_overrides(config_overrides)?;
    Ok(config)
  }

  /// Merge another config into this one, the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: other's [`Some`] value replaces this one
  /// - [`Vec<T>`] fields: other's entries are appended
  /// - Plain fields: other's value always replaces
  /// - Maps: other's entries are merged in
  pub fn merge(&mut self, other: Self) {
    self.sidebar_path = other.sidebar_path;
    self.docs_dir = other.docs_dir;
    self.output = other.output;
    self.version_output = other.version_output;
    self.write_everything = other.write_everything;
    self.versions.extend(other.versions);
    self.discover = other.discover;
    self.transform = other.transform;
    self.template.merge(other.template);
    self.ignore.merge(other.ignore);
  }

  /// Apply `KEY=VALUE` overrides. Nested keys are dotted
  /// (`transform.link_policy=strip`).
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not `KEY=VALUE`, names an unknown
  /// key, or carries a value of the wrong type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override.
  ///
  /// List values are comma-separated; an empty value clears optional
  /// fields.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys or unparseable values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key.split_once('.') {
      Some(("transform", field)) => self.apply_transform_override(key, field, value),
      Some(("template", field)) => self.apply_template_override(key, field, value),
      Some(("ignore", field)) => self.apply_ignore_override(key, field, value),
      Some(_) => Err(unknown_key(key)),
      None => {
        match key {
          "sidebar_path" => self.sidebar_path = PathBuf::from(value),
          "docs_dir" => self.docs_dir = PathBuf::from(value),
          "output" => self.output = PathBuf::from(value),
          "version_output" => self.version_output = value.to_string(),
          "write_everything" => {
            self.write_everything = parse_bool(key, value)?;
          },
          "versions" => self.versions = parse_list(value),
          "discover" => self.discover = parse_bool(key, value)?,
          _ => return Err(unknown_key(key)),
        }
        Ok(())
      },
    }
  }

  fn apply_transform_override(
    &mut self,
    key: &str,
    field: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let transform = &mut self.transform;
    match field {
      "remove_frontmatter" => transform.remove_frontmatter = parse_bool(key, value)?,
      "process_includes" => transform.process_includes = parse_bool(key, value)?,
      "transform_links" => transform.transform_links = parse_bool(key, value)?,
      "frontmatter_delimiter" => {
        transform.frontmatter_delimiter = value.to_string();
      },
      "link_policy" => transform.link_policy = parse_value(key, value)?,
      "max_file_size" => transform.max_file_size = parse_value(key, value)?,
      _ => return Err(unknown_key(key)),
    }
    Ok(())
  }

  fn apply_template_override(
    &mut self,
    key: &str,
    field: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let template = &mut self.template;
    if let Some(header) = field.strip_prefix("custom_headers.") {
      if header.is_empty() {
        return Err(unknown_key(key));
      }
      template
        .custom_headers
        .insert(header.to_string(), value.to_string());
      return Ok(());
    }

    match field {
      "preset" => template.preset = parse_optional(key, value)?,
      "format" => template.format = parse_value(key, value)?,
      "include_toc" => template.include_toc = parse_bool(key, value)?,
      "include_metadata" => template.include_metadata = parse_bool(key, value)?,
      "include_word_count" => {
        template.include_word_count = parse_bool(key, value)?;
      },
      "include_timestamp" => template.include_timestamp = parse_bool(key, value)?,
      "include_source_path" => {
        template.include_source_path = parse_bool(key, value)?;
      },
      "max_section_length" => {
        template.max_section_length = parse_optional(key, value)?;
      },
      "section_separator" => {
        template.section_separator = value.replace("\\n", "\n");
      },
      "title" => template.title = optional_string(value),
      "description" => template.description = optional_string(value),
      _ => return Err(unknown_key(key)),
    }
    Ok(())
  }

  fn apply_ignore_override(
    &mut self,
    key: &str,
    field: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let ignore = &mut self.ignore;
    match field {
      "use_defaults" => ignore.use_defaults = parse_bool(key, value)?,
      "extra" => ignore.extra = parse_list(value),
      "only" => ignore.only = (!value.is_empty()).then(|| parse_list(value)),
      _ => return Err(unknown_key(key)),
    }
    Ok(())
  }

  /// Search for a config file in the working directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        Self::find_config_file_in(&current_dir)
      })
      .clone()
  }

  /// Search `dir` for a config file under one of the standard names.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    const CONFIG_FILENAMES: &[&str] = &[
      "mdpack.toml",
      "mdpack.json",
      ".mdpack.toml",
      ".mdpack.json",
      ".config/mdpack.toml",
      ".config/mdpack.json",
    ];

    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Write the commented default configuration in `format` (`toml` or
  /// `json`) to `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = crate::templates::get_template(format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {e}",
        path.display()
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Markdown processor options rooted at `docs_dir`.
  #[must_use]
  pub fn processor_options(&self) -> ProcessorOptions {
    let transform = &self.transform;
    ProcessorOptionsBuilder::new()
      .remove_frontmatter(transform.remove_frontmatter)
      .process_includes(transform.process_includes)
      .transform_links(transform.transform_links)
      .frontmatter_delimiter(transform.frontmatter_delimiter.as_str())
      .link_policy(transform.link_policy)
      .max_file_size(transform.max_file_size)
      .docs_root(Some(&self.docs_dir))
      .build()
  }

  /// Where the aggregate for `version` is written.
  #[must_use]
  pub fn version_output_path(&self, version: &str) -> PathBuf {
    self
      .docs_dir
      .join(self.version_output.replace(VERSION_PLACEHOLDER, version))
  }

  /// Where the `everything.md` copy for `version` is written.
  #[must_use]
  pub fn everything_path(&self, version: &str) -> PathBuf {
    self.docs_dir.join(version).join("everything.md")
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  fn overrides(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn test_merge_option_fields() {
    let mut base = Config::default();
    base.template.title = Some("Base".to_string());

    let mut other = Config::default();
    other.template.description = Some("Other".to_string());
    base.merge(other);

    assert_eq!(base.template.title.as_deref(), Some("Base"));
    assert_eq!(base.template.description.as_deref(), Some("Other"));
  }

  #[test]
  fn test_merge_vec_fields_append() {
    let mut base = Config {
      versions: vec!["3.0".to_string()],
      ..Default::default()
    };
    base.ignore.extra.push("a.md".to_string());

    let mut other = Config {
      versions: vec!["4.0".to_string()],
      ..Default::default()
    };
    other.ignore.extra.push("b.md".to_string());
    base.merge(other);

    assert_eq!(base.versions, vec!["3.0", "4.0"]);
    assert_eq!(base.ignore.extra, vec!["a.md", "b.md"]);
  }

  #[test]
  fn test_merge_plain_fields_replace() {
    let mut base = Config::default();
    let other = Config {
      docs_dir: PathBuf::from("site"),
      write_everything: false,
      ..Default::default()
    };
    base.merge(other);
    assert_eq!(base.docs_dir, PathBuf::from("site"));
    assert!(!base.write_everything);
  }

  #[test]
  fn test_apply_overrides() {
    let mut config = Config::default();
    config
      .apply_overrides(&overrides(&[
        "docs_dir=site",
        "write_everything=no",
        "versions=3.0, 4.0",
        "transform.link_policy=strip",
        "transform.max_file_size=1024",
        "template.format=markdown",
        "template.include_toc=1",
        "template.max_section_length=500",
        "template.section_separator=\\n\\n",
        "template.custom_headers.project=Docs",
        "ignore.extra=upgrade.md,drafts/**",
      ]))
      .expect("valid overrides");

    assert_eq!(config.docs_dir, PathBuf::from("site"));
    assert!(!config.write_everything);
    assert_eq!(config.versions, vec!["3.0", "4.0"]);
    assert_eq!(config.transform.link_policy, LinkPolicy::Strip);
    assert_eq!(config.transform.max_file_size, 1024);
    assert_eq!(config.template.format, OutputFormat::Markdown);
    assert!(config.template.include_toc);
    assert_eq!(config.template.max_section_length, Some(500));
    assert_eq!(config.template.section_separator, "\n\n");
    assert_eq!(
      config.template.custom_headers.get("project").map(String::as_str),
      Some("Docs")
    );
    assert_eq!(config.ignore.extra, vec!["upgrade.md", "drafts/**"]);
  }

  #[test]
  fn test_apply_override_clears_optional_fields() {
    let mut config = Config::default();
    config
      .apply_overrides(&overrides(&[
        "template.max_section_length=100",
        "template.title=Docs",
        "ignore.only=*.md",
      ]))
      .expect("set");
    config
      .apply_overrides(&overrides(&[
        "template.max_section_length=",
        "template.title=",
        "ignore.only=",
      ]))
      .expect("clear");
    assert_eq!(config.template.max_section_length, None);
    assert_eq!(config.template.title, None);
    assert_eq!(config.ignore.only, None);
  }

  #[test]
  fn test_apply_overrides_errors() {
    let mut config = Config::default();

    let err = config
      .apply_overrides(&overrides(&["no_equals_sign"]))
      .expect_err("format");
    assert!(err.to_string().contains("Expected KEY=VALUE"));

    for key in ["unknown=1", "transform.unknown=1", "nested.key=1"] {
      let err = config
        .apply_overrides(&overrides(&[key]))
        .expect_err("unknown key");
      assert!(err.to_string().contains("Unknown configuration key"));
    }

    let err = config
      .apply_overrides(&overrides(&["discover=maybe"]))
      .expect_err("bool");
    assert!(err.to_string().contains("Expected true/false"));

    let err = config
      .apply_overrides(&overrides(&["template.format=html"]))
      .expect_err("format value");
    assert!(err.to_string().contains("Invalid value for 'template.format'"));
  }

  #[test]
  fn test_section_options_preset() {
    let template = TemplateConfig {
      preset: Some(TemplatePreset::Llms),
      format: OutputFormat::PlainText,
      section_separator: "\n".to_string(),
      ..Default::default()
    };
    let options = template.section_options();
    assert_eq!(options.format, OutputFormat::LlmsTxt);
    assert_eq!(options.max_section_length, Some(50_000));
    assert_eq!(options.section_separator, "\n");

    let plain = TemplateConfig {
      format: OutputFormat::PlainText,
      include_toc: true,
      ..Default::default()
    };
    let options = plain.section_options();
    assert_eq!(options.format, OutputFormat::PlainText);
    assert!(options.include_toc);
  }

  #[test]
  fn test_paths() {
    let config = Config::default();
    assert_eq!(
      config.version_output_path("3.0"),
      PathBuf::from("docs/public/3.0/llms-full.txt")
    );
    assert_eq!(
      config.everything_path("3.0"),
      PathBuf::from("docs/3.0/everything.md")
    );

    let options = config.processor_options();
    assert_eq!(options.docs_root, Some(PathBuf::from("docs")));
    assert_eq!(options.link_policy, LinkPolicy::Anchor);
  }
}
