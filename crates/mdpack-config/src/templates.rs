//! Commented default configuration files written by `mdpack init`.
use crate::error::ConfigError;

/// Default configuration in TOML, with every key documented.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# mdpack configuration file

# Navigation source. JSON and TOML exports are read as data; VitePress
# script configs (.js, .mjs, .ts) are scanned for their `sidebar` literal.
sidebar_path = "docs/.vitepress/config.js"

# Root of the documentation tree
docs_dir = "docs"

# Combined artifact, written when an explicit set of versions is processed
output = "docs/public/llms.txt"

# Per-version artifact, relative to docs_dir
version_output = "public/{version}/llms-full.txt"

# Also write <docs_dir>/<version>/everything.md
write_everything = true

# Supported versions; empty means every version found in the sidebar
versions = []

# Walk <docs_dir>/<version> for Markdown files instead of following the sidebar
discover = false

[transform]
remove_frontmatter = true
process_includes = true
transform_links = true
frontmatter_delimiter = "---"

# "anchor" rewrites [text](page.md) to [text](#page-heading),
# "strip" keeps only the link text
link_policy = "anchor"

# Largest file that will be read, in bytes
max_file_size = 104857600

[template]
# One of "llms", "documentation", "analysis". Overrides the settings below.
# preset = "llms"

# One of "llms_txt", "markdown", "text", "structured"
format = "llms_txt"
include_toc = false
include_metadata = true
include_word_count = true
include_timestamp = true
include_source_path = true

# Truncate sections longer than this many bytes
# max_section_length = 50000

section_separator = "\n\n---\n\n"

# Aggregate header
# title = "My Documentation"
# description = "Complete documentation for LLM consumption"

# Extra key/value pairs added to every section's metadata
[template.custom_headers]
# project = "My Project"

[ignore]
# Dotfiles, backups, logs, node_modules, dist, build, everything.md
use_defaults = true

# Added to the defaults
extra = []

# Replaces defaults and extra entirely
# only = ["drafts/**"]
"#;

/// Default configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "sidebar_path": "docs/.vitepress/config.js",
  "docs_dir": "docs",
  "output": "docs/public/llms.txt",
  "version_output": "public/{version}/llms-full.txt",
  "write_everything": true,
  "versions": [],
  "discover": false,
  "transform": {
    "remove_frontmatter": true,
    "process_includes": true,
    "transform_links": true,
    "frontmatter_delimiter": "---",
    "link_policy": "anchor",
    "max_file_size": 104857600
  },
  "template": {
    "preset": null,
    "format": "llms_txt",
    "include_toc": false,
    "include_metadata": true,
    "include_word_count": true,
    "include_timestamp": true,
    "include_source_path": true,
    "max_section_length": null,
    "section_separator": "\n\n---\n\n",
    "title": null,
    "description": null,
    "custom_headers": {}
  },
  "ignore": {
    "use_defaults": true,
    "extra": [],
    "only": null
  }
}
"#;

/// The default configuration template for `format`.
///
/// # Errors
///
/// Returns an error if `format` is neither `toml` nor `json`.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => {
      Err(ConfigError::Config(format!(
        "Unsupported config format: {format}"
      )))
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;
  use crate::Config;

  #[test]
  fn test_toml_template_matches_defaults() {
    let config: Config =
      toml::from_str(DEFAULT_TOML_TEMPLATE).expect("valid TOML template");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_json_template_matches_defaults() {
    let config: Config =
      serde_json::from_str(DEFAULT_JSON_TEMPLATE).expect("valid JSON template");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_get_template() {
    assert!(get_template("TOML").is_ok());
    assert!(get_template("json").is_ok());
    assert!(get_template("yaml").is_err());
  }
}
