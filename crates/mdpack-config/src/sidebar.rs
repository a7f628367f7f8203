//! Sidebar (navigation tree) loading and page extraction.
//!
//! The tree is read as data only: JSON and TOML exports are parsed directly,
//! JavaScript/TypeScript configs go through the structural scan in
//! [`crate::scan`].
use std::{fs, path::Path};

use indexmap::{IndexMap, map::Entry};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ConfigError, scan};

/// One node of a version's navigation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarNode {
  #[serde(default)]
  pub text:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link:        Option<String>,
  #[serde(default)]
  pub collapsible: bool,
  #[serde(default)]
  pub collapsed:   bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub items:       Vec<SidebarNode>,
}

impl SidebarNode {
  /// A leaf page node.
  #[must_use]
  pub fn page(text: &str, link: &str) -> Self {
    Self {
      text: text.to_string(),
      link: Some(link.to_string()),
      ..Default::default()
    }
  }

  /// A branch node grouping `items`.
  #[must_use]
  pub fn group(text: &str, items: Vec<Self>) -> Self {
    Self {
      text: text.to_string(),
      items,
      ..Default::default()
    }
  }

  fn has_link(&self) -> bool {
    self.link.as_deref().is_some_and(|l| !l.trim().is_empty())
  }
}

/// A page to include in an aggregate, in navigation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationPage {
  pub text: String,
  pub link: String,
}

/// Result of [`validate_structure`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
  pub valid:       bool,
  pub errors:      Vec<String>,
  pub warnings:    Vec<String>,
  pub versions:    Vec<String>,
  /// Number of top-level items across all versions.
  pub total_items: usize,
}

/// Check a raw sidebar value: the top level must be a map, each version a
/// sequence, and every item should carry `text`. Missing `text` is only a
/// warning.
#[must_use]
pub fn validate_structure(value: &Value) -> ValidationReport {
  let mut report = ValidationReport::default();

  let Some(map) = value.as_object() else {
    report
      .errors
      .push("Sidebar structure is not a valid object".to_string());
    return report;
  };

  if map.is_empty() {
    report
      .warnings
      .push("No versions found in sidebar structure".to_string());
  }

  for (version, items) in map {
    report.versions.push(version.clone());
    let Some(items) = items.as_array() else {
      report
        .errors
        .push(format!("Version {version} items is not an array"));
      continue;
    };

    report.total_items += items.len();
    check_items(version, items, &mut report.warnings);
  }

  report.valid = report.errors.is_empty();
  report
}

fn check_items(version: &str, items: &[Value], warnings: &mut Vec<String>) {
  for item in items {
    let has_text = item
      .get("text")
      .and_then(Value::as_str)
      .is_some_and(|t| !t.trim().is_empty());
    if !has_text {
      warnings.push(format!(
        "Item in version {version} is missing text property"
      ));
    }
    if let Some(nested) = item.get("items").and_then(Value::as_array) {
      check_items(version, nested, warnings);
    }
  }
}

/// Normalise a sidebar key to a version name: `"/4.0/"` becomes `"4.0"`,
/// other keys lose their surrounding slashes and a bare `"/"` becomes
/// `"default"`.
#[must_use]
pub fn normalize_version_key(key: &str) -> String {
  let trimmed = key.trim().trim_matches('/');
  if trimmed.is_empty() {
    "default".to_string()
  } else {
    trimmed.to_string()
  }
}

/// Navigation trees keyed by version, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SidebarTree {
  versions: IndexMap<String, Vec<SidebarNode>>,
}

impl SidebarTree {
  /// Build a tree from already-normalised versions.
  #[must_use]
  pub const fn new(versions: IndexMap<String, Vec<SidebarNode>>) -> Self {
    Self { versions }
  }

  /// Load the sidebar from a JSON, TOML or JavaScript/TypeScript file.
  ///
  /// The sidebar is taken from `themeConfig.sidebar`, then `sidebar`, then
  /// the document root.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, no sidebar can be found,
  /// or the structure is invalid.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Err(ConfigError::Config(format!(
        "Config file not found: {}",
        path.display()
      )));
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
      return Err(ConfigError::Config(format!(
        "Config file is empty: {}",
        path.display()
      )));
    }

    let ext = path
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_lowercase)
      .unwrap_or_default();

    let raw: Value = match ext.as_str() {
      "json" => serde_json::from_str(&content)?,
      "toml" => toml::from_str(&content)?,
      "js" | "mjs" | "cjs" | "ts" | "mts" | "cts" => {
        let outcome = scan::scan_sidebar(&content)?;
        if !outcome.dropped.is_empty() {
          warn!(
            "{} sidebar fragments in {} could not be read as data",
            outcome.dropped.len(),
            path.display()
          );
        }
        outcome.value
      },
      other => {
        return Err(ConfigError::Config(format!(
          "Unsupported sidebar source format '{other}': {}",
          path.display()
        )));
      },
    };

    let sidebar = locate_sidebar(&raw);
    let tree = Self::from_value(sidebar)?;
    info!(
      "Loaded sidebar from {} ({} versions)",
      path.display(),
      tree.versions.len()
    );
    Ok(tree)
  }

  /// Build a tree from a raw sidebar value.
  ///
  /// Items that are not objects, and nodes with neither a link nor child
  /// items, are dropped with a warning.
  ///
  /// # Errors
  ///
  /// Returns an error if [`validate_structure`] reports errors.
  pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
    let report = validate_structure(value);
    for warning in &report.warnings {
      warn!("{warning}");
    }
    if !report.valid {
      return Err(ConfigError::Config(format!(
        "Invalid sidebar structure: {}",
        report.errors.join("; ")
      )));
    }

    let mut versions: IndexMap<String, Vec<SidebarNode>> = IndexMap::new();
    if let Some(map) = value.as_object() {
      for (key, items) in map {
        let version = normalize_version_key(key);
        let nodes = items
          .as_array()
          .map(|items| convert_items(&version, items))
          .unwrap_or_default();
        debug!("Sidebar version {version} from key {key:?}: {} sections", nodes.len());
        match versions.entry(version) {
          Entry::Occupied(mut existing) => {
            warn!(
              "Sidebar key {key:?} repeats version {}, appending its {} \
               section(s)",
              existing.key(),
              nodes.len()
            );
            existing.get_mut().extend(nodes);
          },
          Entry::Vacant(slot) => {
            slot.insert(nodes);
          },
        }
      }
    }

    Ok(Self { versions })
  }

  /// Version names in source order.
  #[must_use]
  pub fn versions(&self) -> Vec<String> {
    self.versions.keys().cloned().collect()
  }

  #[must_use]
  pub fn get(&self, version: &str) -> Option<&[SidebarNode]> {
    self.versions.get(version).map(Vec::as_slice)
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.versions.is_empty()
  }

  /// Flatten a version's tree into pages, depth-first in pre-order.
  ///
  /// Only nodes with a non-empty link are emitted; branch nodes are
  /// traversed but not emitted unless they carry a link themselves.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::VersionNotFound`] if the version is absent.
  pub fn extract_pages(
    &self,
    version: &str,
  ) -> Result<Vec<DocumentationPage>, ConfigError> {
    let nodes =
      self
        .versions
        .get(version)
        .ok_or_else(|| ConfigError::VersionNotFound {
          version:   version.to_string(),
          available: self.versions(),
        })?;

    let mut pages = Vec::new();
    collect_pages(nodes, &mut pages);
    Ok(pages)
  }
}

fn collect_pages(nodes: &[SidebarNode], pages: &mut Vec<DocumentationPage>) {
  for node in nodes {
    if let Some(link) = node.link.as_deref().filter(|_| node.has_link()) {
      pages.push(DocumentationPage {
        text: node.text.clone(),
        link: link.trim().to_string(),
      });
    }
    collect_pages(&node.items, pages);
  }
}

fn convert_items(version: &str, items: &[Value]) -> Vec<SidebarNode> {
  items
    .iter()
    .filter_map(|item| convert_node(version, item))
    .collect()
}

fn convert_node(version: &str, item: &Value) -> Option<SidebarNode> {
  let Some(object) = item.as_object() else {
    warn!("Skipping non-object sidebar item in version {version}: {item}");
    return None;
  };

  let text = object
    .get("text")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string();
  let link = object
    .get("link")
    .and_then(Value::as_str)
    .filter(|l| !l.trim().is_empty())
    .map(ToString::to_string);
  let items = object
    .get("items")
    .and_then(Value::as_array)
    .map(|nested| convert_items(version, nested))
    .unwrap_or_default();

  if link.is_none() && items.is_empty() {
    warn!("Skipping sidebar item without link or items in version {version}: {text:?}");
    return None;
  }

  Some(SidebarNode {
    text,
    link,
    collapsible: object
      .get("collapsible")
      .and_then(Value::as_bool)
      .unwrap_or(false),
    collapsed: object
      .get("collapsed")
      .and_then(Value::as_bool)
      .unwrap_or(false),
    items,
  })
}

fn locate_sidebar(raw: &Value) -> &Value {
  raw
    .pointer("/themeConfig/sidebar")
    .or_else(|| raw.get("sidebar"))
    .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use serde_json::json;

  use super::*;

  #[test]
  fn test_extract_pages_preserves_order() {
    let value = json!({
      "/3.0/": [
        { "text": "A", "items": [{ "text": "A1", "link": "/a1" }] },
        { "text": "B", "link": "/b" }
      ]
    });
    let tree = SidebarTree::from_value(&value).expect("tree");
    let pages = tree.extract_pages("3.0").expect("pages");
    assert_eq!(pages, vec![
      DocumentationPage {
        text: "A1".to_string(),
        link: "/a1".to_string(),
      },
      DocumentationPage {
        text: "B".to_string(),
        link: "/b".to_string(),
      },
    ]);
    assert_eq!(tree.extract_pages("3.0").expect("pages again"), pages);
  }

  #[test]
  fn test_colliding_version_keys_are_merged() {
    let value = json!({
      "/4.0/": [{ "text": "Intro", "link": "/4.0/" }],
      "/3.0/": [{ "text": "Old", "link": "/3.0/" }],
      "4.0": [{ "text": "Guide", "link": "/4.0/guide" }]
    });
    let tree = SidebarTree::from_value(&value).expect("tree");

    assert_eq!(tree.versions(), vec!["4.0", "3.0"]);
    let links: Vec<_> = tree
      .extract_pages("4.0")
      .expect("pages")
      .into_iter()
      .map(|page| page.link)
      .collect();
    assert_eq!(links, vec!["/4.0/", "/4.0/guide"]);
  }

  #[test]
  fn test_branch_with_link_is_emitted_before_children() {
    let tree = SidebarTree::new(IndexMap::from([("4.0".to_string(), vec![
      SidebarNode {
        link: Some("/4.0/fields/".to_string()),
        ..SidebarNode::group("Fields", vec![SidebarNode::page(
          "Text",
          "/4.0/fields/text",
        )])
      },
    ])]));
    let links: Vec<_> = tree
      .extract_pages("4.0")
      .expect("pages")
      .into_iter()
      .map(|p| p.link)
      .collect();
    assert_eq!(links, vec!["/4.0/fields/", "/4.0/fields/text"]);
  }

  #[test]
  fn test_meaningless_nodes_are_skipped() {
    let value = json!({
      "/2.0/": [
        { "text": "Empty group" },
        { "text": "Empty items", "items": [] },
        "not an object",
        { "text": "Page", "link": "  " },
        { "text": "Real", "link": "/2.0/real" }
      ]
    });
    let tree = SidebarTree::from_value(&value).expect("tree");
    assert_eq!(tree.get("2.0").map(<[SidebarNode]>::len), Some(1));
  }

  #[test]
  fn test_missing_version() {
    let tree = SidebarTree::from_value(&json!({ "/2.0/": [], "/3.0/": [] }))
      .expect("tree");
    assert_eq!(tree.versions(), vec!["2.0", "3.0"]);
    assert!(matches!(
      tree.extract_pages("9.9"),
      Err(ConfigError::VersionNotFound { .. })
    ));
  }

  #[test]
  fn test_validate_structure() {
    let report = validate_structure(&json!({
      "/4.0/": [{ "link": "/4.0/x" }, { "text": "ok", "items": [{ "link": "/y" }] }],
      "/3.0/": { "text": "not a list" }
    }));
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Version /3.0/ items is not an array"]);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.total_items, 2);
    assert_eq!(report.versions, vec!["/4.0/", "/3.0/"]);

    let not_map = validate_structure(&json!([1, 2]));
    assert!(!not_map.valid);
  }

  #[test]
  fn test_normalize_version_key() {
    assert_eq!(normalize_version_key("/4.0/"), "4.0");
    assert_eq!(normalize_version_key("4.0"), "4.0");
    assert_eq!(normalize_version_key("/guide/"), "guide");
    assert_eq!(normalize_version_key("/"), "default");
  }

  #[test]
  fn test_locate_sidebar() {
    let nested = json!({ "themeConfig": { "sidebar": { "a": [] } } });
    assert_eq!(locate_sidebar(&nested), &json!({ "a": [] }));
    let flat = json!({ "sidebar": { "b": [] } });
    assert_eq!(locate_sidebar(&flat), &json!({ "b": [] }));
    let bare = json!({ "c": [] });
    assert_eq!(locate_sidebar(&bare), &bare);
  }
}
