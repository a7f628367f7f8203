//! Structural scan of script-based site configs.
//!
//! VitePress sidebars usually live inside a JavaScript or TypeScript module.
//! Nothing is evaluated here: the scanner finds the `sidebar:` property and
//! reads the literal data behind it (objects, arrays, strings, numbers,
//! booleans). `const NAME = <literal>` bindings referenced by name are
//! followed. Every other expression (function calls, spreads, template
//! strings with substitutions, computed values) is dropped and reported, so
//! the result may be incomplete but never contains guessed entries.
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::ConfigError;

static SIDEBAR_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?:\bsidebar|["']sidebar["'])\s*:"#).unwrap_or_else(|e| {
    log::error!("Failed to compile SIDEBAR_KEY_RE regex: {e}");
    mdpack_markdown::utils::never_matching_regex()
  })
});

/// Bindings are followed at most this many levels deep.
const MAX_BINDING_DEPTH: usize = 8;

/// Result of a structural scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
  /// The literal data found behind `sidebar:`.
  pub value:   Value,
  /// Source fragments that could not be read as literal data.
  pub dropped: Vec<String>,
}

/// Locate the `sidebar:` property in a script config and read its value.
///
/// # Errors
///
/// Returns an error if no `sidebar:` property exists or its value is not
/// literal data at all.
pub fn scan_sidebar(source: &str) -> Result<ScanOutcome, ConfigError> {
  let found = SIDEBAR_KEY_RE.find(source).ok_or_else(|| {
    ConfigError::Config(
      "Could not find sidebar configuration in config file".to_string(),
    )
  })?;

  let mut scanner = Scanner::new(source, found.end(), 0);
  let value = scanner.parse_value();
  let dropped = scanner.dropped;

  for fragment in &dropped {
    warn!("Dropped unparseable sidebar fragment: {}", abbreviate(fragment));
  }

  let value = value.ok_or_else(|| {
    ConfigError::Config(
      "Sidebar configuration is not literal data and cannot be read without \
       evaluating the config"
        .to_string(),
    )
  })?;

  debug!("Scanned sidebar with {} dropped fragments", dropped.len());
  Ok(ScanOutcome { value, dropped })
}

/// Read the literal value starting at byte offset `pos`, if any.
///
/// Exposed for tests and tooling; [`scan_sidebar`] is the usual entry point.
#[must_use]
pub fn scan_value_at(source: &str, pos: usize) -> (Option<Value>, Vec<String>) {
  let mut scanner = Scanner::new(source, pos, 0);
  let value = scanner.parse_value();
  (value, scanner.dropped)
}

fn abbreviate(fragment: &str) -> String {
  let flat: String = fragment.split_whitespace().collect::<Vec<_>>().join(" ");
  if flat.chars().count() > 60 {
    let head: String = flat.chars().take(57).collect();
    format!("{head}...")
  } else {
    flat
  }
}

struct Scanner<'a> {
  src:     &'a str,
  pos:     usize,
  depth:   usize,
  dropped: Vec<String>,
}

const fn is_ident_start(c: u8) -> bool {
  c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

const fn is_ident_char(c: u8) -> bool {
  is_ident_start(c) || c.is_ascii_digit()
}

impl<'a> Scanner<'a> {
  const fn new(src: &'a str, pos: usize, depth: usize) -> Self {
    Self {
      src,
      pos,
      depth,
      dropped: Vec::new(),
    }
  }

  fn peek(&self) -> Option<u8> {
    self.src.as_bytes().get(self.pos).copied()
  }

  fn peek_at(&self, offset: usize) -> Option<u8> {
    self.src.as_bytes().get(self.pos + offset).copied()
  }

  fn rest(&self) -> &'a str {
    self.src.get(self.pos..).unwrap_or_default()
  }

  fn skip_trivia(&mut self) {
    loop {
      match (self.peek(), self.peek_at(1)) {
        (Some(c), _) if c.is_ascii_whitespace() => self.pos += 1,
        (Some(b'/'), Some(b'/')) => {
          self.pos = self
            .rest()
            .find('\n')
            .map_or(self.src.len(), |i| self.pos + i);
        },
        (Some(b'/'), Some(b'*')) => {
          self.pos = self.rest()[2..]
            .find("*/")
            .map_or(self.src.len(), |i| self.pos + 2 + i + 2);
        },
        _ => break,
      }
    }
  }

  /// Whether the scanner sits at the end of a value.
  fn at_value_end(&mut self) -> bool {
    self.skip_trivia();
    matches!(self.peek(), None | Some(b',' | b'}' | b']' | b')' | b';'))
  }

  fn drop_from(&mut self, start: usize) -> Option<Value> {
    self.pos = start;
    let fragment = self.skip_expression();
    if !fragment.is_empty() {
      self.dropped.push(fragment.to_string());
    }
    None
  }

  /// Parse a literal value. Returns `None` (after skipping and recording the
  /// expression) when the value is not literal data.
  fn parse_value(&mut self) -> Option<Value> {
    self.skip_trivia();
    let start = self.pos;

    let value = match self.peek()? {
      b'{' => Some(self.parse_object()),
      b'[' => Some(self.parse_array()),
      quote @ (b'"' | b'\'' | b'`') => self.parse_string(quote).map(Value::String),
      c if c.is_ascii_digit() || c == b'-' || c == b'.' => self.parse_number(),
      c if is_ident_start(c) => self.parse_word(),
      _ => None,
    };

    match value {
      Some(value) if self.at_value_end() => Some(value),
      _ => self.drop_from(start),
    }
  }

  fn parse_object(&mut self) -> Value {
    self.pos += 1;
    let mut map = Map::new();

    loop {
      self.skip_trivia();
      match self.peek() {
        None => break,
        Some(b'}') => {
          self.pos += 1;
          break;
        },
        Some(b',') => {
          self.pos += 1;
          continue;
        },
        _ => {},
      }

      let start = self.pos;
      if self.rest().starts_with("...") {
        self.drop_from(start);
        continue;
      }

      let Some(key) = self.parse_key() else {
        self.drop_from(start);
        self.skip_stray();
        continue;
      };

      self.skip_trivia();
      if self.peek() == Some(b':') {
        self.pos += 1;
        if let Some(value) = self.parse_value() {
          map.insert(key, value);
        }
      } else {
        // Shorthand properties and methods.
        self.drop_from(start);
      }
      self.skip_stray();
    }

    Value::Object(map)
  }

  fn parse_array(&mut self) -> Value {
    self.pos += 1;
    let mut items = Vec::new();

    loop {
      self.skip_trivia();
      match self.peek() {
        None => break,
        Some(b']') => {
          self.pos += 1;
          break;
        },
        Some(b',') => {
          self.pos += 1;
          continue;
        },
        _ => {},
      }

      let start = self.pos;
      if self.rest().starts_with("...") {
        self.drop_from(start);
        continue;
      }
      if let Some(value) = self.parse_value() {
        items.push(value);
      }
      self.skip_stray();
    }

    Value::Array(items)
  }

  /// After a member, step over anything that is not a separator or closer so
  /// a malformed member can never stall the loop.
  fn skip_stray(&mut self) {
    self.skip_trivia();
    if let Some(c) = self.peek() {
      if !matches!(c, b',' | b'}' | b']') {
        let start = self.pos;
        self.drop_from(start);
        if self.pos == start {
          self.pos += 1;
        }
      }
    }
  }

  fn parse_key(&mut self) -> Option<String> {
    match self.peek()? {
      quote @ (b'"' | b'\'') => self.parse_string(quote),
      c if is_ident_start(c) || c.is_ascii_digit() => {
        let start = self.pos;
        while self.peek().is_some_and(|c| is_ident_char(c) || c == b'.') {
          self.pos += 1;
        }
        Some(self.src[start..self.pos].to_string())
      },
      _ => None,
    }
  }

  /// Parse a quoted string. Template literals with substitutions are not
  /// literal data and yield `None`.
  fn parse_string(&mut self, quote: u8) -> Option<String> {
    self.pos += 1;
    let mut out = String::new();
    let mut chars = self.rest().char_indices();
    let mut has_substitution = false;

    while let Some((i, c)) = chars.next() {
      match c {
        '\\' => {
          if let Some((_, escaped)) = chars.next() {
            match escaped {
              'n' => out.push('\n'),
              't' => out.push('\t'),
              'r' => out.push('\r'),
              other => out.push(other),
            }
          }
        },
        '$' if quote == b'`' && self.rest()[i..].starts_with("${") => {
          has_substitution = true;
          out.push(c);
        },
        c if c as u32 == u32::from(quote) => {
          self.pos += i + 1;
          return (!has_substitution).then_some(out);
        },
        c => out.push(c),
      }
    }

    self.pos = self.src.len();
    None
  }

  fn parse_number(&mut self) -> Option<Value> {
    let start = self.pos;
    while self
      .peek()
      .is_some_and(|c| c.is_ascii_digit() || matches!(c, b'.' | b'-' | b'+' | b'e' | b'E' | b'_'))
    {
      self.pos += 1;
    }
    let literal = self.src[start..self.pos].replace('_', "");
    if let Ok(int) = literal.parse::<i64>() {
      return Some(Value::Number(int.into()));
    }
    literal
      .parse::<f64>()
      .ok()
      .and_then(Number::from_f64)
      .map(Value::Number)
  }

  fn parse_word(&mut self) -> Option<Value> {
    let start = self.pos;
    while self.peek().is_some_and(is_ident_char) {
      self.pos += 1;
    }
    let word = &self.src[start..self.pos];

    match word {
      "true" => Some(Value::Bool(true)),
      "false" => Some(Value::Bool(false)),
      "null" | "undefined" => Some(Value::Null),
      name => {
        // Only a bare identifier can be resolved; `a.b`, `f()` and friends
        // are expressions.
        if self.at_value_end() {
          self.resolve_binding(name)
        } else {
          None
        }
      },
    }
  }

  /// Follow `const|let|var NAME = <literal>` elsewhere in the source.
  fn resolve_binding(&mut self, name: &str) -> Option<Value> {
    if self.depth >= MAX_BINDING_DEPTH {
      return None;
    }

    let pattern = format!(r"\b(?:const|let|var)\s+{}\s*=", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let found = re.find(self.src)?;

    let mut inner = Scanner::new(self.src, found.end(), self.depth + 1);
    let value = inner.parse_value();
    self.dropped.extend(inner.dropped);
    if value.is_some() {
      debug!("Resolved sidebar binding {name}");
    }
    value
  }

  /// Skip one expression, honouring nesting and strings, up to the next
  /// top-level separator or closer. Returns the skipped source.
  fn skip_expression(&mut self) -> &'a str {
    let src = self.src;
    let start = self.pos;
    let mut depth = 0usize;

    while let Some(c) = self.peek() {
      match c {
        b'"' | b'\'' | b'`' => {
          let _ = self.parse_string(c);
          continue;
        },
        b'/' if matches!(self.peek_at(1), Some(b'/' | b'*')) => {
          self.skip_trivia();
          continue;
        },
        b'{' | b'[' | b'(' => depth += 1,
        b'}' | b']' | b')' => {
          if depth == 0 {
            break;
          }
          depth -= 1;
        },
        b',' | b';' if depth == 0 => break,
        _ => {},
      }
      self.pos += 1;
    }

    src[start..self.pos].trim()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use serde_json::json;

  use super::*;

  #[test]
  fn test_scan_plain_literals() {
    let source = r#"
      // site config
      export default defineConfig({
        title: "Docs",
        themeConfig: {
          sidebar: {
            '/4.0/': [
              {
                text: 'Getting Started', /* group */
                collapsible: true,
                items: [
                  { text: "Installation", link: "/4.0/installation.html" },
                  { text: `Configuration`, link: '/4.0/configuration', },
                ],
              },
            ],
          },
        },
      })
    "#;

    let outcome = scan_sidebar(source).expect("sidebar");
    assert!(outcome.dropped.is_empty());
    assert_eq!(
      outcome.value,
      json!({
        "/4.0/": [{
          "text": "Getting Started",
          "collapsible": true,
          "items": [
            { "text": "Installation", "link": "/4.0/installation.html" },
            { "text": "Configuration", "link": "/4.0/configuration" }
          ]
        }]
      })
    );
  }

  #[test]
  fn test_scan_drops_expressions_and_follows_bindings() {
    let source = r#"
      const fieldItems = [
        { text: "Text", link: "/3.0/fields/text" },
        ...extraFields,
      ];
      export default {
        themeConfig: {
          sidebar: {
            "/3.0/": [
              { text: "Fields", items: fieldItems },
              { text: "Generated", items: getFiles("fields") },
              { text: `Version ${v}`, link: "/3.0/x" },
              { text: "Ok", link: "/3.0/ok", count: 2 },
            ],
          },
        },
      };
    "#;

    let outcome = scan_sidebar(source).expect("sidebar");
    assert_eq!(
      outcome.value,
      json!({
        "/3.0/": [
          { "text": "Fields", "items": [
            { "text": "Text", "link": "/3.0/fields/text" }
          ]},
          { "text": "Generated" },
          { "link": "/3.0/x" },
          { "text": "Ok", "link": "/3.0/ok", "count": 2 }
        ]
      })
    );
    assert_eq!(outcome.dropped.len(), 3);
    assert!(outcome.dropped.iter().any(|d| d.starts_with("getFiles(")));
    assert!(outcome.dropped.iter().any(|d| d == "...extraFields"));
  }

  #[test]
  fn test_scan_missing_sidebar() {
    assert!(matches!(
      scan_sidebar("export default { title: 'x' }"),
      Err(ConfigError::Config(_))
    ));
    assert!(matches!(
      scan_sidebar("export default { sidebar: buildSidebar() }"),
      Err(ConfigError::Config(_))
    ));
  }

  #[test]
  fn test_scan_value_at_numbers_and_nulls() {
    let (value, dropped) = scan_value_at("[1, -2.5, null, false, 1e3]", 0);
    assert!(dropped.is_empty());
    assert_eq!(value, Some(json!([1, -2.5, null, false, 1000.0])));
  }
}
