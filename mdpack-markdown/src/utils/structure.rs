//! Structure analysis on the comrak AST.
//!
//! Headings and code blocks are collected from a parsed document rather than
//! with line regexes, so `#` lines inside fenced code are never mistaken for
//! headings.
use comrak::{
  Arena,
  nodes::{AstNode, NodeHeading, NodeValue},
  options::Options,
  parse_document,
};

use super::slugify;
use crate::types::{CodeBlock, Header};

fn comrak_options() -> Options<'static> {
  let mut options = Options::default();
  options.extension.table = true;
  options.extension.footnotes = true;
  options.extension.strikethrough = true;
  options.extension.tasklist = true;
  options.render.r#unsafe = true;
  options
}

/// Extract all inline text from a node, recursing into emphasis, links and
/// similar containers. Images and raw HTML contribute nothing.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough => text.push_str(&extract_inline_text(child)),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      _ => {},
    }
  }
  text
}

/// Extract every heading (levels 1 to 6) in document order.
#[must_use]
pub fn extract_headings(content: &str) -> Vec<Header> {
  let arena = Arena::new();
  let options = comrak_options();
  let root = parse_document(&arena, content, &options);

  let mut headers = Vec::new();
  for node in root.descendants() {
    if let NodeValue::Heading(NodeHeading { level, .. }) =
      &node.data.borrow().value
    {
      let text = extract_inline_text(node).trim().to_string();
      if text.is_empty() {
        continue;
      }
      headers.push(Header {
        anchor: slugify(&text),
        level: *level,
        text,
      });
    }
  }
  headers
}

/// Text of the first heading in the document, of any level.
#[must_use]
pub fn first_heading(content: &str) -> Option<String> {
  let arena = Arena::new();
  let options = comrak_options();
  let root = parse_document(&arena, content, &options);

  root.descendants().find_map(|node| {
    if !matches!(node.data.borrow().value, NodeValue::Heading(_)) {
      return None;
    }
    let text = extract_inline_text(node);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
  })
}

/// Extract fenced code blocks with their language tag and line count.
///
/// Indented code blocks are not reported.
#[must_use]
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
  let arena = Arena::new();
  let options = comrak_options();
  let root = parse_document(&arena, content, &options);

  let mut blocks = Vec::new();
  for node in root.descendants() {
    if let NodeValue::CodeBlock(block) = &node.data.borrow().value {
      if !block.fenced {
        continue;
      }
      let language = block
        .info
        .split_whitespace()
        .next()
        .unwrap_or("text")
        .to_string();
      let body = block.literal.trim();
      let line_count = if body.is_empty() {
        0
      } else {
        body.lines().count()
      };
      blocks.push(CodeBlock {
        language,
        line_count,
      });
    }
  }
  blocks
}

#[cfg(test)]
mod tests {
  use super::*;

  const DOC: &str = "# Intro to *mdpack*\n\nSome text.\n\n```sh\n# not a \
                     heading\necho hi\n```\n\n## Using `mdpack` \
                     [now](x.md)\n\n~~~\nplain\n~~~\n\n    indented code\n";

  #[test]
  fn test_extract_headings_ignores_fenced_hashes() {
    let headings = extract_headings(DOC);
    assert_eq!(headings.len(), 2);
    assert_eq!(headings[0].text, "Intro to mdpack");
    assert_eq!(headings[0].level, 1);
    assert_eq!(headings[0].anchor, "intro-to-mdpack");
    assert_eq!(headings[1].text, "Using mdpack now");
    assert_eq!(headings[1].level, 2);
  }

  #[test]
  fn test_first_heading() {
    assert_eq!(first_heading(DOC).as_deref(), Some("Intro to mdpack"));
    assert_eq!(first_heading("no headings here"), None);
    assert_eq!(
      first_heading("text\n\n### Deep\n\n# Top").as_deref(),
      Some("Deep")
    );
  }

  #[test]
  fn test_extract_code_blocks() {
    let blocks = extract_code_blocks(DOC);
    assert_eq!(blocks, vec![
      CodeBlock {
        language:   "sh".to_string(),
        line_count: 2,
      },
      CodeBlock {
        language:   "text".to_string(),
        line_count: 1,
      },
    ]);
  }
}
