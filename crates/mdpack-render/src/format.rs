//! One formatting function per [`crate::OutputFormat`].
use std::{fmt::Write as _, sync::LazyLock};

use log::warn;
use mdpack_markdown::utils::{clean_for_llm, first_heading, never_matching_regex};
use regex::Regex;
use serde_json::json;

use crate::{error::RenderError, section::Section};

/// Title used when a document has neither a heading nor a short first line.
pub const FALLBACK_TITLE: &str = "Untitled Section";

/// Marker appended to truncated content.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

fn regex(pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile regex {pattern:?}: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
}

static FENCED_CODE_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"(?s)```.*?```|~~~.*?~~~"));
static HEADING_MARK_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+"));
static BOLD_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"\*\*(.+?)\*\*|__(.+?)__"));
static ITALIC_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"\*([^*\n]+)\*|\b_([^_\n]+)_\b"));
static INLINE_CODE_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"`([^`\n]*)`"));
static LINK_RE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"!?\[([^\]]*)\]\([^)]*\)"));

/// Section title: the first heading, else a short first line that does not
/// read like a sentence, else [`FALLBACK_TITLE`].
#[must_use]
pub fn extract_title(content: &str) -> String {
  if let Some(heading) = first_heading(content) {
    return heading;
  }

  let first_line = content.lines().map(str::trim).find(|l| !l.is_empty());
  match first_line {
    Some(line) if line.chars().count() < 100 && !line.contains('.') => {
      line.to_string()
    },
    _ => FALLBACK_TITLE.to_string(),
  }
}

/// Cut `content` to at most `max` bytes.
///
/// When the last paragraph break inside the cut lies beyond 80% of the
/// limit, the cut moves back to it. [`TRUNCATION_MARKER`] is appended to
/// anything that was shortened.
#[must_use]
pub fn truncate_content(content: &str, max: usize) -> String {
  if content.len() <= max {
    return content.to_string();
  }

  warn!(
    "Content exceeds maximum section length, truncating ({} > {max})",
    content.len()
  );

  let mut end = max;
  while !content.is_char_boundary(end) {
    end -= 1;
  }
  let mut cut = &content[..end];

  // max * 0.8 without leaving integer arithmetic
  if let Some(pos) = cut.rfind("\n\n")
    && pos * 5 > max * 4
  {
    cut = &cut[..pos];
  }

  format!("{cut}{TRUNCATION_MARKER}")
}

/// Annotated Markdown: a title heading unless the content already opens
/// with one, then an optional metadata block.
#[must_use]
pub fn format_markdown(section: &Section, include_metadata: bool) -> String {
  let meta = &section.metadata;
  let mut out = String::new();

  if !section.content.trim_start().starts_with('#') {
    let _ = write!(out, "# {}\n\n", meta.title);
  }

  if include_metadata {
    out.push_str("---\n");
    let _ = writeln!(out, "source: {}", meta.source_file);
    if let Some(words) = meta.word_count {
      let _ = writeln!(out, "words: {words}");
    }
    if let Some(generated) = &meta.generated_at {
      let _ = writeln!(out, "generated: {generated}");
    }
    for (key, value) in &meta.custom {
      let _ = writeln!(out, "{key}: {value}");
    }
    out.push_str("---\n\n");
  }

  out.push_str(&section.content);
  out
}

/// Strip Markdown markup from `content`, keeping the text.
#[must_use]
pub fn strip_markup(content: &str) -> String {
  let text = FENCED_CODE_RE.replace_all(content, "[CODE BLOCK]");
  let text = HEADING_MARK_RE.replace_all(&text, "");
  let text = BOLD_RE.replace_all(&text, "$1$2");
  let text = ITALIC_RE.replace_all(&text, "$1$2");
  let text = INLINE_CODE_RE.replace_all(&text, "$1");
  LINK_RE.replace_all(&text, "$1").into_owned()
}

/// Plain text: upper-cased title underlined with `=`, then the content with
/// its markup stripped.
#[must_use]
pub fn format_plain_text(section: &Section) -> String {
  let title = &section.metadata.title;
  let mut out = String::new();
  let _ = write!(
    out,
    "{}\n{}\n\n",
    title.to_uppercase(),
    "=".repeat(title.chars().count())
  );
  out.push_str(&strip_markup(&section.content));
  out
}

/// The JSON value behind [`format_structured`].
#[must_use]
pub fn structured_record(section: &Section) -> serde_json::Value {
  json!({
    "id": section.id,
    "metadata": section.metadata,
    "structure": section.structure,
    "table_of_contents": section.table_of_contents,
    "content": {
      "raw": section.content,
      "cleaned": clean_for_llm(&section.content),
    },
    "stats": {
      "heading_count": section.structure.stats.heading_count,
      "code_block_count": section.structure.stats.code_block_count,
      "max_heading_level": section.structure.stats.max_heading_level,
      "has_code": section.structure.stats.has_code,
      "content_length": section.content.len(),
      "word_count": section.metadata.word_count,
    },
  })
}

/// Structured record, pretty-printed.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
pub fn format_structured(section: &Section) -> Result<String, RenderError> {
  serde_json::to_string_pretty(&structured_record(section)).map_err(|source| {
    RenderError::Serialize {
      id: section.id.clone(),
      source,
    }
  })
}

/// LLM-oriented Markdown.
///
/// Adds the title unless the content opens with a heading, a table of
/// contents when the section has more than three entries, then removes HTML
/// comments and collapses blank runs. The source comment goes in after the
/// cleanup so that it survives it.
#[must_use]
pub fn format_llms(section: &Section, include_metadata: bool) -> String {
  let meta = &section.metadata;
  let mut body = String::new();

  if section.table_of_contents.len() > 3 {
    body.push_str("## Table of Contents\n\n");
    for entry in &section.table_of_contents {
      let _ = writeln!(body, "{}- [{}](#{})", entry.indent(), entry.text, entry.anchor);
    }
    body.push('\n');
  }
  body.push_str(&section.content);
  let body = clean_for_llm(&body);

  let mut out = String::new();
  if !section.content.trim_start().starts_with('#') {
    let _ = write!(out, "# {}\n\n", meta.title);
  }
  if include_metadata {
    let _ = write!(out, "<!-- Source: {}", meta.source_file);
    if let Some(words) = meta.word_count {
      let _ = write!(out, " | Words: {words}");
    }
    out.push_str(" -->\n\n");
  }
  out.push_str(&body);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_title() {
    assert_eq!(extract_title("Intro text\n\n## Setup\n"), "Setup");
    assert_eq!(extract_title("Short line\n\nbody."), "Short line");
    assert_eq!(
      extract_title("This is a sentence. It goes on.\n"),
      FALLBACK_TITLE
    );
    assert_eq!(extract_title(""), FALLBACK_TITLE);
  }

  #[test]
  fn test_truncate_short_content_unchanged() {
    assert_eq!(truncate_content("abc", 10), "abc");
  }

  #[test]
  fn test_truncate_backs_off_to_paragraph() {
    let content = format!("{}\n\n{}", "a".repeat(90), "b".repeat(50));
    let out = truncate_content(&content, 100);
    assert_eq!(out, format!("{}{TRUNCATION_MARKER}", "a".repeat(90)));
  }

  #[test]
  fn test_truncate_hard_cut_when_break_is_early() {
    let content = format!("{}\n\n{}", "a".repeat(10), "b".repeat(200));
    let out = truncate_content(&content, 100);
    assert!(out.starts_with(&content[..100]));
    assert!(out.ends_with(TRUNCATION_MARKER));
  }

  #[test]
  fn test_truncate_respects_char_boundaries() {
    let out = truncate_content("ééééé", 3);
    assert_eq!(out, format!("é{TRUNCATION_MARKER}"));
  }

  #[test]
  fn test_strip_markup() {
    let input = "# Title\n\nSome **bold** and *italic* with `code` and \
                 [a link](guide.md).\n\n```rust\nfn main() {}\n```\n";
    let out = strip_markup(input);
    assert_eq!(
      out,
      "Title\n\nSome bold and italic with code and a link.\n\n[CODE BLOCK]\n"
    );
  }
}
