//! Text helpers shared by the transformer and the section templater.
pub mod structure;

use std::sync::LazyLock;

use regex::Regex;

pub use self::structure::{
  extract_code_blocks,
  extract_headings,
  extract_inline_text,
  first_heading,
};

/// Slugify a string for use as an anchor ID.
///
/// Lower-cases the input, collapses every run of non-alphanumeric characters
/// into a single dash and trims leading/trailing dashes, so
/// `"Hello, World! 2.0"` becomes `"hello-world-2-0"`.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;

  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug
}

/// Clean Markdown for LLM consumption: drop HTML comments, collapse three or
/// more consecutive newlines into two and trim the result.
#[must_use]
pub fn clean_for_llm(content: &str) -> String {
  let without_comments = HTML_COMMENT_RE.replace_all(content, "");
  BLANK_RUN_RE
    .replace_all(&without_comments, "\n\n")
    .trim()
    .to_string()
}

/// Count words in Markdown content.
///
/// Fenced code blocks, inline code spans and HTML comments are removed first;
/// a word is then any whitespace-delimited token containing at least one word
/// character.
#[must_use]
pub fn count_words(content: &str) -> usize {
  let stripped = CODE_FENCE_RE.replace_all(content, " ");
  let stripped = INLINE_CODE_RE.replace_all(&stripped, " ");
  let stripped = HTML_COMMENT_RE.replace_all(&stripped, " ");

  stripped
    .split_whitespace()
    .filter(|token| token.chars().any(|c| c.is_alphanumeric() || c == '_'))
    .count()
}

/// Estimated reading time at 200 words per minute, rounded up.
#[must_use]
pub const fn reading_minutes(words: usize) -> usize {
  words.div_ceil(200)
}

/// Create a regex that never matches anything.
///
/// Used as a fallback for static regexes that fail to compile, so a bad
/// pattern degrades a single transformation instead of panicking.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(clippy::expect_used, reason = "Constant pattern that always compiles")]
    Regex::new(r"$^").expect("regex pattern $^ should always compile")
  })
}

pub(crate) fn lazy_regex(pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile regex {pattern:?}: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
}

static HTML_COMMENT_RE: LazyLock<Regex> =
  LazyLock::new(|| lazy_regex(r"(?s)<!--.*?-->"));

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| lazy_regex(r"\n{3,}"));

static CODE_FENCE_RE: LazyLock<Regex> =
  LazyLock::new(|| lazy_regex(r"(?s)```.*?```|~~~.*?~~~"));

static INLINE_CODE_RE: LazyLock<Regex> =
  LazyLock::new(|| lazy_regex(r"`[^`\n]*`"));

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify() {
    assert_eq!(slugify("Hello, World! 2.0"), "hello-world-2-0");
    assert_eq!(slugify("  --Getting   Started--  "), "getting-started");
    assert_eq!(slugify("already-a-slug"), "already-a-slug");
    assert_eq!(slugify("!!!"), "");
  }

  #[test]
  fn test_clean_for_llm() {
    let input = "\n\n# Title\n<!-- hidden -->\n\n\n\n\nBody\n<!--\nmulti\n-->\n";
    assert_eq!(clean_for_llm(input), "# Title\n\nBody");
  }

  #[test]
  fn test_count_words_skips_code_and_comments() {
    let input = "Two words\n\n```sh\nnot counted here\n```\n\nand `inline \
                 code` here <!-- nor this --> -- ok";
    // Two, words, and, here, ok
    assert_eq!(count_words(input), 5);
    assert_eq!(count_words(""), 0);
  }

  #[test]
  fn test_reading_minutes() {
    assert_eq!(reading_minutes(0), 0);
    assert_eq!(reading_minutes(1), 1);
    assert_eq!(reading_minutes(200), 1);
    assert_eq!(reading_minutes(201), 2);
  }

  #[test]
  fn test_never_matching_regex() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything at all"));
  }
}
