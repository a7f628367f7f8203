//! The three document transforms: frontmatter removal, include expansion
//! and link rewriting.
//!
//! Each one is a free function so it can be used outside of
//! [`crate::MarkdownProcessor`].
use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
};

use log::{debug, warn};
use regex::{Captures, Regex};

use super::{
  context::PipelineContext,
  types::{LinkPolicy, ProcessorOptions},
};
use crate::{
  source::{normalize_path, read_source},
  types::{Frontmatter, IncludeRecord, LinkKind, LinkRecord},
  utils::{first_heading, lazy_regex, slugify},
};

/// Matches `<!-- @include: path -->` anywhere and `@@include(path)` on a line
/// of its own.
static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
  lazy_regex(
    r"<!--\s*@include:\s*(?P<comment>.+?)\s*-->|(?m:^[ \t]*@@include\s*\(\s*(?P<call>.+?)\s*\)[ \t]*$)",
  )
});

/// Inline links. A linked image (`[![alt](src)](target)`) is matched as a
/// whole first; a leading `!` marks a plain image so it can be skipped.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  lazy_regex(
    r"\[(?P<image>!\[[^\]]*\]\([^)]*\))\]\((?P<image_target>[^)]+)\)|(?P<bang>!?)\[(?P<text>[^\]]+)\]\((?P<target>[^)]+)\)",
  )
});

/// Split a leading frontmatter block from `content`.
///
/// The block must open on the very first line with `delimiter`. When no
/// closing delimiter line follows, the content is returned untouched.
#[must_use]
pub fn strip_frontmatter(content: &str, delimiter: &str) -> Frontmatter {
  let untouched = || {
    Frontmatter {
      body:        content.to_string(),
      frontmatter: None,
    }
  };

  let lines: Vec<&str> = content.split('\n').collect();
  if lines.first().is_none_or(|first| first.trim_end() != delimiter) {
    return untouched();
  }

  let Some(closing) = lines
    .iter()
    .skip(1)
    .position(|line| line.trim() == delimiter)
    .map(|i| i + 1)
  else {
    warn!("Frontmatter delimiter not closed, treating as regular content");
    return untouched();
  };

  let frontmatter = lines[1..closing].join("\n").trim().to_string();
  Frontmatter {
    body:        lines[closing + 1..].join("\n"),
    frontmatter: (!frontmatter.is_empty()).then_some(frontmatter),
  }
}

/// Expand include directives in `content`, resolving paths against
/// `base_dir`.
///
/// Included files are substituted literally, with their own include
/// directives expanded relative to their directory. The caller is expected
/// to have marked the root document as in flight in `ctx`; any include that
/// would re-enter an in-flight path is replaced with a
/// `<!-- Circular include detected: PATH -->` marker instead.
///
/// Missing and unreadable includes become placeholder comments; this never
/// fails.
pub fn resolve_includes(
  ctx: &mut PipelineContext,
  content: &str,
  base_dir: &Path,
  max_file_size: u64,
) -> (String, Vec<IncludeRecord>) {
  let mut records = Vec::new();
  let expanded = expand_includes(ctx, content, base_dir, max_file_size, &mut records);
  (expanded, records)
}

fn expand_includes(
  ctx: &mut PipelineContext,
  content: &str,
  base_dir: &Path,
  max_file_size: u64,
  records: &mut Vec<IncludeRecord>,
) -> String {
  let mut output = String::with_capacity(content.len());
  let mut last = 0;

  for caps in INCLUDE_RE.captures_iter(content) {
    let Some(whole) = caps.get(0) else { continue };
    let Some(raw) = caps.name("comment").or_else(|| caps.name("call")) else {
      continue;
    };

    output.push_str(&content[last..whole.start()]);
    last = whole.end();

    let include_path = raw.as_str().trim().trim_matches(['"', '\'']);
    let resolved = normalize_path(&base_dir.join(include_path));
    debug!("Processing include {include_path} -> {}", resolved.display());

    let mut record = IncludeRecord {
      directive:     whole.as_str().to_string(),
      path:          include_path.to_string(),
      resolved_path: resolved.clone(),
      found:         true,
      circular:      false,
      size:          0,
    };

    let replacement = if ctx.is_in_flight(&resolved) {
      warn!("Circular include detected: {}", resolved.display());
      record.circular = true;
      format!("<!-- Circular include detected: {} -->", resolved.display())
    } else {
      match load_include(ctx, &resolved, max_file_size) {
        Some(Ok(raw_content)) => {
          let dir = resolved.parent().unwrap_or(base_dir).to_path_buf();
          ctx.enter(resolved.clone());
          let nested =
            expand_includes(ctx, &raw_content, &dir, max_file_size, records);
          ctx.leave(&resolved);
          nested
        },
        Some(Err(message)) => {
          warn!("Error including {include_path}: {message}");
          format!("<!-- Error including {include_path}: {message} -->")
        },
        None => {
          warn!(
            "Include file not found: {include_path} ({})",
            resolved.display()
          );
          record.found = false;
          format!("<!-- Include not found: {include_path} -->")
        },
      }
    };

    record.size = replacement.len();
    records.push(record);
    output.push_str(&replacement);
  }

  output.push_str(&content[last..]);
  output
}

/// Raw include content from the cache or disk. `None` when the file does not
/// exist.
fn load_include(
  ctx: &mut PipelineContext,
  resolved: &Path,
  max_file_size: u64,
) -> Option<Result<String, String>> {
  if let Some(cached) = ctx.cached_include(resolved) {
    debug!("Include loaded from cache: {}", resolved.display());
    return Some(Ok(cached.to_string()));
  }

  if !resolved.exists() {
    return None;
  }

  Some(match read_source(resolved, max_file_size) {
    Ok(text) => {
      ctx.cache_include(resolved.to_path_buf(), text.clone());
      Ok(text)
    },
    Err(e) => Err(e.to_string()),
  })
}

/// Classify a link target.
#[must_use]
pub fn classify_link(target: &str) -> LinkKind {
  if target.starts_with("http://")
    || target.starts_with("https://")
    || target.starts_with("mailto:")
  {
    LinkKind::External
  } else if target.starts_with('#') {
    LinkKind::Anchor
  } else {
    LinkKind::Relative
  }
}

/// Rewrite relative links so they work once every document is merged into
/// a single file.
///
/// Relative targets resolve against `base_dir`, root-relative ones (`/x`)
/// against the options' `docs_root` when given. Links to existing Markdown files become
/// `[text](#anchor)` under [`LinkPolicy::Anchor`], where the anchor is the
/// slug of the target's first heading (or of its file stem). Under
/// [`LinkPolicy::Strip`] every relative link that is not an existing
/// non-Markdown asset is replaced with its text; for a linked image the
/// text is the image itself. External links, anchors and images are never
/// touched, which makes the transform idempotent.
///
/// Target files are read with the options' size limit and frontmatter
/// delimiter when looking for their first heading.
pub fn transform_links(
  content: &str,
  base_dir: &Path,
  options: &ProcessorOptions,
) -> (String, Vec<LinkRecord>) {
  let docs_root = options.docs_root.as_deref();
  let policy = options.link_policy;
  let mut links = Vec::new();

  let transformed = LINK_RE.replace_all(content, |caps: &Captures| {
    let original = caps[0].to_string();

    let linked_image = caps.name("image").zip(caps.name("image_target"));
    let plain_link = caps.name("text").zip(caps.name("target"));
    let is_image = caps.name("bang").is_some_and(|b| !b.as_str().is_empty());

    let (text, raw_target) = match (linked_image, plain_link) {
      (Some((image, target)), _) => (image.as_str(), target.as_str()),
      (None, Some((text, target))) if !is_image => {
        (text.as_str(), target.as_str())
      },
      _ => return original,
    };

    let text = text.to_string();
    let raw_target = raw_target.trim();
    let target = raw_target.split_whitespace().next().unwrap_or(raw_target);
    let kind = classify_link(target);

    let mut record = LinkRecord {
      original: original.clone(),
      text: text.clone(),
      target: target.to_string(),
      kind,
      rewritten: None,
      resolved_path: None,
    };

    if kind != LinkKind::Relative {
      links.push(record);
      return original;
    }

    let candidates = link_candidates(target, base_dir, docs_root);
    let resolved = candidates.iter().find(|p| p.is_file()).cloned();

    let replacement = match (&resolved, policy) {
      (Some(path), _) if !is_markdown(path) => None,
      (Some(path), LinkPolicy::Anchor) => {
        Some(format!(
          "[{text}](#{})",
          anchor_for_file(
            path,
            &options.frontmatter_delimiter,
            options.max_file_size
          )
        ))
      },
      (None, LinkPolicy::Anchor) => {
        warn!(
          "Unresolved link target {target}, tried: {}",
          display_candidates(&candidates)
        );
        None
      },
      (Some(_), LinkPolicy::Strip) => Some(text.clone()),
      (None, LinkPolicy::Strip) => {
        warn!(
          "Unresolved link target {target}, tried: {}",
          display_candidates(&candidates)
        );
        Some(text.clone())
      },
    };

    record.resolved_path = resolved;
    record.rewritten.clone_from(&replacement);
    links.push(record);
    replacement.unwrap_or(original)
  });

  (transformed.into_owned(), links)
}

/// Files a relative link target may refer to, in lookup order.
fn link_candidates(
  target: &str,
  base_dir: &Path,
  docs_root: Option<&Path>,
) -> Vec<PathBuf> {
  let path_part = target
    .split(['#', '?'])
    .next()
    .unwrap_or_default();
  if path_part.is_empty() {
    return Vec::new();
  }

  let base = match path_part.strip_prefix('/') {
    Some(rooted) => docs_root.unwrap_or(base_dir).join(rooted),
    None => base_dir.join(path_part),
  };
  let base = normalize_path(&base);

  if path_part.ends_with('/') {
    return vec![base.join("index.md")];
  }

  match base.extension().and_then(|e| e.to_str()) {
    Some("html") => vec![base.with_extension("md")],
    Some("md" | "markdown") => vec![base],
    _ => {
      let mut with_md = base.clone().into_os_string();
      with_md.push(".md");
      vec![base.clone(), PathBuf::from(with_md), base.join("index.md")]
    },
  }
}

fn is_markdown(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext == "md" || ext == "markdown")
}

/// Anchor for a merged document: the slug of its first heading, falling back
/// to the slug of its file stem. Files over `max_size` bytes are not read.
#[must_use]
pub fn anchor_for_file(path: &Path, delimiter: &str, max_size: u64) -> String {
  let stem_slug = || {
    path
      .file_stem()
      .map(|stem| slugify(&stem.to_string_lossy()))
      .unwrap_or_default()
  };

  let content = match read_source(path, max_size) {
    Ok(content) => content,
    Err(e) => {
      debug!("Using file name as anchor for {}: {e}", path.display());
      return stem_slug();
    },
  };

  let body = strip_frontmatter(&content, delimiter).body;
  first_heading(&body)
    .map(|heading| slugify(&heading))
    .filter(|slug| !slug.is_empty())
    .unwrap_or_else(stem_slug)
}

fn display_candidates(candidates: &[PathBuf]) -> String {
  candidates
    .iter()
    .map(|p| p.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_strip_frontmatter_round_trip() {
    let result = strip_frontmatter("---\nkey: v\n---\nBODY", "---");
    assert_eq!(result.body, "BODY");
    assert_eq!(result.frontmatter.as_deref(), Some("key: v"));

    let plain = "# Title\n---\nnot frontmatter";
    let result = strip_frontmatter(plain, "---");
    assert_eq!(result.body, plain);
    assert_eq!(result.frontmatter, None);
  }

  #[test]
  fn test_strip_frontmatter_unterminated_and_empty() {
    let open = "---\ntitle: x\n# Body";
    let result = strip_frontmatter(open, "---");
    assert_eq!(result.body, open);
    assert_eq!(result.frontmatter, None);

    let empty = strip_frontmatter("---\n\n---\nbody", "---");
    assert_eq!(empty.body, "body");
    assert_eq!(empty.frontmatter, None);
  }

  #[test]
  fn test_classify_link() {
    assert_eq!(classify_link("https://x.org"), LinkKind::External);
    assert_eq!(classify_link("http://x.org"), LinkKind::External);
    assert_eq!(classify_link("mailto:a@b.c"), LinkKind::External);
    assert_eq!(classify_link("#section"), LinkKind::Anchor);
    assert_eq!(classify_link("guide.md"), LinkKind::Relative);
  }

  #[test]
  fn test_link_candidates() {
    let base = Path::new("/docs/3.0");
    assert_eq!(link_candidates("guide.html", base, None), vec![
      PathBuf::from("/docs/3.0/guide.md")
    ]);
    assert_eq!(link_candidates("../2.0/x.md#frag", base, None), vec![
      PathBuf::from("/docs/2.0/x.md")
    ]);
    assert_eq!(link_candidates("fields/", base, None), vec![
      PathBuf::from("/docs/3.0/fields/index.md")
    ]);
    assert_eq!(
      link_candidates("/3.0/fields", base, Some(Path::new("/docs"))),
      vec![
        PathBuf::from("/docs/3.0/fields"),
        PathBuf::from("/docs/3.0/fields.md"),
        PathBuf::from("/docs/3.0/fields/index.md"),
      ]
    );
  }

  #[test]
  fn test_anchor_for_file_falls_back_to_stem() {
    let dir = tempdir().expect("tempdir");
    let titled = dir.path().join("guide.md");
    fs::write(&titled, "---\ntitle: ignored\n---\n# The Guide\n").expect("write");
    assert_eq!(anchor_for_file(&titled, "---", 1024), "the-guide");

    let untitled = dir.path().join("Field_Types.md");
    fs::write(&untitled, "no heading\n").expect("write");
    assert_eq!(anchor_for_file(&untitled, "---", 1024), "field-types");
  }

  #[test]
  fn test_anchor_for_file_honours_delimiter_and_size_limit() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("setup.md");
    fs::write(&path, "+++\n# Not A Heading\n+++\n# Install\n").expect("write");

    assert_eq!(anchor_for_file(&path, "+++", 1024), "install");
    assert_eq!(anchor_for_file(&path, "---", 1024), "not-a-heading");
    assert_eq!(anchor_for_file(&path, "+++", 8), "setup");
  }

  #[test]
  fn test_linked_images_keep_the_image() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("guide.md"), "# Guide\n").expect("write");
    let input = "[![alt](shot.png)](missing.md) [![logo](logo.svg)](guide.md)";

    let strip = ProcessorOptions {
      link_policy: LinkPolicy::Strip,
      ..ProcessorOptions::default()
    };
    let (stripped, links) = transform_links(input, dir.path(), &strip);
    assert_eq!(stripped, "![alt](shot.png) ![logo](logo.svg)");
    assert_eq!(links[0].target, "missing.md");
    assert_eq!(transform_links(&stripped, dir.path(), &strip).0, stripped);

    let anchor = ProcessorOptions::default();
    let (anchored, _) = transform_links(input, dir.path(), &anchor);
    assert_eq!(
      anchored,
      "[![alt](shot.png)](missing.md) [![logo](logo.svg)](#guide)"
    );
    assert_eq!(transform_links(&anchored, dir.path(), &anchor).0, anchored);
  }

  #[test]
  fn test_transform_links_skips_images_and_externals() {
    let dir = tempdir().expect("tempdir");
    let content = "![logo](logo.png) [site](https://x.org) [top](#top)";
    let (out, links) =
      transform_links(content, dir.path(), &ProcessorOptions::default());
    assert_eq!(out, content);
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|l| l.rewritten.is_none()));
  }
}
