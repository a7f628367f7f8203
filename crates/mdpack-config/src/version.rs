//! Version selector parsing and resolution.
use std::{cmp::Ordering, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::ConfigError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap_or_else(|e| {
    log::error!("Failed to compile VERSION_RE regex: {e}");
    mdpack_markdown::utils::never_matching_regex()
  })
});

/// Which versions a run should process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
  /// The highest `X.Y[.Z]` version known.
  Latest,
  /// Every known version, each processed on its own.
  All,
  /// One explicit version.
  Exact(String),
}

/// Whether `s` has the form `X.Y` or `X.Y.Z`.
#[must_use]
pub fn is_version(s: &str) -> bool {
  VERSION_RE.is_match(s)
}

fn numeric_parts(version: &str) -> Vec<u64> {
  version
    .split('.')
    .map(|part| part.parse().unwrap_or(0))
    .collect()
}

/// Compare two versions by their numeric components.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
  numeric_parts(a).cmp(&numeric_parts(b))
}

/// Highest version among `available`, ignoring keys that are not `X.Y[.Z]`.
#[must_use]
pub fn latest_version<S: AsRef<str>>(available: &[S]) -> Option<String> {
  available
    .iter()
    .map(AsRef::as_ref)
    .filter(|v| is_version(v))
    .max_by(|a, b| compare_versions(a, b))
    .map(ToString::to_string)
}

impl FromStr for VersionSelector {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("latest") {
      Ok(Self::Latest)
    } else if trimmed.eq_ignore_ascii_case("all") {
      Ok(Self::All)
    } else if is_version(trimmed) {
      Ok(Self::Exact(trimmed.to_string()))
    } else {
      Err(ConfigError::InvalidVersion(s.to_string()))
    }
  }
}

impl fmt::Display for VersionSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Latest => f.write_str("latest"),
      Self::All => f.write_str("all"),
      Self::Exact(v) => f.write_str(v),
    }
  }
}

impl VersionSelector {
  #[must_use]
  pub const fn is_all(&self) -> bool {
    matches!(self, Self::All)
  }

  /// Resolve the selector against the versions that actually exist.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::VersionNotFound`] when an explicit version is
  /// absent, or when `latest` is requested and no `X.Y[.Z]` version exists.
  pub fn resolve<S: AsRef<str>>(
    &self,
    available: &[S],
  ) -> Result<Vec<String>, ConfigError> {
    let not_found = |version: &str| {
      ConfigError::VersionNotFound {
        version:   version.to_string(),
        available: available.iter().map(|v| v.as_ref().to_string()).collect(),
      }
    };

    match self {
      Self::Latest => {
        latest_version(available)
          .map(|v| vec![v])
          .ok_or_else(|| not_found("latest"))
      },
      Self::All => {
        Ok(available.iter().map(|v| v.as_ref().to_string()).collect())
      },
      Self::Exact(version) => {
        if available.iter().any(|v| v.as_ref() == version) {
          Ok(vec![version.clone()])
        } else {
          Err(not_found(version))
        }
      },
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_parse_selectors() {
    assert_eq!("LATEST".parse::<VersionSelector>().ok(), Some(VersionSelector::Latest));
    assert_eq!(" all ".parse::<VersionSelector>().ok(), Some(VersionSelector::All));
    assert_eq!(
      "4.0.1".parse::<VersionSelector>().ok(),
      Some(VersionSelector::Exact("4.0.1".to_string()))
    );
    assert!(matches!(
      "v4".parse::<VersionSelector>(),
      Err(ConfigError::InvalidVersion(_))
    ));
    assert!("".parse::<VersionSelector>().is_err());
    assert!("4".parse::<VersionSelector>().is_err());
  }

  #[test]
  fn test_latest_uses_numeric_order() {
    let available = ["2.0", "10.0", "9.1", "default", "9.10"];
    assert_eq!(latest_version(&available).as_deref(), Some("10.0"));
    assert_eq!(latest_version(&["9.2", "9.10"]).as_deref(), Some("9.10"));
    assert_eq!(latest_version::<&str>(&[]), None);
  }

  #[test]
  fn test_resolve() {
    let available = vec!["2.0".to_string(), "3.0".to_string()];

    assert_eq!(
      VersionSelector::Latest.resolve(&available).expect("latest"),
      vec!["3.0"]
    );
    assert_eq!(
      VersionSelector::All.resolve(&available).expect("all"),
      available
    );

    let err = VersionSelector::Exact("9.9".to_string())
      .resolve(&available)
      .expect_err("missing version");
    assert!(matches!(
      &err,
      ConfigError::VersionNotFound { version, available }
        if version == "9.9" && available == &["2.0", "3.0"]
    ));
    assert!(err.to_string().contains("available: 2.0, 3.0"));
  }
}
