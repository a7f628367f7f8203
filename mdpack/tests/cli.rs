#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::Path, process::Command};

use assert_cmd::prelude::*;
use clap::Parser;
use mdpack::{cli::Cli, error::MdpackError, pipeline, report::RunReport};
use mdpack_config::{Config, ConfigError, VersionSelector};
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn write(path: &Path, content: &str) {
  fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
  fs::write(path, content).expect("write");
}

/// Docs for 2.0 with a sidebar, laid out the way a VitePress site is.
fn site() -> TempDir {
  let dir = tempdir().expect("tempdir");
  let root = dir.path();

  write(&root.join("docs/2.0/index.md"), "# Intro\n\nHello.\n");
  write(&root.join("docs/2.0/guide.md"), "# Guide\n\nGuide body.\n");
  write(
    &root.join("sidebar.json"),
    r#"{ "/2.0/": [
  { "text": "Intro", "link": "/2.0/" },
  { "text": "Guide", "link": "/2.0/guide" }
] }"#,
  );
  dir
}

fn mdpack(root: &Path) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_mdpack"));
  cmd.current_dir(root).args([
    "--docs-dir",
    "docs",
    "--config",
    "sidebar.json",
    "--output",
    "out/llms.txt",
    "--log-level",
    "warn",
  ]);
  cmd
}

/// Parse argv, layer it over the defaults and run, as `main` does.
fn run_argv(args: &[&str]) -> Result<RunReport, MdpackError> {
  let cli = Cli::try_parse_from(args).expect("valid arguments");
  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
  cli.apply_to(&mut config);
  let selector: VersionSelector = cli.version.parse()?;
  pipeline::run(&config, &selector, cli.dry_run)
}

#[test]
fn test_argv_drives_a_full_run() {
  let dir = site();
  let root = dir.path();
  let docs = root.join("docs");
  let sidebar = root.join("sidebar.json");
  let output = root.join("out/llms.txt");

  let report = run_argv(&[
    "mdpack",
    "2.0",
    "--docs-dir",
    docs.to_str().expect("utf-8 path"),
    "--config",
    sidebar.to_str().expect("utf-8 path"),
    "--output",
    output.to_str().expect("utf-8 path"),
  ])
  .expect("run");

  assert_eq!(report.total_sections(), 2);
  assert!(report.failed_versions().is_empty());
  assert!(fs::read_to_string(&output).expect("read").contains("Guide body."));
}

#[test]
fn test_argv_rejects_unknown_and_malformed_versions() {
  let dir = site();
  let root = dir.path();
  let docs = root.join("docs");
  let sidebar = root.join("sidebar.json");
  let base = |version: &'static str| {
    vec![
      "mdpack".to_string(),
      version.to_string(),
      "--docs-dir".to_string(),
      docs.display().to_string(),
      "--config".to_string(),
      sidebar.display().to_string(),
    ]
  };

  let args = base("9.9");
  let args: Vec<&str> = args.iter().map(String::as_str).collect();
  assert!(matches!(
    run_argv(&args),
    Err(MdpackError::Config(ConfigError::VersionNotFound { ref version, .. }))
      if version == "9.9"
  ));

  let args = base("v4");
  let args: Vec<&str> = args.iter().map(String::as_str).collect();
  assert!(matches!(
    run_argv(&args),
    Err(MdpackError::Config(ConfigError::InvalidVersion(ref v))) if v == "v4"
  ));

  assert!(!docs.join("public").exists());
  assert!(!docs.join("2.0/everything.md").exists());
}

#[test]
fn test_missing_config_file_is_an_error() {
  let dir = tempdir().expect("tempdir");
  let missing = dir.path().join("nope.toml");

  assert!(matches!(
    Config::load(&[missing], &[]),
    Err(ConfigError::Config(ref msg)) if msg.contains("nope.toml")
  ));
}

#[test]
fn test_binary_exit_status() {
  let dir = site();
  let root = dir.path();

  mdpack(root).arg("2.0").assert().success();
  assert!(root.join("out/llms.txt").is_file());

  mdpack(root)
    .arg("9.9")
    .assert()
    .failure()
    .stderr(predicate::str::contains("9.9"));

  mdpack(root)
    .arg("v4")
    .assert()
    .failure()
    .stderr(predicate::str::contains("v4"));

  mdpack(root)
    .args(["2.0", "--config-file", "missing.toml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing.toml"));

  Command::new(env!("CARGO_BIN_EXE_mdpack"))
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("mdpack"));
}
