use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use mdpack_config::templates::{DEFAULT_JSON_TEMPLATE, DEFAULT_TOML_TEMPLATE};

const BIN_NAME: &str = "mdpack";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

/// Pieces of the distribution that can be built on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Artifact {
  Completions,
  Manpage,
  Config,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the mdpack CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Only build these artifacts (default: all of them).
    #[arg(long, value_enum, num_args = 1..)]
    only: Vec<Artifact>,
  },
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  match xtask.command {
    Commands::Dist { output_dir, only } => {
      let wanted = |artifact| only.is_empty() || only.contains(&artifact);

      if wanted(Artifact::Completions) {
        generate_completions(&output_dir)?;
      }
      if wanted(Artifact::Manpage) {
        generate_manpage(&output_dir)?;
      }
      if wanted(Artifact::Config) {
        write_sample_configs(&output_dir)?;
      }
    },
  }

  Ok(())
}

/// Shell completions for every shell clap_complete knows.
fn generate_completions(output_dir: &Path) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir)?;

  let mut cmd = mdpack::cli::Cli::command();
  for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
    generate_to(shell, &mut cmd, BIN_NAME, &completions_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
  }

  println!(
    "Shell completions generated in {}",
    completions_dir.display()
  );
  Ok(())
}

/// Generate the `mdpack(1)` manpage.
fn generate_manpage(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)?;

  let man = Man::new(mdpack::cli::Cli::command());
  let file_path = man_dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  man
    .render(&mut file)
    .with_context(|| "Failed to render manpage")?;

  println!("Manpage generated in {}", man_dir.display());
  Ok(())
}

/// Ship the documented default configs alongside the binary.
fn write_sample_configs(output_dir: &Path) -> Result<()> {
  let config_dir = output_dir.join("config");
  fs::create_dir_all(&config_dir)?;

  for (name, content) in [
    ("mdpack.toml", DEFAULT_TOML_TEMPLATE),
    ("mdpack.json", DEFAULT_JSON_TEMPLATE),
  ] {
    let path = config_dir.join(name);
    fs::write(&path, content)
      .with_context(|| format!("Failed to write {}", path.display()))?;
  }

  println!("Sample configs written to {}", config_dir.display());
  Ok(())
}
