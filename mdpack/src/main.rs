use color_eyre::eyre::{Context, Result, bail};
use log::{debug, info};
use mdpack::{
  cli::{Cli, Commands},
  logging,
  pipeline,
};
use mdpack_config::{Config, VersionSelector};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Logging first so subcommands can log
  logging::init(cli.log_filter(), cli.log_file.as_deref())?;

  if let Some(Commands::Init {
    output,
    format,
    force,
  }) = &cli.command
  {
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!("Failed to generate configuration file: {}", output.display())
    })?;

    info!(
      "Configuration file created successfully. Edit it to customize \
       artifact generation."
    );
    return Ok(());
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
  cli.apply_to(&mut config);
  debug!("Effective configuration: {config:?}");

  let selector: VersionSelector = cli.version.parse()?;
  if cli.dry_run {
    info!("Dry run: no files will be written");
  }

  let report = pipeline::run(&config, &selector, cli.dry_run)?;
  report.log_summary();

  let failed = report.failed_versions();
  if !failed.is_empty() {
    let names: Vec<&str> = failed.iter().map(|v| v.version.as_str()).collect();
    bail!("{} version(s) failed: {}", failed.len(), names.join(", "));
  }

  Ok(())
}
