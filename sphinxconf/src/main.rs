use color_eyre::eyre::{Context, Result};
use log::LevelFilter;
use sphinxconf::{
  cli::{Cli, Commands, ConfigCommands},
  commands,
};
use sphinxconf_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  // Writing a config file must not depend on loading one
  if let Commands::Config {
    command:
      ConfigCommands::Init {
        output,
        format,
        force,
      },
  } = &cli.command
  {
    return commands::init_config(output, format, *force);
  }

  let config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  commands::run(&cli.command, &config)
}
