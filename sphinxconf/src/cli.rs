use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for sphinxconf
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Render Sphinx Settings.yml files and manage intersphinx mappings"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the sphinxconf CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render the `conf.py` block of a settings file as Python statements.
  Render {
    /// Settings file to read. Defaults to the configured `settings_file`.
    settings: Option<PathBuf>,

    /// File to write the statements to instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail on settings that have no Python form instead of skipping them.
    #[arg(long)]
    strict: bool,
  },

  /// Register an intersphinx mapping, creating the settings file if needed.
  AddMapping {
    /// Short project identifier used in cross references.
    key: String,

    /// Base URL of the project's documentation.
    url: String,

    /// Settings file to edit. Defaults to the configured `settings_file`.
    #[arg(short, long)]
    settings: Option<PathBuf>,
  },

  /// List the intersphinx mappings of a settings file.
  Mappings {
    /// Settings file to read. Defaults to the configured `settings_file`.
    #[arg(short, long)]
    settings: Option<PathBuf>,
  },

  /// Create a settings file from the default skeleton.
  Init {
    /// Settings file to create. Defaults to the configured `settings_file`.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Manage the sphinxconf configuration file.
  Config {
    #[command(subcommand)]
    command: ConfigCommands,
  },
}

/// Subcommands of `sphinxconf config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
  /// Initialize a new sphinxconf configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "sphinxconf.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
