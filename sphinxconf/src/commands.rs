//! Implementations of the CLI subcommands.
use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use sphinxconf_config::Config;
use sphinxconf_settings::{
  MappingOutcome,
  read_settings,
  render_file,
  upsert_intersphinx_mapping_with,
  write_settings,
};

use crate::cli::{Commands, ConfigCommands};

/// Run a subcommand against the loaded configuration.
///
/// # Errors
///
/// Returns an error if the subcommand fails.
pub fn run(command: &Commands, config: &Config) -> Result<()> {
  match command {
    Commands::Render {
      settings,
      output,
      strict,
    } => {
      let settings = settings.as_deref().unwrap_or(&config.settings_file);
      let output = output.as_deref().or(config.output.as_deref());
      render(config, settings, output, *strict)
    },
    Commands::AddMapping { key, url, settings } => {
      let settings = settings.as_deref().unwrap_or(&config.settings_file);
      add_mapping(config, settings, key, url).map(|_| ())
    },
    Commands::Mappings { settings } => {
      let settings = settings.as_deref().unwrap_or(&config.settings_file);
      for line in list_mappings(settings)? {
        println!("{line}");
      }
      Ok(())
    },
    Commands::Init { settings, force } => {
      let settings = settings.as_deref().unwrap_or(&config.settings_file);
      init_settings(config, settings, *force)
    },
    Commands::Config {
      command:
        ConfigCommands::Init {
          output,
          format,
          force,
        },
    } => init_config(output, format, *force),
  }
}

/// Render `settings` to newline-joined Python statements.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if strict
/// rendering meets an unsupported setting.
pub fn render_to_string(
  config: &Config,
  settings: &Path,
  strict: bool,
) -> Result<String> {
  let renderer = config.renderer()?.strict(config.strict || strict);
  let statements = render_file(settings, &renderer)
    .wrap_err_with(|| format!("Failed to render {}", settings.display()))?;
  Ok(statements.join("\n"))
}

/// Render `settings` to `output`, or to standard output.
///
/// # Errors
///
/// Returns an error if rendering fails or the output cannot be written.
pub fn render(
  config: &Config,
  settings: &Path,
  output: Option<&Path>,
  strict: bool,
) -> Result<()> {
  let rendered = render_to_string(config, settings, strict)?;

  match output {
    Some(path) => {
      fs::write(path, format!("{rendered}\n")).wrap_err_with(|| {
        format!("Failed to write rendered settings to {}", path.display())
      })?;
      info!(
        "Rendered {} to {}",
        settings.display(),
        path.display()
      );
    },
    None => println!("{rendered}"),
  }
  Ok(())
}

/// Register `key` → `url` in `settings`.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read, parsed or written.
pub fn add_mapping(
  config: &Config,
  settings: &Path,
  key: &str,
  url: &str,
) -> Result<MappingOutcome> {
  let outcome =
    upsert_intersphinx_mapping_with(settings, key, url, &config.skeleton())
      .wrap_err_with(|| {
        format!(
          "Failed to register intersphinx mapping `{key}` in {}",
          settings.display()
        )
      })?;

  if !outcome.is_changed() {
    info!(
      "Intersphinx mapping `{key}` is already registered in {}",
      settings.display()
    );
  }
  Ok(outcome)
}

/// One line per intersphinx mapping: `key: url`, followed by the alias in
/// parentheses when there is one.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or parsed.
pub fn list_mappings(settings: &Path) -> Result<Vec<String>> {
  let doc = read_settings(settings)
    .wrap_err_with(|| format!("Failed to read {}", settings.display()))?;

  Ok(
    doc
      .intersphinx_entries()
      .map(|(key, url, alias)| {
        match alias {
          Some(alias) => format!("{key}: {url} ({alias})"),
          None => format!("{key}: {url}"),
        }
      })
      .collect(),
  )
}

/// Write the default skeleton to `settings`.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if it
/// cannot be written.
pub fn init_settings(config: &Config, settings: &Path, force: bool) -> Result<()> {
  if settings.exists() && !force {
    bail!(
      "Settings file already exists: {}. Use --force to overwrite.",
      settings.display()
    );
  }
  create_parent_dir(settings)?;

  write_settings(settings, &config.skeleton().to_document()).wrap_err_with(
    || format!("Failed to create settings file: {}", settings.display()),
  )?;
  info!("Created settings file: {}", settings.display());
  Ok(())
}

/// Write a commented default configuration file.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if it
/// cannot be written.
pub fn init_config(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }
  create_parent_dir(output)?;

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!(
      "Failed to generate configuration file: {}",
      output.display()
    )
  })?;

  info!(
    "Configuration file created successfully. Edit it to customize how \
     settings are rendered."
  );
  Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }
  Ok(())
}
