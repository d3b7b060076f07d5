use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use sphinxconf::cli::Cli;

const BIN_NAME: &str = "sphinxconf";

const SHELLS: [Shell; 4] =
  [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell];

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the sphinxconf CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Only build the given artifact.
    #[arg(long, value_enum)]
    only: Option<Artifact>,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum Artifact {
  Completions,
  Manpage,
}

fn main() -> Result<()> {
  let Commands::Dist { output_dir, only } = Xtask::parse().command;

  let artifacts = only.map_or_else(
    || vec![Artifact::Completions, Artifact::Manpage],
    |artifact| vec![artifact],
  );
  for artifact in artifacts {
    match artifact {
      Artifact::Completions => write_completions(&output_dir)?,
      Artifact::Manpage => write_manpage(&output_dir)?,
    }
  }

  Ok(())
}

/// Shell completion scripts under `<output_dir>/completions`.
fn write_completions(output_dir: &Path) -> Result<()> {
  let dir = output_dir.join("completions");
  fs::create_dir_all(&dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;

  let mut cmd = Cli::command();
  for shell in SHELLS {
    let path = generate_to(shell, &mut cmd, BIN_NAME, &dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
    println!("Wrote {}", path.display());
  }
  Ok(())
}

/// `sphinxconf.1` under `<output_dir>/man`.
fn write_manpage(output_dir: &Path) -> Result<()> {
  let dir = output_dir.join("man");
  fs::create_dir_all(&dir)
    .with_context(|| format!("Failed to create {}", dir.display()))?;

  let path = dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&path)
    .with_context(|| format!("Failed to create {}", path.display()))?;
  Man::new(Cli::command())
    .render(&mut file)
    .context("Failed to render manpage")?;
  println!("Wrote {}", path.display());
  Ok(())
}
