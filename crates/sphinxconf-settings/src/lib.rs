//! `sphinxconf-settings`.
//!
//! This crate reads the `Settings.yml` files that hold the Sphinx build
//! settings of a documentation project, renders their `conf.py:` block as
//! Python statements for Sphinx's `conf.py`, and registers
//! `intersphinx_mapping` entries in place.
//!
//! Settings files are a small YAML subset. They are parsed into a
//! [`SettingsDocument`] that keeps comments, blank lines and the `---`/`...`
//! markers, so rewriting a file only changes the setting that was edited.
//!
//! # Example
//!
//! ```no_run
//! use sphinxconf_settings::{Renderer, read_settings, upsert_intersphinx_mapping};
//!
//! upsert_intersphinx_mapping(
//!   "Documentation/Settings.yml",
//!   "t3cmsapi",
//!   "https://typo3.org/api/typo3cms",
//! )
//! .unwrap();
//!
//! let doc = read_settings("Documentation/Settings.yml").unwrap();
//! for statement in Renderer::default().render(&doc).unwrap() {
//!   println!("{statement}");
//! }
//! ```

pub mod document;
pub mod editor;
pub mod error;
pub mod extensions;
pub mod parser;
pub mod python;
pub mod render;
pub mod skeleton;
pub mod value;

use std::path::Path;

pub use document::{ConfPy, LineEnding, Setting, SettingsDocument};
pub use editor::{
  MappingOutcome,
  read_settings,
  upsert_intersphinx_mapping,
  upsert_intersphinx_mapping_with,
  write_settings,
};
pub use error::{ParseError, SettingsError};
pub use extensions::ExtensionFilter;
pub use parser::parse;
pub use render::Renderer;
pub use skeleton::DefaultSkeleton;
pub use value::{Scalar, ScalarStyle, Value};

/// Read the settings file at `path` and render its `conf.py:` block.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a strict
/// `renderer` meets a setting it cannot render.
pub fn render_file(
  path: impl AsRef<Path>,
  renderer: &Renderer,
) -> Result<Vec<String>, SettingsError> {
  let doc = read_settings(path)?;
  renderer.render(&doc)
}
