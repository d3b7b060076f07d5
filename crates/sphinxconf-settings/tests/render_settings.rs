#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::PathBuf};

use sphinxconf_settings::{ExtensionFilter, Renderer, render_file};
use tempfile::TempDir;

fn write_fixture(yaml: &str) -> (TempDir, PathBuf) {
  let dir = tempfile::tempdir().expect("Failed to create temp dir");
  let path = dir.path().join("Settings.yml");
  fs::write(&path, yaml).expect("Failed to write settings fixture");
  (dir, path)
}

fn render(yaml: &str) -> Vec<String> {
  let (_dir, path) = write_fixture(yaml);
  render_file(&path, &Renderer::default()).expect("Failed to render settings")
}

#[test]
fn test_basic_settings() {
  let output = render(
    "# This is the project specific Settings.yml file.
# Place Sphinx specific build information here.
# Settings given here will replace the settings of 'conf.py'.

conf.py:
  copyright: 2014
  project: Sphinx Python Documentation Generator and Viewer
  version: 1.2
  release: 1.2.0-dev",
  );

  assert_eq!(output, vec![
    "copyright = u'2014'",
    "project = u'Sphinx Python Documentation Generator and Viewer'",
    "version = u'1.2'",
    "release = u'1.2.0-dev'",
  ]);
}

#[test]
fn test_version_release_and_copyright_are_strings() {
  let output = render(
    "conf.py:
  version: 7
  release: 7
  copyright: 2015",
  );

  assert_eq!(output, vec![
    "version = u'7'",
    "release = u'7'",
    "copyright = u'2015'",
  ]);
}

#[test]
fn test_latex_settings() {
  let output = render(
    r"conf.py:
  latex_documents:
  - - Index
    - sphinx.tex
    - Sphinx Python Documentation Generator and Viewer
    - Xavier Perseguers
    - manual
  latex_elements:
    papersize: a4paper
    pointsize: 10pt
    preamble: \usepackage{typo3}",
  );

  assert_eq!(output, vec![
    "latex_documents = [(
u'Index',
u'sphinx.tex',
u'Sphinx Python Documentation Generator and Viewer',
u'Xavier Perseguers',
u'manual'
)]",
    r"latex_elements = {
'papersize': 'a4paper',
'pointsize': '10pt',
'preamble': '\\usepackage{typo3}'
}",
  ]);
}

#[test]
fn test_intersphinx_mapping() {
  let output = render(
    "conf.py:
  intersphinx_mapping:
    t3tsref:
    - https://docs.typo3.org/typo3cms/TyposcriptReference/
    - null
    restdoc:
    - https://docs.typo3.org/typo3cms/extensions/restdoc/
    - null",
  );

  assert_eq!(output, vec![
    "intersphinx_mapping = {
't3tsref': ('https://docs.typo3.org/typo3cms/TyposcriptReference/', None),
'restdoc': ('https://docs.typo3.org/typo3cms/extensions/restdoc/', None)
}",
  ]);
}

#[test]
fn test_single_extlink_with_padded_alias() {
  let output = render(
    "conf.py:
  extlinks:
    issue:
    - https://github.com/sphinx-doc/sphinx/issues/%s
    -     'issue '",
  );

  assert_eq!(output, vec![
    "extlinks = {
'issue': ('https://github.com/sphinx-doc/sphinx/issues/%s', 'issue ')
}",
  ]);
}

#[test]
fn test_two_extlinks() {
  let output = render(
    "conf.py:
  extlinks:
    forge:
    - https://forge.typo3.org/issues/%s
    - 'forge: '
    ter:
    - https://typo3.org/extensions/repository/view/%s
    - null",
  );

  assert_eq!(output, vec![
    "extlinks = {
'forge': ('https://forge.typo3.org/issues/%s', 'forge: '),
'ter': ('https://typo3.org/extensions/repository/view/%s', None)
}",
  ]);
}

#[test]
fn test_single_theme_option() {
  let output = render(
    "conf.py:
  html_theme_options:
    sidebarwidth: 300",
  );

  assert_eq!(output, vec!["html_theme_options = {\n'sidebarwidth': 300\n}"]);
}

#[test]
fn test_two_theme_options() {
  let output = render(
    "conf.py:
  html_theme_options:
    nosidebar: true
    sidebarwidth: 300",
  );

  assert_eq!(output, vec![
    "html_theme_options = {\n'nosidebar': True,\n'sidebarwidth': 300\n}"
  ]);
}

#[test]
fn test_managed_extensions_are_dropped() {
  let output = render(
    "conf.py:
  extensions:
  - sphinx.ext.intersphinx
  - t3sphinx.ext.t3extras
  - sphinxcontrib.youtube",
  );

  assert_eq!(output, vec![
    "extensions = ['sphinx.ext.intersphinx', 'sphinxcontrib.youtube']"
  ]);
}

#[test]
fn test_custom_extension_denylist() {
  let (_dir, path) = write_fixture(
    "conf.py:
  extensions:
  - sphinx.ext.intersphinx
  - sphinx.ext.todo
  - t3sphinx.ext.t3extras",
  );
  let filter =
    ExtensionFilter::new([r"^sphinx\.ext\.todo$"]).expect("Failed to compile");

  let output =
    render_file(&path, &Renderer::new(filter)).expect("Failed to render");
  assert_eq!(output, vec![
    "extensions = ['sphinx.ext.intersphinx', 't3sphinx.ext.t3extras']"
  ]);
}

#[test]
fn test_booleans_are_kept() {
  let output = render(
    "conf.py:
  latex_use_parts: False
  latex_show_pagerefs: True",
  );

  assert_eq!(output, vec![
    "latex_use_parts = False",
    "latex_show_pagerefs = True",
  ]);
}

#[test]
fn test_rendering_keeps_document_order_across_shapes() {
  let output = render(
    "---
conf.py:
  # Project
  project: Demo
  extensions:
  - sphinx.ext.todo
  html_theme_options:
    github_sphinx_locale: 'fr_FR'
  version: 2.0
...
",
  );

  assert_eq!(output, vec![
    "project = u'Demo'",
    "extensions = ['sphinx.ext.todo']",
    "html_theme_options = {\n'github_sphinx_locale': 'fr_FR'\n}",
    "version = u'2.0'",
  ]);
}

#[test]
fn test_missing_file_is_a_read_error() {
  let dir = tempfile::tempdir().expect("Failed to create temp dir");
  let err = render_file(dir.path().join("missing.yml"), &Renderer::default())
    .expect_err("Rendering a missing file must fail");
  assert!(err.to_string().contains("failed to read settings file"));
}

#[test]
fn test_file_without_conf_py_is_a_parse_error() {
  let (_dir, path) = write_fixture("html_theme: t3sphinx\n");
  let err = render_file(&path, &Renderer::default())
    .expect_err("A file without conf.py must fail");
  assert!(err.to_string().contains("no top-level `conf.py:` block"));
}
