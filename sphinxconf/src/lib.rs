//! Expose sphinxconf's command implementations for use in integration tests.
//! The settings and config crates are the supported library API.
pub mod cli;
pub mod commands;
