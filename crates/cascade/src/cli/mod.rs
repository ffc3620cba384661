//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the cascade binary.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{ChatOptions, load_config, run_chat, run_interactive, run_probe, show_providers, show_stats};
