//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cascade - chat completions that fall over between providers
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(about = "Chat completions that fall over between rate-limited providers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one prompt through the cascade
    Chat {
        /// The user message
        prompt: String,

        /// System message sent before the prompt
        #[arg(long)]
        system: Option<String>,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Retries per provider
        #[arg(long)]
        max_retries: Option<u32>,

        /// Request a streamed response
        #[arg(long)]
        stream: bool,

        /// Only use these providers (repeatable), still in priority order
        #[arg(long = "provider", value_name = "NAME")]
        providers: Vec<String>,

        /// Per-request HTTP timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Chat line by line, keeping the conversation
    Interactive {
        /// System message for the whole session
        #[arg(long)]
        system: Option<String>,
    },

    /// Show today's usage for the available providers
    Stats,

    /// List every built-in provider and whether it has a credential
    Providers,

    /// Send a short prompt to each available provider on its own
    Probe,
}
