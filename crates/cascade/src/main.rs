//! Cascade CLI binary.
//!
//! This binary provides command-line access to the cascade:
//! - Send a prompt through the provider cascade
//! - Chat interactively with conversation history
//! - Inspect usage and provider availability
//! - Probe each provider on its own

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    use cascade::{ObservabilityConfig, init_observability};
    use cli::{
        ChatOptions, Cli, Commands, load_config, run_chat, run_interactive, run_probe,
        show_providers, show_stats,
    };

    // Credentials and overrides may live in a .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let mut observability = ObservabilityConfig::from_config(&config);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability(&observability)?;

    match cli.command {
        Commands::Chat {
            prompt,
            system,
            max_tokens,
            temperature,
            max_retries,
            stream,
            providers,
            timeout,
        } => {
            let config = match timeout {
                Some(secs) => config.with_request_timeout(secs),
                None => config,
            };
            let options = ChatOptions {
                system,
                max_tokens,
                temperature,
                max_retries,
                stream,
                providers,
            };
            run_chat(config, &prompt, options).await?;
        }

        Commands::Interactive { system } => {
            run_interactive(config, system).await?;
        }

        Commands::Stats => {
            show_stats(config).await?;
        }

        Commands::Providers => {
            show_providers();
        }

        Commands::Probe => {
            return Ok(run_probe(config).await?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
