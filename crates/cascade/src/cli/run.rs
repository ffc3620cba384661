//! Command handlers.

use cascade::{
    BuilderError, CascadeClient, CascadeConfig, CascadeResult, ChatRequest, ChatResponse, Message,
    ProviderRegistry,
};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// Prompt sent by `probe`.
const PROBE_PROMPT: &str = "Say 'Hello from' followed by your model name";

/// Characters of each probe response shown in the summary.
const PROBE_PREVIEW_CHARS: usize = 80;

/// Load configuration from `path` if given, else from the usual layers.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> CascadeResult<CascadeConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            CascadeConfig::from_file_with_env(path, |key| std::env::var(key).ok())
        }
        None => CascadeConfig::load(),
    }
}

async fn build_client(config: CascadeConfig, providers: &[String]) -> CascadeResult<CascadeClient> {
    let builder = CascadeClient::builder().with_config(config);
    let builder = if providers.is_empty() {
        builder
    } else {
        let selected = ProviderRegistry::from_env()
            .select(providers)
            .into_iter()
            .filter(|p| p.is_available())
            .collect();
        builder.with_providers(selected)
    };
    builder.build().await
}

/// Options of the `chat` command.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// System message
    pub system: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Retries per provider
    pub max_retries: Option<u32>,
    /// Request a streamed response
    pub stream: bool,
    /// Provider subset
    pub providers: Vec<String>,
}

impl ChatOptions {
    fn request(&self, prompt: &str) -> CascadeResult<ChatRequest> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.as_str()));
        }
        messages.push(Message::user(prompt));

        let mut builder = ChatRequest::builder();
        builder.messages(messages).stream(self.stream);
        if let Some(max_tokens) = self.max_tokens {
            builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_retries) = self.max_retries {
            builder.max_retries(max_retries);
        }

        Ok(builder.build().map_err(BuilderError::from)?)
    }
}

/// Send one prompt and print the answer followed by the usage report.
///
/// # Errors
///
/// Returns an error if no provider is available or every provider fails.
pub async fn run_chat(config: CascadeConfig, prompt: &str, options: ChatOptions) -> CascadeResult<()> {
    let client = build_client(config, &options.providers).await?;
    let request = options.request(prompt)?;

    let response = client.complete(&request).await?;
    print_response(&response);
    println!("\n{}", client.usage_stats().await);
    Ok(())
}

fn print_response(response: &ChatResponse) {
    println!("{}", response.content());
    println!(
        "\n[{} / {} - {} tokens]",
        response.provider(),
        response.model(),
        response.tokens_used()
    );
}

/// Line-oriented chat that keeps the conversation history.
///
/// `quit`, `exit` or `q` ends the session, as does end of input.
///
/// # Errors
///
/// Returns the first cascade error; it ends the session.
pub async fn run_interactive(config: CascadeConfig, system: Option<String>) -> CascadeResult<()> {
    let client = build_client(config, &[]).await?;
    println!(
        "Cascading across: {}",
        client.available_provider_names().join(", ")
    );
    println!("Type 'quit', 'exit' or 'q' to leave.\n");

    let mut history = Vec::new();
    if let Some(system) = system {
        history.push(Message::system(system));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        // Prompt display is best effort
        let _ = stdout.write_all(b"You: ").await;
        let _ = stdout.flush().await;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                info!(error = %e, "Stopped reading input");
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        history.push(Message::user(input));
        let response = client.complete(&ChatRequest::new(history.clone())).await?;
        println!("AI ({}): {}\n", response.provider(), response.content());
        history.push(Message::assistant(response.content().as_str()));
    }

    println!("\n{}", client.usage_stats().await);
    Ok(())
}

/// Print today's usage for the available providers.
///
/// # Errors
///
/// Returns an error if no provider is available.
pub async fn show_stats(config: CascadeConfig) -> CascadeResult<()> {
    let client = build_client(config, &[]).await?;
    println!("{}", client.usage_stats().await);
    Ok(())
}

/// Print every built-in provider with its availability.
pub fn show_providers() {
    let registry = ProviderRegistry::from_env();
    println!("Providers (priority order):");
    for provider in registry.list_all() {
        let status = if provider.is_available() {
            "available".to_string()
        } else {
            format!(
                "missing {}",
                ProviderRegistry::credential_var(provider.name()).unwrap_or("credential")
            )
        };
        println!(
            "  {:<12} {:<50} {:>5} req/day  {}",
            provider.name(),
            provider.model(),
            provider.daily_request_limit(),
            status
        );
    }
}

/// Probe each available provider on its own and summarize which ones work.
///
/// # Errors
///
/// Returns an error if no provider is available.
pub async fn run_probe(config: CascadeConfig) -> CascadeResult<ExitCode> {
    let client = build_client(config, &[]).await?;
    let request = ChatRequest::builder()
        .messages(vec![Message::user(PROBE_PROMPT)])
        .max_tokens(50)
        .build()
        .map_err(BuilderError::from)?;

    let results = client.probe(&request).await?;
    let mut working = 0usize;

    for result in &results {
        match &result.outcome {
            Ok(response) => {
                working += 1;
                let preview: String = response.content().chars().take(PROBE_PREVIEW_CHARS).collect();
                println!("[OK]   {}: {}", result.provider, preview.trim());
            }
            Err(reason) => println!("[FAIL] {}: {}", result.provider, reason),
        }
    }

    println!(
        "\nWorking: {}/{} providers",
        working,
        results.len()
    );
    println!("{}", client.usage_stats().await);

    Ok(if working > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
