//! Provider clients for Cascade.
//!
//! Every built-in provider exposes an OpenAI-compatible chat completions endpoint, so a
//! single HTTP client implements [`cascade_interface::ChatDriver`] for all of them.
//! [`adapt`] shapes the request body per provider and [`CascadeMetrics`] records what
//! each attempt cost.
//!
//! ```no_run
//! use cascade_core::{ChatParams, Message};
//! use cascade_interface::ChatDriver;
//! use cascade_models::{OpenAICompatibleClient, adapt};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAICompatibleClient::new(
//!     "Groq",
//!     "llama-3.3-70b-versatile",
//!     "https://api.groq.com/openai/v1/chat/completions",
//!     "gsk-...",
//!     Duration::from_secs(60),
//! )?;
//! let params = ChatParams {
//!     model: client.model_name().to_string(),
//!     messages: vec![Message::user("Hello")],
//!     max_tokens: 100,
//!     temperature: 0.7,
//!     stream: false,
//! };
//! let completion = client.chat(&adapt("Groq", params)).await?;
//! println!("{}", completion.content);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod metrics;
mod openai_compat;

pub use adapter::adapt;
pub use metrics::CascadeMetrics;
pub use openai_compat::{
    ChatCompletionChunk, ChatCompletionResponse, Choice, ChoiceMessage, ChunkChoice, Delta,
    OpenAICompatibleClient, OpenAICompatibleFactory, SseAccumulator, Usage,
};
