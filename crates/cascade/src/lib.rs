//! Cascade - resilient chat completions across interchangeable providers
//!
//! Cascade sends a chat request to the first provider in priority order that is still
//! under its daily caps. Transient failures are retried on the same provider with
//! exponential backoff; persistent ones fall through to the next provider. Usage is
//! persisted so daily caps hold across runs.
//!
//! # Quick Start
//!
//! ```no_run
//! use cascade::{CascadeClient, ChatRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CascadeClient::builder().build().await?;
//!
//!     let request = ChatRequest::builder()
//!         .messages(vec![Message::user("Write a haiku about failover.")])
//!         .max_tokens(120)
//!         .temperature(0.8)
//!         .build()?;
//!
//!     let response = client.complete(&request).await?;
//!     println!("[{}] {}", response.provider(), response.content());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Cascade is organized as a workspace with focused crates:
//!
//! - `cascade_error` - Error types and failure classification
//! - `cascade_core` - Messages, requests and responses
//! - `cascade_rate_limit` - Configuration, provider registry, usage store, backoff, pacing
//! - `cascade_interface` - The `ChatDriver` trait
//! - `cascade_models` - OpenAI-compatible HTTP client and request adapter
//!
//! This crate adds the orchestrator and re-exports everything for convenience.

mod client;
mod observability;

pub use client::{CascadeClient, CascadeClientBuilder, ProbeResult};
pub use observability::{ObservabilityConfig, init_observability};

pub use cascade_core::*;
pub use cascade_error::*;
pub use cascade_interface::*;
pub use cascade_models::*;
pub use cascade_rate_limit::*;
