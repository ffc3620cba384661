//! Core data types for the Cascade provider-fallback library.
//!
//! This crate provides the records that flow through a cascade: the caller's
//! [`ChatRequest`], the generic [`ChatParams`] and the provider wire shape
//! [`ChatCompletionRequest`] it is adapted into, and the [`Completion`] /
//! [`ChatResponse`] returned on success.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod request;
mod response;
mod role;
mod wire;

pub use message::Message;
pub use request::{ChatParams, ChatRequest, ChatRequestBuilder, ChatRequestBuilderError};
pub use response::{ChatResponse, Completion};
pub use role::Role;
pub use wire::{ChatCompletionRequest, StreamOptions};
