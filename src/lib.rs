//! forge-ai: LLM provider dispatch for the Forge in-browser coding assistant.
//!
//! This crate is the server-side glue between the chat front-end and the
//! model providers: it selects a provider/model configuration, resolves API
//! keys from the process environment or runtime bindings, assembles the
//! static system prompt, and forwards chat messages to the provider's
//! streaming API.

pub mod error;
pub mod keys;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod stream;
pub mod stream_text;
pub mod types;

pub use error::{Error, Result};
pub use keys::RuntimeEnv;
pub use stream::{MessageEvent, MessageEventStream, StopReason, Usage};
pub use stream_text::{MAX_TOKENS, stream_text};
pub use types::*;
