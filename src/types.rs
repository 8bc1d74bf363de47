//! Core types for chat dispatch

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Message roles accepted from the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A completed tool invocation replayed from an earlier turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Provider-assigned call id
    pub tool_call_id: String,
    /// Tool name as invoked
    pub tool_name: String,
    /// Arguments the tool was called with
    pub args: serde_json::Value,
    /// Result returned by the tool
    pub result: serde_json::Value,
}

/// A chat message as sent by the front-end.
///
/// Owned by the caller and passed by value into the dispatcher; nothing in
/// this layer mutates or retains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_invocations: Vec<ToolInvocation>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_invocations: vec![],
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_invocations: vec![],
        }
    }
}

/// Enumerated selector identifying which provider/model configuration to
/// use for a request. Exists only for the duration of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelType {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,
}

/// Model types selectable by the front-end
pub const AVAILABLE_MODELS: [ModelType; 3] =
    [ModelType::Gpt4o, ModelType::Gpt4oMini, ModelType::Gemini15Pro];

impl ModelType {
    /// The selector string as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Gpt4o => "gpt-4o",
            ModelType::Gpt4oMini => "gpt-4o-mini",
            ModelType::Gemini15Pro => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "gpt-4o" => Ok(ModelType::Gpt4o),
            "gpt-4o-mini" => Ok(ModelType::Gpt4oMini),
            "gemini-1.5-pro" => Ok(ModelType::Gemini15Pro),
            other => Err(Error::UnsupportedModel(other.to_string())),
        }
    }
}

/// Options merged into the outbound streaming request.
///
/// Recognized fields override the dispatcher defaults; everything is passed
/// through to the provider call verbatim, with no validation against
/// provider-specific limits.
#[derive(Debug, Clone, Default)]
pub struct StreamingOptions {
    /// Model-type selector (`gpt-4o` when unset)
    pub model_type: Option<String>,
    /// Token ceiling for the response
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Extra headers forwarded to the provider call
    pub headers: HashMap<String, String>,
}
