//! LLM provider clients

pub mod google;
pub mod openai;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{ModelConfig, Provider};
use crate::stream::MessageEventStream;
use crate::types::Message;

/// A fully assembled streaming request, ready for a provider call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System prompt; empty when the model's table row does not support one
    pub system: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Token ceiling for the response
    pub max_tokens: u32,
    /// Sampling temperature, forwarded verbatim when set
    pub temperature: Option<f32>,
    /// Extra headers applied to the provider call
    pub headers: HashMap<String, String>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream a response from the provider
    async fn stream(
        &self,
        config: &ModelConfig,
        request: &ChatRequest,
    ) -> Result<MessageEventStream>;
}

/// Apply caller-supplied headers to an outbound request. A name or value
/// that is not valid HTTP cannot be sent; it is dropped with a debug log
/// instead of failing the dispatch.
pub(crate) fn apply_custom_headers(headers: &mut HeaderMap, custom: &HashMap<String, String>) {
    for (key, value) in custom {
        match (key.parse::<HeaderName>(), value.parse::<HeaderValue>()) {
            (Ok(name), Ok(val)) => {
                headers.insert(name, val);
            }
            _ => {
                tracing::debug!("dropping invalid caller header: {}", key);
            }
        }
    }
}

/// An invocable model handle: a provider client paired with its
/// configuration table row. Constructed per dispatch, never cached.
pub struct ModelHandle {
    config: &'static ModelConfig,
    client: Box<dyn LlmProvider>,
}

impl ModelHandle {
    /// Construct the client for the config's provider with the given key.
    /// The key is not validated here; an empty or bad credential surfaces
    /// as the provider's authentication error on the first call.
    pub fn new(config: &'static ModelConfig, api_key: impl Into<String>) -> Self {
        let client: Box<dyn LlmProvider> = match config.provider {
            Provider::OpenAI => Box::new(openai::OpenAIProvider::new(api_key)),
            Provider::Google => Box::new(google::GoogleProvider::new(api_key)),
        };
        Self { config, client }
    }

    /// The configuration row this handle was built from
    pub fn config(&self) -> &'static ModelConfig {
        self.config
    }

    /// Invoke the provider's streaming call
    pub async fn stream(&self, request: &ChatRequest) -> Result<MessageEventStream> {
        self.client.stream(self.config, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_headers_reach_the_request() {
        let mut headers = HeaderMap::new();
        let custom = HashMap::from([
            ("x-request-id".to_string(), "abc123".to_string()),
            ("helicone-auth".to_string(), "Bearer hk-test".to_string()),
        ]);

        apply_custom_headers(&mut headers, &custom);

        assert_eq!(headers.get("x-request-id").unwrap(), "abc123");
        assert_eq!(headers.get("helicone-auth").unwrap(), "Bearer hk-test");
    }

    #[test]
    fn test_invalid_header_is_dropped_not_fatal() {
        let mut headers = HeaderMap::new();
        let custom = HashMap::from([
            // Space makes the name unparseable as HTTP
            ("x bad".to_string(), "v".to_string()),
            ("x-ok".to_string(), "v".to_string()),
        ]);

        apply_custom_headers(&mut headers, &custom);

        assert_eq!(headers.len(), 1);
        assert!(headers.get("x-ok").is_some());
    }
}
