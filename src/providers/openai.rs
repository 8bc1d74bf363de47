//! OpenAI Chat Completions API provider

use async_stream::stream;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ModelConfig;
use crate::providers::{ChatRequest, LlmProvider, apply_custom_headers};
use crate::stream::{MessageEvent, MessageEventStream, StopReason, Usage};
use crate::types::{Message, Role};

/// OpenAI API client
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    fn build_request(&self, config: &ModelConfig, request: &ChatRequest) -> OpenAIRequest {
        let mut messages = Vec::new();

        // System prompt rides as the first message
        if !request.system.is_empty() {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(request.system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for msg in &request.messages {
            messages.extend(convert_message(msg));
        }

        OpenAIRequest {
            model: config.id.to_string(),
            messages,
            stream: true,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAIProvider {
    async fn stream(
        &self,
        config: &ModelConfig,
        request: &ChatRequest,
    ) -> Result<MessageEventStream> {
        let body = self.build_request(config, request);
        let url = format!("{}/chat/completions", config.base_url);
        tracing::debug!("OpenAI API URL: {}", url);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", self.api_key)
                .parse()
                .map_err(|_| Error::InvalidApiKey)?,
        );
        headers.insert("content-type", "application/json".parse().unwrap());

        // Caller-supplied headers
        apply_custom_headers(&mut headers, &request.headers);

        let request_builder = self.client.post(&url).headers(headers).json(&body);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source)))
    }
}

fn convert_message(msg: &Message) -> Vec<OpenAIMessage> {
    match msg.role {
        Role::User => vec![OpenAIMessage {
            role: "user".to_string(),
            content: Some(msg.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        }],
        Role::Assistant => {
            if msg.tool_invocations.is_empty() {
                return vec![OpenAIMessage {
                    role: "assistant".to_string(),
                    content: Some(msg.content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                }];
            }

            // Replay the recorded invocations as an assistant tool-call
            // message followed by one tool result per invocation.
            let tool_calls = msg
                .tool_invocations
                .iter()
                .map(|inv| OpenAIToolCall {
                    id: inv.tool_call_id.clone(),
                    call_type: "function".to_string(),
                    function: OpenAIFunctionCall {
                        name: inv.tool_name.clone(),
                        arguments: inv.args.to_string(),
                    },
                })
                .collect();

            let mut converted = vec![OpenAIMessage {
                role: "assistant".to_string(),
                content: if msg.content.is_empty() {
                    None
                } else {
                    Some(msg.content.clone())
                },
                tool_calls: Some(tool_calls),
                tool_call_id: None,
            }];

            for inv in &msg.tool_invocations {
                converted.push(OpenAIMessage {
                    role: "tool".to_string(),
                    content: Some(inv.result.to_string()),
                    tool_calls: None,
                    tool_call_id: Some(inv.tool_call_id.clone()),
                });
            }

            converted
        }
    }
}

fn create_stream(mut event_source: EventSource) -> impl futures::Stream<Item = MessageEvent> {
    stream! {
        let mut accumulated_text = String::new();
        let mut finish_reason: Option<String> = None;
        let mut usage = Usage::default();

        yield MessageEvent::Start;

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data == "[DONE]" {
                        break;
                    }

                    let chunk: std::result::Result<StreamChunk, _> = serde_json::from_str(&msg.data);
                    match chunk {
                        Ok(chunk) => {
                            for choice in &chunk.choices {
                                if let Some(ref content) = choice.delta.content {
                                    accumulated_text.push_str(content);
                                    yield MessageEvent::TextDelta {
                                        delta: content.clone(),
                                    };
                                }

                                if let Some(ref reason) = choice.finish_reason {
                                    finish_reason = Some(reason.clone());
                                }
                            }

                            // Usage arrives in the final chunk when present
                            if let Some(ref stream_usage) = chunk.usage {
                                usage.input = stream_usage.prompt_tokens;
                                usage.output = stream_usage.completion_tokens;
                            }
                        }
                        Err(e) => {
                            yield MessageEvent::Error {
                                message: format!("Failed to parse chunk: {}", e),
                            };
                            return;
                        }
                    }
                }
                Err(e) => {
                    yield MessageEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }

        let stop_reason = match finish_reason.as_deref() {
            Some("length") => StopReason::Length,
            _ => StopReason::Stop,
        };

        yield MessageEvent::Done {
            message: Message::assistant(accumulated_text),
            stop_reason,
            usage,
        };
    }
}

// Request types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

// Streaming response types

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolInvocation;

    #[test]
    fn test_convert_plain_messages() {
        let user = convert_message(&Message::user("hi"));
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].role, "user");
        assert_eq!(user[0].content.as_deref(), Some("hi"));

        let assistant = convert_message(&Message::assistant("hello"));
        assert_eq!(assistant[0].role, "assistant");
        assert!(assistant[0].tool_calls.is_none());
    }

    #[test]
    fn test_build_request_forwards_caller_options() {
        let provider = OpenAIProvider::new("sk-test");
        let config = crate::models::get_model(crate::types::ModelType::Gpt4oMini);
        let request = ChatRequest {
            system: "be brief".into(),
            messages: vec![Message::user("hi")],
            max_tokens: 512,
            temperature: Some(0.7),
            headers: Default::default(),
        };

        let body = provider.build_request(config, &request);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.max_tokens, Some(512));
        assert_eq!(body.temperature, Some(0.7));
        assert_eq!(body.messages[0].role, "system");
    }

    #[test]
    fn test_convert_replays_tool_invocations() {
        let msg = Message {
            role: Role::Assistant,
            content: String::new(),
            tool_invocations: vec![ToolInvocation {
                tool_call_id: "call_1".into(),
                tool_name: "lookup".into(),
                args: serde_json::json!({ "q": "vite" }),
                result: serde_json::json!({ "hits": 2 }),
            }],
        };

        let converted = convert_message(&msg);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "assistant");
        assert!(converted[0].content.is_none());
        let calls = converted[0].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "lookup");
        assert_eq!(converted[1].role, "tool");
        assert_eq!(converted[1].tool_call_id.as_deref(), Some("call_1"));
    }
}
