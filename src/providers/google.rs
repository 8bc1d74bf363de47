//! Google Generative AI (Gemini) API provider

use async_stream::stream;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ModelConfig;
use crate::providers::{ChatRequest, LlmProvider, apply_custom_headers};
use crate::stream::{MessageEvent, MessageEventStream, StopReason, Usage};
use crate::types::{Message, Role};

/// Google Generative AI client
pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleProvider {
    /// Create a new Google provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    fn build_request(&self, request: &ChatRequest) -> GeminiRequest {
        let mut contents = Vec::new();

        for msg in &request.messages {
            contents.extend(convert_message(msg));
        }

        // Gemini rejects the system role; the dispatcher already forces the
        // prompt empty for this provider, so only a non-empty value (from a
        // direct provider call) is forwarded as a system instruction.
        let system_instruction = if request.system.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: request.system.clone(),
                }],
            })
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(request.max_tokens),
                temperature: request.temperature,
            }),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GoogleProvider {
    async fn stream(
        &self,
        config: &ModelConfig,
        request: &ChatRequest,
    ) -> Result<MessageEventStream> {
        let body = self.build_request(request);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            config.base_url, config.id, self.api_key
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());

        // Caller-supplied headers
        apply_custom_headers(&mut headers, &request.headers);

        let request_builder = self.client.post(&url).headers(headers).json(&body);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source)))
    }
}

fn convert_message(msg: &Message) -> Vec<GeminiContent> {
    match msg.role {
        Role::User => vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart::Text {
                text: msg.content.clone(),
            }],
        }],
        Role::Assistant => {
            if msg.tool_invocations.is_empty() {
                return vec![GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![GeminiPart::Text {
                        text: msg.content.clone(),
                    }],
                }];
            }

            // Replay recorded invocations as functionCall parts on the model
            // turn, followed by a function turn with the responses. Gemini
            // matches calls to responses by name, not id.
            let mut model_parts = Vec::new();
            if !msg.content.is_empty() {
                model_parts.push(GeminiPart::Text {
                    text: msg.content.clone(),
                });
            }
            let mut response_parts = Vec::new();

            for inv in &msg.tool_invocations {
                model_parts.push(GeminiPart::FunctionCall {
                    function_call: GeminiFunctionCall {
                        name: inv.tool_name.clone(),
                        args: inv.args.clone(),
                    },
                });
                response_parts.push(GeminiPart::FunctionResponse {
                    function_response: GeminiFunctionResponse {
                        name: inv.tool_name.clone(),
                        response: serde_json::json!({ "result": inv.result }),
                    },
                });
            }

            vec![
                GeminiContent {
                    role: Some("model".to_string()),
                    parts: model_parts,
                },
                GeminiContent {
                    role: Some("function".to_string()),
                    parts: response_parts,
                },
            ]
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
                    if msg.data.is_empty() || msg.data == "[DONE]" {
                        continue;
                    }

                    let chunk: std::result::Result<GeminiStreamResponse, _> = serde_json::from_str(&msg.data);
                    match chunk {
                        Ok(response) => {
                            for candidate in &response.candidates {
                                if let Some(ref content) = candidate.content {
                                    for part in &content.parts {
                                        if let Some(ref text) = part.text {
                                            accumulated_text.push_str(text);
                                            yield MessageEvent::TextDelta {
                                                delta: text.clone(),
                                            };
                                        }
                                    }
                                }

                                if let Some(ref reason) = candidate.finish_reason {
                                    finish_reason = Some(reason.clone());
                                }
                            }

                            if let Some(ref usage_metadata) = response.usage_metadata {
                                usage.input = usage_metadata.prompt_token_count.unwrap_or(0);
                                usage.output = usage_metadata.candidates_token_count.unwrap_or(0);
                            }
                        }
                        Err(e) => {
                            // The payload may be an error document instead of a chunk
                            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&msg.data) {
                                yield MessageEvent::Error {
                                    message: error_response.error.message,
                                };
                                return;
                            }
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
            Some("MAX_TOKENS") => StopReason::Length,
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
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Debug, Serialize)]
struct GeminiFunctionCall {
    name: String,
    args: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

/// A streamed candidate part; anything other than text is ignored
#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolInvocation;

    #[test]
    fn test_convert_roles() {
        let user = convert_message(&Message::user("hi"));
        assert_eq!(user[0].role.as_deref(), Some("user"));

        let assistant = convert_message(&Message::assistant("hello"));
        assert_eq!(assistant[0].role.as_deref(), Some("model"));
    }

    #[test]
    fn test_convert_replays_tool_invocations() {
        let msg = Message {
            role: Role::Assistant,
            content: "checking".into(),
            tool_invocations: vec![ToolInvocation {
                tool_call_id: "call_0".into(),
                tool_name: "search".into(),
                args: serde_json::json!({ "q": "react" }),
                result: serde_json::json!([1, 2]),
            }],
        };

        let converted = convert_message(&msg);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role.as_deref(), Some("model"));
        assert_eq!(converted[0].parts.len(), 2);
        assert_eq!(converted[1].role.as_deref(), Some("function"));
        assert_eq!(converted[1].parts.len(), 1);
    }

    #[test]
    fn test_generation_config_forwards_caller_options() {
        let provider = GoogleProvider::new("key");
        let request = ChatRequest {
            system: String::new(),
            messages: vec![Message::user("hi")],
            max_tokens: 1024,
            temperature: Some(0.2),
            headers: Default::default(),
        };

        let body = provider.build_request(&request);
        let generation_config = body.generation_config.unwrap();
        assert_eq!(generation_config.max_output_tokens, Some(1024));
        assert_eq!(generation_config.temperature, Some(0.2));
    }

    #[test]
    fn test_empty_system_is_omitted_from_request() {
        let provider = GoogleProvider::new("key");
        let request = ChatRequest {
            system: String::new(),
            messages: vec![Message::user("hi")],
            max_tokens: 256,
            temperature: None,
            headers: Default::default(),
        };
        let body = provider.build_request(&request);
        assert!(body.system_instruction.is_none());
    }
}
