//! The stream dispatcher: resolve, assemble, delegate.
//!
//! Each call is a fully independent, stateless operation. The dispatcher
//! resolves the model configuration and API key, assembles the system
//! prompt, merges caller options over its defaults, and hands the request
//! to the provider client. The returned stream is passed through untouched.

use crate::error::Result;
use crate::keys::{RuntimeEnv, resolve_api_key};
use crate::models::{ModelConfig, get_model};
use crate::prompt::SYSTEM_PROMPT;
use crate::providers::{ChatRequest, ModelHandle};
use crate::stream::MessageEventStream;
use crate::types::{Message, ModelType, StreamingOptions};

/// Default token ceiling for a response; callers can override it through
/// [`StreamingOptions::max_tokens`].
pub const MAX_TOKENS: u32 = 8192;

/// Everything resolved before any network activity.
#[derive(Debug)]
struct PreparedDispatch {
    config: &'static ModelConfig,
    api_key: String,
    request: ChatRequest,
}

/// Resolve model, key, prompt, and options. Fails only on an unsupported
/// model-type selector; a missing key passes through as an empty credential
/// for the provider to reject.
fn prepare(
    messages: Vec<Message>,
    env: &RuntimeEnv,
    options: &StreamingOptions,
) -> Result<PreparedDispatch> {
    let model_type = match options.model_type.as_deref() {
        Some(selector) => selector.parse::<ModelType>()?,
        None => ModelType::default(),
    };
    let config = get_model(model_type);

    let api_key = resolve_api_key(config.provider, env).unwrap_or_default();

    let system = if config.supports_system_prompt {
        SYSTEM_PROMPT.clone()
    } else {
        String::new()
    };

    Ok(PreparedDispatch {
        config,
        api_key,
        request: ChatRequest {
            system,
            messages,
            max_tokens: options.max_tokens.unwrap_or(MAX_TOKENS),
            temperature: options.temperature,
            headers: options.headers.clone(),
        },
    })
}

/// Stream a chat completion for the given messages.
///
/// `options.model_type` selects the configuration (`gpt-4o` by default);
/// the remaining options override the dispatcher defaults and pass through
/// to the provider call verbatim.
pub async fn stream_text(
    messages: Vec<Message>,
    env: &RuntimeEnv,
    options: StreamingOptions,
) -> Result<MessageEventStream> {
    let prepared = prepare(messages, env, &options)?;
    tracing::debug!(
        model = prepared.config.id,
        provider = prepared.config.provider.name(),
        "dispatching chat stream"
    );

    let handle = ModelHandle::new(prepared.config, prepared.api_key);
    handle.stream(&prepared.request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Provider;
    use crate::prompt::WORK_DIR;

    fn options_for(selector: &str) -> StreamingOptions {
        StreamingOptions {
            model_type: Some(selector.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unsupported_selector_fails_before_any_call() {
        let err = prepare(vec![], &RuntimeEnv::new(), &options_for("gpt-5")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedModel(s) if s == "gpt-5"));
    }

    #[tokio::test]
    async fn test_stream_text_rejects_unsupported_selector() {
        let result = stream_text(
            vec![Message::user("hi")],
            &RuntimeEnv::new(),
            options_for("llama-3"),
        )
        .await;
        assert!(matches!(result, Err(Error::UnsupportedModel(s)) if s == "llama-3"));
    }

    #[test]
    fn test_default_selector_is_gpt_4o() {
        let prepared = prepare(vec![], &RuntimeEnv::new(), &StreamingOptions::default()).unwrap();
        assert_eq!(prepared.config.id, "gpt-4o");
        assert_eq!(prepared.config.provider, Provider::OpenAI);
    }

    #[test]
    fn test_google_dispatch_suppresses_system_prompt() {
        let prepared = prepare(vec![], &RuntimeEnv::new(), &options_for("gemini-1.5-pro")).unwrap();
        assert_eq!(prepared.config.provider, Provider::Google);
        assert!(prepared.request.system.is_empty());
    }

    #[test]
    fn test_mini_dispatch_carries_system_prompt_with_work_dir() {
        let prepared = prepare(
            vec![Message::user("hi")],
            &RuntimeEnv::new(),
            &options_for("gpt-4o-mini"),
        )
        .unwrap();
        assert_eq!(prepared.config.id, "gpt-4o-mini");
        assert!(!prepared.request.system.is_empty());
        assert!(prepared.request.system.contains(WORK_DIR));
    }

    #[test]
    fn test_caller_max_tokens_overrides_default() {
        let prepared = prepare(vec![], &RuntimeEnv::new(), &StreamingOptions::default()).unwrap();
        assert_eq!(prepared.request.max_tokens, MAX_TOKENS);

        let options = StreamingOptions {
            max_tokens: Some(512),
            ..Default::default()
        };
        let prepared = prepare(vec![], &RuntimeEnv::new(), &options).unwrap();
        assert_eq!(prepared.request.max_tokens, 512);
    }

    #[test]
    fn test_runtime_binding_key_reaches_the_request() {
        // No test in this crate ever sets the Google var, so removing it
        // here cannot race with another test.
        unsafe { std::env::remove_var(Provider::Google.api_key_env_var()) };
        let env = RuntimeEnv::new().with(Provider::Google.api_key_env_var(), "AIza-runtime");
        let prepared = prepare(vec![], &env, &options_for("gemini-1.5-pro")).unwrap();
        assert_eq!(prepared.api_key, "AIza-runtime");
    }

    #[test]
    fn test_missing_key_is_not_a_dispatch_error() {
        // The provider rejects the empty credential at call time instead.
        unsafe { std::env::remove_var(Provider::Google.api_key_env_var()) };
        let prepared = prepare(vec![], &RuntimeEnv::new(), &options_for("gemini-1.5-pro")).unwrap();
        assert!(prepared.api_key.is_empty());
    }
}
