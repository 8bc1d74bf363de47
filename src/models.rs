//! Model configuration table — the reviewed selector-to-model mapping.

use crate::types::ModelType;

/// Known LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Google,
}

impl Provider {
    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Google => "Google",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }
}

/// One row of the model configuration table
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// Selector this row answers for
    pub model_type: ModelType,
    /// Provider whose client handles the request
    pub provider: Provider,
    /// Underlying model identifier sent on the wire
    pub id: &'static str,
    /// Base URL for API calls
    pub base_url: &'static str,
    /// Whether the provider accepts a system prompt. Gemini rejects the
    /// system role, so dispatch sends an empty prompt for that row.
    pub supports_system_prompt: bool,
}

/// Selector-to-model table. Each tier maps to its own model id; adding a
/// provider quirk means adding a column, adding a model means adding a row.
const MODEL_TABLE: &[ModelConfig] = &[
    ModelConfig {
        model_type: ModelType::Gpt4o,
        provider: Provider::OpenAI,
        id: "gpt-4o",
        base_url: "https://api.openai.com/v1",
        supports_system_prompt: true,
    },
    ModelConfig {
        model_type: ModelType::Gpt4oMini,
        provider: Provider::OpenAI,
        id: "gpt-4o-mini",
        base_url: "https://api.openai.com/v1",
        supports_system_prompt: true,
    },
    ModelConfig {
        model_type: ModelType::Gemini15Pro,
        provider: Provider::Google,
        id: "gemini-1.5-pro-latest",
        base_url: "https://generativelanguage.googleapis.com/v1beta",
        supports_system_prompt: false,
    },
];

/// Look up the configuration row for a model type.
pub fn get_model(model_type: ModelType) -> &'static ModelConfig {
    MODEL_TABLE
        .iter()
        .find(|c| c.model_type == model_type)
        .unwrap_or_else(|| unreachable!("model table is missing {model_type:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt_4o_routes_to_openai() {
        let config = get_model(ModelType::Gpt4o);
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.id, "gpt-4o");
        assert!(config.supports_system_prompt);
    }

    #[test]
    fn test_gpt_4o_mini_routes_to_openai() {
        let config = get_model(ModelType::Gpt4oMini);
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.id, "gpt-4o-mini");
    }

    #[test]
    fn test_gemini_routes_to_google() {
        let config = get_model(ModelType::Gemini15Pro);
        assert_eq!(config.provider, Provider::Google);
        assert_eq!(config.id, "gemini-1.5-pro-latest");
        assert!(!config.supports_system_prompt);
    }

    #[test]
    fn test_openai_tiers_have_distinct_ids() {
        assert_ne!(get_model(ModelType::Gpt4o).id, get_model(ModelType::Gpt4oMini).id);
    }

    #[test]
    fn test_api_key_env_vars() {
        assert_eq!(Provider::OpenAI.api_key_env_var(), "OPENAI_API_KEY");
        assert_eq!(
            Provider::Google.api_key_env_var(),
            "GOOGLE_GENERATIVE_AI_API_KEY"
        );
    }
}
