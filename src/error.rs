//! Error types for forge-ai

use thiserror::Error;

/// Result type alias using forge-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before a provider stream is opened.
///
/// Once a stream is open, provider failures arrive as in-stream error
/// events and propagate to the caller unmodified; nothing here wraps them.
#[derive(Error, Debug)]
pub enum Error {
    /// API key cannot be sent as a credential (e.g. contains characters
    /// invalid in an HTTP header)
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Server-sent events connection could not be established
    #[error("SSE error: {0}")]
    Sse(String),

    /// Model-type selector outside the supported set
    #[error("Unsupported model type: {0}")]
    UnsupportedModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_names_selector() {
        let e = Error::UnsupportedModel("gpt-5".into());
        assert_eq!(e.to_string(), "Unsupported model type: gpt-5");
    }

    #[test]
    fn test_sse_display() {
        let e = Error::Sse("connection reset".into());
        assert_eq!(e.to_string(), "SSE error: connection reset");
    }
}
