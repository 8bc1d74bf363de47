//! Streaming event types and the stream handle returned to callers.

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::types::Message;

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    Stop,
    /// Token ceiling reached
    Length,
    /// Error occurred
    Error,
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Events emitted while a response streams in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// Stream opened, generation started
    Start,
    /// Incremental text
    TextDelta { delta: String },
    /// Response completed
    Done {
        message: Message,
        stop_reason: StopReason,
        usage: Usage,
    },
    /// Error occurred mid-stream
    Error { message: String },
}

impl MessageEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageEvent::Done { .. } | MessageEvent::Error { .. })
    }

    /// Get the final message if this is a Done event
    pub fn into_message(self) -> Option<Message> {
        match self {
            MessageEvent::Done { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A stream of message events. Consumption and cancellation are owned by
/// the caller; this layer never buffers or inspects the stream.
pub type MessageEventStream = Pin<Box<dyn Stream<Item = MessageEvent> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(MessageEvent::Error { message: "boom".into() }.is_terminal());
        assert!(
            MessageEvent::Done {
                message: Message::assistant("done"),
                stop_reason: StopReason::Stop,
                usage: Usage::default(),
            }
            .is_terminal()
        );
        assert!(!MessageEvent::Start.is_terminal());
        assert!(!MessageEvent::TextDelta { delta: "hi".into() }.is_terminal());
    }

    #[test]
    fn test_into_message() {
        let done = MessageEvent::Done {
            message: Message::assistant("answer"),
            stop_reason: StopReason::Stop,
            usage: Usage { input: 10, output: 2 },
        };
        assert_eq!(done.into_message().unwrap().content, "answer");
        assert!(MessageEvent::Start.into_message().is_none());
    }
}
