use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as delivered to participants. Exists only while it is being
/// fanned out.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Name the sender chose for themselves
    pub sender_name: String,
    /// Message text
    pub body: String,
    /// When the channel accepted the message
    pub sent_at: DateTime<Utc>,
}

/// Frames a participant may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Publish a message to everyone
    #[serde(rename_all = "camelCase")]
    Message {
        /// Name the sender chose for themselves
        sender_name: String,
        /// Message text
        body: String,
    },
}

impl InboundFrame {
    /// Parses a text frame received from a participant.
    pub fn parse(text: &str) -> Result<Self, ChatError> {
        serde_json::from_str(text).map_err(|e| ChatError::Malformed(e.to_string()))
    }
}

/// Frames sent to participants.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// A message published on the channel
    #[serde(rename_all = "camelCase")]
    Message {
        /// Name the sender chose for themselves
        sender_name: String,
        /// Message text
        body: String,
        /// When the channel accepted the message
        sent_at: DateTime<Utc>,
    },
    /// The participant's last frame was rejected
    Error {
        /// Why the frame was rejected
        message: String,
    },
}

impl OutboundFrame {
    /// Serializes the frame for a text websocket message.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ChatMessage> for OutboundFrame {
    fn from(message: ChatMessage) -> Self {
        OutboundFrame::Message {
            sender_name: message.sender_name,
            body: message.body,
            sent_at: message.sent_at,
        }
    }
}

impl From<ChatError> for OutboundFrame {
    fn from(error: ChatError) -> Self {
        OutboundFrame::Error {
            message: error.to_string(),
        }
    }
}

/// Custom error type for chat operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The frame is not valid JSON or not a known event
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// A required field is empty or too long
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Outcome of a publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Participants whose queue accepted the message
    pub delivered: usize,
    /// Participants whose queue was full
    pub dropped: usize,
}
