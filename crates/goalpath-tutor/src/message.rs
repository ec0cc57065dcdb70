//! Chat history entries and the JSON frames exchanged with the tutor service

use chrono::{DateTime, NaiveDateTime, Utc};
use goalpath_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Appended once per successful connection
pub const WELCOME_TEXT: &str =
    "Connected to AI Tutor. How can I help you with your learning goals today?";

/// Appended whenever the connection drops or fails to open
pub const DISCONNECT_TEXT: &str = "Disconnected from AI Tutor. Trying to reconnect...";

/// Who produced a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageOrigin::User => write!(f, "you"),
            MessageOrigin::Assistant => write!(f, "tutor"),
            MessageOrigin::System => write!(f, "system"),
        }
    }
}

/// One entry of the session's chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub origin: MessageOrigin,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(origin: MessageOrigin, text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            origin,
            text: text.into(),
            timestamp,
        }
    }
}

/// Frame sent for every user message
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame<'a> {
    pub kind: &'static str,
    pub text: &'a str,
    pub timestamp: String,
    pub context: &'static str,
}

impl<'a> OutboundFrame<'a> {
    pub fn user_message(text: &'a str, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: "user_message",
            text,
            timestamp: timestamp.to_rfc3339(),
            context: "learning",
        }
    }
}

/// Frame received from the tutor: `{message, timestamp?}`
///
/// `timestamp` is kept as raw JSON so a malformed value never costs the
/// reply itself.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl InboundFrame {
    /// Parse a text frame; anything without a string `message` is rejected
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!("Discarding malformed tutor frame: {}", e);
                None
            }
        }
    }

    /// Server timestamp, if present and readable.
    ///
    /// RFC 3339 values are converted to UTC; naive ISO values (the server's
    /// usual format) are taken as UTC. Non-string values count as absent.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = match self.timestamp.as_ref()? {
            serde_json::Value::String(raw) => raw.trim(),
            serde_json::Value::Null => return None,
            other => {
                tracing::debug!("Ignoring non-string tutor timestamp {}", other);
                return None;
            }
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(naive) => Some(naive.and_utc()),
            Err(_) => {
                tracing::debug!("Ignoring unreadable tutor timestamp {:?}", raw);
                None
            }
        }
    }
}
