//! Error types for the tutor channel
//!
//! These never reach UI callers: the channel turns every failure into a
//! `Disconnected` transition and a system notice in the history.

use thiserror::Error;

/// Tutor channel error type
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Invalid tutor endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Serialization(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ChannelError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        match e {
            tokio_tungstenite::tungstenite::Error::ConnectionClosed
            | tokio_tungstenite::tungstenite::Error::AlreadyClosed => ChannelError::Closed,
            other => ChannelError::WebSocket(other.to_string()),
        }
    }
}

impl From<url::ParseError> for ChannelError {
    fn from(e: url::ParseError) -> Self {
        ChannelError::InvalidEndpoint(e.to_string())
    }
}

/// Result type for tutor channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;
