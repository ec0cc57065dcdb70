//! Error types for GoalPath Core
//!
//! This module defines the error taxonomy surfaced to UI code by the goal store,
//! the auth layer and configuration loading.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;

use crate::goal::GoalId;

/// Result type alias for goal store operations
pub type Result<T> = std::result::Result<T, GoalError>;

/// Errors surfaced by goal store and goal service operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoalError {
    /// Local field check failed before any network call
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Non-2xx response or network failure from the goal service
    #[error("{message}")]
    Remote { status: Option<u16>, message: String },

    /// Update/delete target missing from the local cache
    #[error("Goal not found: {0}")]
    NotFound(GoalId),

    /// Milestone missing from a locally cached goal
    #[error("Milestone for week {week} not found in goal {goal}")]
    MilestoneNotFound { goal: GoalId, week: u32 },

    /// The service answered 401; stored credentials have been invalidated
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// The store was torn down while the operation was in flight
    #[error("Goal store session has ended")]
    SessionEnded,

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GoalError {
    /// Build a validation error for `field`
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Build a remote error carrying the server message (or fallback)
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// True for errors detected locally before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotFound(_) | Self::MilestoneNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for GoalError {
    fn from(e: serde_json::Error) -> Self {
        GoalError::Serialization(e.to_string())
    }
}

/// Errors related to login, registration and credential storage
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Credential storage error at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Http(e.to_string())
    }
}

/// Errors related to client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid URL for {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}
