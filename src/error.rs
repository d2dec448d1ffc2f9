//! Error types for arena-shell

use thiserror::Error;

/// Errors that can occur in the application shell
#[derive(Debug, Error)]
pub enum ShellError {
    /// Route pattern rejected at registration
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    /// No route matched and no fallback route is registered
    #[error("No route for '{0}' and no fallback route registered")]
    NoRoute(String),

    /// Backend accepted the request but reported an application-level failure
    #[error("{0}")]
    Rejected(String),

    /// Network or protocol failure talking to the backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted session storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// View handler failure during dispatch
    #[error("Handler error: {0}")]
    Handler(String),
}

impl ShellError {
    /// Message suitable for an end-user notice
    ///
    /// Backend-reported rejections carry the server's own message; anything
    /// else falls back to the caller-supplied generic text.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            ShellError::Rejected(message) => message,
            _ => fallback,
        }
    }
}

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;
