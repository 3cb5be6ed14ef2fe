//! Error types for the expense tracker

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpenseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad user input; the message is shown as-is
    #[error("{0}")]
    Validation(String),

    /// The hosted service rejected the request; the message is shown as-is
    #[error("{0}")]
    Service(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Please sign in first")]
    NotSignedIn,

    #[error("Session expired, please sign in again")]
    SessionExpired,
}

impl From<serde_json::Error> for ExpenseError {
    fn from(err: serde_json::Error) -> Self {
        ExpenseError::Decode(err.to_string())
    }
}
