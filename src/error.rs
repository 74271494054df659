//! Common error types for the image generation bot

use reqwest::StatusCode;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: String,
        status: StatusCode,
        body: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("All image providers failed")]
    AllProvidersFailed,

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text shown to the chat user for this error
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(reason) => reason.clone(),
            AppError::AllProvidersFailed => {
                "❌ Failed to generate image from both services. Please try again later.".to_string()
            }
            other => format!("⚠️ An error occurred: {}", other),
        }
    }

    /// Whether the error was raised before any network call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Request URLs carry the bot token and API keys, so they are dropped here
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpClient(err.without_url())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
