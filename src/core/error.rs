use std::io;
use thiserror::Error;

/// Unified error type for gemterm
#[derive(Error, Debug)]
pub enum GemtermError {
    /// Errors reported by the Gemini API itself
    #[error("API error: {0}")]
    Api(String),

    /// The prompt or the generated candidate was blocked by the API
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// System clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Markdown rendering errors
    #[error("Render error: {0}")]
    Render(String),
}

impl From<reqwest::Error> for GemtermError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GemtermError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GemtermError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            GemtermError::Api(format!("API returned error status: {}", err))
        } else {
            GemtermError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for GemtermError {
    fn from(err: serde_json::Error) -> Self {
        GemtermError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<rustyline::error::ReadlineError> for GemtermError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        GemtermError::Input(format!("Line editor error: {}", err))
    }
}

impl From<base64::DecodeError> for GemtermError {
    fn from(err: base64::DecodeError) -> Self {
        GemtermError::Serialization(format!("Base64 error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, GemtermError>;
