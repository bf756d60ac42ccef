//! Custom error types for translation operations

use std::path::PathBuf;
use thiserror::Error;

use crate::core::models::ProviderId;

/// Failures while loading the Master context document
#[derive(Error, Debug)]
pub enum ContextLoadError {
    /// The context file does not exist
    #[error("Master file not found: {path}")]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The context file exists but could not be read as UTF-8 text
    #[error("Master file unreadable: {path} - {source}")]
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// Underlying read error
        #[source]
        source: std::io::Error,
    },

    /// The document is shorter than the expected complete glossary
    #[error("Master truncated! Expected at least {expected} lines, got {actual}")]
    Truncated {
        /// Required minimum
        expected: usize,
        /// Lines found
        actual: usize,
    },
}

/// Failure of a single provider attempt.
///
/// The orchestrator treats every variant the same way: the attempt failed and
/// the other provider gets its turn.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No credential configured for this provider
    #[error("{provider} API key not configured")]
    Unavailable {
        /// Provider without a key
        provider: ProviderId,
    },

    /// The remote call failed (transport, status, timeout or malformed body)
    #[error("{provider} call failed: {message}")]
    CallFailed {
        /// Provider that failed
        provider: ProviderId,
        /// Failure detail
        message: String,
    },
}

impl ProviderError {
    /// Provider that produced this failure
    pub fn provider(&self) -> ProviderId {
        match self {
            ProviderError::Unavailable { provider } | ProviderError::CallFailed { provider, .. } => *provider,
        }
    }

    pub(crate) fn call_failed(provider: ProviderId, message: impl Into<String>) -> Self {
        ProviderError::CallFailed {
            provider,
            message: message.into(),
        }
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Context document missing or incomplete
    #[error(transparent)]
    ContextLoad(#[from] ContextLoadError),

    /// Request rejected before any provider was contacted
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Why the request was rejected
        message: String,
    },

    /// Both providers failed; carries the last attempt's failure
    #[error("Translation failed: {cause}")]
    TranslationFailed {
        /// Secondary provider's failure
        #[source]
        cause: ProviderError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        TranslationError::InvalidRequest {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
