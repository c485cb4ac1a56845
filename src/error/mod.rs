//! Admin Login Error Types
//!
//! Error hierarchy for the Zoho admin login flow, plus the user-facing
//! classifier that turns any of these into display text.

pub mod classifier;

use std::time::Duration;
use thiserror::Error;

pub use classifier::{
    classify, default_classifier, is_technical, sanitize, ErrorClassifier, ErrorInfo, ErrorRule,
};

/// Root error type for the admin login flow.
#[derive(Error, Debug)]
pub enum OAuthFlowError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("OAuth provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Exchange(#[from] ExchangeError),

    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

impl OAuthFlowError {
    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ADMIN_OAUTH_CONFIG",
            Self::Provider(_) => "ADMIN_OAUTH_PROVIDER",
            Self::Exchange(_) => "ADMIN_OAUTH_EXCHANGE",
            Self::Transport(_) => "ADMIN_OAUTH_TRANSPORT",
            Self::Storage(_) => "ADMIN_OAUTH_STORAGE",
            Self::Unknown { .. } => "ADMIN_OAUTH_UNKNOWN",
        }
    }

    /// Whether a fresh, user-initiated login attempt can succeed without
    /// changing configuration.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::Storage(e) => e.is_retryable(),
            _ => true,
        }
    }

    /// Create an error for failures that fit no other bucket.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {}", fields.join(", "))]
    MissingRequired { fields: Vec<String> },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Unsupported scope '{scope}', expected '{expected}'")]
    InvalidScope { scope: String, expected: String },
}

/// Error reported by the identity provider on the callback redirect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ProviderError {
    /// The `error` query parameter, e.g. `access_denied`.
    pub error: String,
    /// The optional `error_description` query parameter.
    pub description: Option<String>,
}

impl ProviderError {
    pub fn new(error: impl Into<String>, description: Option<String>) -> Self {
        Self {
            error: error.into(),
            description,
        }
    }
}

/// Backend code-exchange failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Backend API error: {status} - {body}")]
    BackendStatus { status: u16, body: String },

    #[error("Token exchange failed: {message}")]
    Rejected { message: String },

    #[error("Token exchange failed: backend response did not include an access token")]
    MissingAccessToken,

    #[error("Invalid backend response: {message}")]
    InvalidResponse { message: String },
}

/// Network/transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Failed to read response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP client could not be constructed: {message}")]
    ClientBuild { message: String },
}

/// Session storage error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },

    #[error("Corrupted session data: {message}")]
    CorruptedData { message: String },
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::CorruptedData { .. })
    }
}

/// Result type for admin login operations.
pub type OAuthFlowResult<T> = Result<T, OAuthFlowError>;
