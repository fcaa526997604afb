//! Error types and HTTP status mapping

use thiserror::Error;

/// Result type alias for webhook operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Webhook error with HTTP status code mapping
///
/// The sender of a webhook only ever sees the status code; the message is for
/// logs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("authentication failed: {message}")]
    Authentication { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("{message}")]
    NotRegistered { message: String },

    #[error("dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("upstream error: {message}")]
    UpstreamError { message: String },
}

impl ApiError {
    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_registered(message: impl Into<String>) -> Self {
        Self::NotRegistered {
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedRequest { .. } => 400,
            Self::Authentication { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::NotRegistered { .. } => 500,
            Self::Dispatch { .. } => 500,
            Self::Internal { .. } => 500,
            Self::UpstreamError { .. } => 502,
        }
    }
}
