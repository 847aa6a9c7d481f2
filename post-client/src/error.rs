use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `post-client`.
pub enum BlogClientError {
    /// Transport failure or an undecodable response (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing, expired or revoked bearer token (401).
    #[error("unauthenticated")]
    Unauthorized,

    /// The post belongs to another user (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No post matches the id or slug (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected input (422) with the per-field messages.
    #[error("validation failed: {message}")]
    Validation {
        /// Summary message from the server.
        message: String,
        /// Field name to messages.
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Any other non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the status line.
        message: String,
    },

    /// The base URL cannot carry API paths.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// Reading or writing the token file failed.
    #[error("token store error: {0}")]
    TokenStore(#[from] std::io::Error),
}

/// Result of `post-client` operations.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    /// `errors` is a string for most failures and a field map for 422.
    pub(crate) fn from_http_status(
        status: reqwest::StatusCode,
        message: Option<String>,
        errors: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY => Self::Validation { message, errors },
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Field messages for [`BlogClientError::Validation`], flattened as `field: message`.
    pub fn field_messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors, .. } => errors
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |message| format!("{field}: {message}"))
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
