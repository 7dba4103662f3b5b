//! Error types for the Phish.net API client.
//!
//! # Design
//! One enum covers the whole client. Guard variants (`MissingApiKey`,
//! `MissingAuthorization`, `MissingUsername`, `InvalidRating`, `InvalidDate`)
//! are raised before any request is built and carry the name of the operation
//! or the offending input. Only `ServerError` is retryable; the executor is
//! the single place that consults [`ApiError::is_retryable`].

use thiserror::Error;

/// Boxed cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `PhishNetClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The operation needs an application API key and none was configured.
    #[error("{operation} requires an API key")]
    MissingApiKey { operation: &'static str },

    /// The operation acts for the authorized user and the session has none.
    #[error("{operation} requires an authorized user")]
    MissingAuthorization { operation: &'static str },

    /// No username was given and the session has no authorized user.
    #[error("{operation} requires a username")]
    MissingUsername { operation: &'static str },

    /// The user never authorized this API key and no password was supplied.
    #[error("user {username} was not previously authorized and no password was provided")]
    MissingCredentials { username: String },

    /// The remote side rejected the authorization attempt.
    #[error("authorization of user {username} was denied")]
    AuthorizationDenied { username: String },

    #[error("invalid rating {0}: rating must be an integer between 1 and 5")]
    InvalidRating(String),

    #[error("show date {0:?} could not be parsed into a date, use YYYY-MM-DD")]
    InvalidDate(String),

    /// The API only speaks GET and POST.
    #[error("unsupported HTTP method {0}: only GET and POST are supported")]
    UnsupportedMethod(String),

    /// Connection, DNS, TLS, or timeout failure below HTTP.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a 5xx status.
    #[error("internal Phish.net API error (HTTP {status})")]
    ServerError { status: u16 },

    /// The response body is not valid JSON, or lacks a required field.
    #[error("response could not be decoded: {0}")]
    Decode(String),

    #[error("unable to retrieve HTTP {method} {path}")]
    NoResponse { method: String, path: String },

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether the executor may re-issue the request after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ServerError { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
