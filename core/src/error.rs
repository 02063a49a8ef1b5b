//! Error types for the events client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the event does not exist" from everything else. When the server explains
//! a failure with a Graph error document, the explanation is kept in `Graph`;
//! any other non-2xx response lands in `HttpError` with the raw body.

use thiserror::Error;

/// Errors returned by `EventClient` parse methods and by `Transport`s.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status with a Graph error document.
    #[error("HTTP {status}: {kind}: {message}")]
    Graph {
        status: u16,
        kind: String,
        message: String,
    },

    /// The server returned a non-2xx status without a recognizable error body.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A boolean endpoint answered `false`.
    #[error("{operation} was rejected by the server")]
    Rejected { operation: &'static str },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Errors raised while loading `ClientConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}
