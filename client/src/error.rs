//! Error types for the task API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because the view
//! treats them differently from transport-level surprises: both carry a
//! message fit for the error banner as-is. Every other non-2xx status lands
//! in `Http` with the raw status and body for debugging.

use std::fmt;

/// Errors returned by `TaskClient` parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the referenced task does not exist.
    NotFound,

    /// The server rejected the payload with a 400 and a field-level message.
    Validation(String),

    /// The server returned a non-2xx status other than 400/404.
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "task not found"),
            ApiError::Validation(message) => write!(f, "{message}"),
            ApiError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Deserialization(msg) => write!(f, "deserialization failed: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
