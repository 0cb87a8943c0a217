//! HTTP error translation.
//!
//! Handlers return `Result<_, ApiError>`; this module is the single place
//! where store failures become status codes and JSON error bodies, so no
//! handler can leak an untranslated error to the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::model::ValidationErrors;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("task {0} not found")]
    NotFound(i32),

    #[error("internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => Self::Validation(errors),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Unavailable(source) => {
                tracing::error!(error = %source, "store unavailable");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = match &self {
            Self::Validation(errors) => json!({
                "error": self.to_string(),
                "fields": errors.fields(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
