use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use super::metrics::record_error;
use crate::mapping::MappingError;
use crate::song_store::SongStoreError;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "Error";

/// Envelope for mutation results and every error: `{"status": "OK"}` or
/// `{"status": "Error", "error": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        ApiResponse {
            status: STATUS_OK.to_string(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse {
            status: STATUS_ERROR.to_string(),
            error: Some(message.into()),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] SongStoreError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(SongStoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Store(SongStoreError::AlreadyExists { .. }) => {
                (StatusCode::CONFLICT, "already_exists")
            }
            ApiError::Store(SongStoreError::NoChange) => (StatusCode::BAD_REQUEST, "no_change"),
            ApiError::Store(SongStoreError::InvalidFilter(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_format")
            }
            ApiError::Store(SongStoreError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store")
            }
            ApiError::Mapping(MappingError::InvalidFormat(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_format")
            }
            ApiError::Mapping(MappingError::MissingField) => {
                (StatusCode::BAD_REQUEST, "missing_field")
            }
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        record_error(kind);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:#}", self);
            "internal error".to_string()
        } else {
            info!("Request rejected ({}): {}", status.as_u16(), self);
            self.to_string()
        };

        (status, ApiResponse::error(message)).into_response()
    }
}
