//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use easystream_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  /// HTTP status and a stable machine-readable kind.
  fn classify(&self) -> (StatusCode, &'static str) {
    match self {
      Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
      Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
      Self::Core(err) => match err {
        CoreError::ClientNotFound(_)
        | CoreError::PurchaseNotFound(_)
        | CoreError::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        CoreError::DuplicateKey { .. } => (StatusCode::CONFLICT, "duplicate_key"),
        CoreError::UniqueConstraint { .. } => {
          (StatusCode::CONFLICT, "unique_constraint")
        }
        CoreError::ServiceInUse { .. } => (StatusCode::CONFLICT, "service_in_use"),
        CoreError::InvalidRecord(_) => (StatusCode::BAD_REQUEST, "invalid_record"),
        CoreError::MalformedSnapshot(_) => {
          (StatusCode::BAD_REQUEST, "malformed_snapshot")
        }
        CoreError::ImportInterrupted { .. } => {
          (StatusCode::INTERNAL_SERVER_ERROR, "import_interrupted")
        }
        CoreError::Storage(_) | CoreError::Serialization(_) => {
          (StatusCode::INTERNAL_SERVER_ERROR, "storage_fault")
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.classify();
    if status.is_server_error() {
      tracing::error!(error = %self, kind, "request failed");
    }
    let body = Json(json!({ "error": self.to_string(), "kind": kind }));
    (status, body).into_response()
  }
}
