//! Handlers for `/settings/{key}`.
//!
//! The stored password hash is managed by the server binary and is neither
//! readable nor writable here.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use easystream_core::{Panel, setting::PASSWORD_HASH, store::RecordStore};
use serde_json::Value;

use crate::error::ApiError;

fn guard(key: &str) -> Result<(), ApiError> {
  if key == PASSWORD_HASH {
    return Err(ApiError::BadRequest(format!("setting {key:?} is not exposed")));
  }
  Ok(())
}

/// `GET /settings/{key}`
pub async fn get_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(key): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  guard(&key)?;
  let value = panel
    .settings()
    .get(&key)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("setting {key} not found")))?;
  Ok(Json(value))
}

/// `PUT /settings/{key}`, body: any JSON value.
pub async fn put_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(key): Path<String>,
  Json(value): Json<Value>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  guard(&key)?;
  panel.settings().set(&key, value).await?;
  Ok(StatusCode::NO_CONTENT)
}
