//! Snapshot export, import, and the full wipe.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/backup` | Snapshot JSON as a dated download |
//! | `POST`   | `/backup` | Body: snapshot JSON; replaces every table |
//! | `DELETE` | `/data` | Clears every table |
//!
//! None of these read or replace the stored password hash.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use easystream_core::{Panel, snapshot::Snapshot, store::RecordStore};
use serde::Serialize;

use crate::error::ApiError;

/// `GET /backup`
pub async fn export<S>(
  State(panel): State<Arc<Panel<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let snapshot = panel.export_snapshot(Utc::now()).await?;
  let disposition = format!("attachment; filename=\"{}\"", snapshot.file_name());
  Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(snapshot)))
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
  pub clients:   usize,
  pub purchases: usize,
  pub services:  usize,
  pub settings:  usize,
}

/// `POST /backup`
///
/// The body is taken as text so that unparseable input is reported as a
/// malformed snapshot rather than a generic extractor rejection.
pub async fn import<S>(
  State(panel): State<Arc<Panel<S>>>,
  body: String,
) -> Result<Json<ImportSummary>, ApiError>
where
  S: RecordStore + 'static,
{
  let snapshot = Snapshot::parse(&body)?;
  let [clients, purchases, services, settings] =
    panel.import_snapshot(snapshot).await?.map(|(_, n)| n);
  Ok(Json(ImportSummary { clients, purchases, services, settings }))
}

/// `DELETE /data`
pub async fn clear<S>(State(panel): State<Arc<Panel<S>>>) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  panel.clear_all().await?;
  Ok(StatusCode::NO_CONTENT)
}
