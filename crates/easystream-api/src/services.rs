//! Handlers for `/services` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/services` | Optional `?q=<text>` or `?code=<code>` |
//! | `POST`   | `/services` | Body: [`NewService`]; returns 201 |
//! | `GET`    | `/services/{id}` | 404 if not found |
//! | `PUT`    | `/services/{id}` | Body: full service |
//! | `DELETE` | `/services/{id}` | 409 while purchases reference the code |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use easystream_core::{
  Panel,
  service::{NewService, Service},
  store::RecordStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q:    Option<String>,
  /// Exact code lookup; takes precedence over `q`.
  pub code: Option<String>,
}

/// `GET /services[?q=...|?code=...]`, sorted by name.
pub async fn list<S>(
  State(panel): State<Arc<Panel<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Service>>, ApiError>
where
  S: RecordStore + 'static,
{
  let repo = panel.services();
  let mut services = match (params.code, params.q) {
    (Some(code), _) => repo.find_by_code(&code).await?.into_iter().collect(),
    (None, Some(q)) => repo.search(&q).await?,
    (None, None) => repo.get_all().await?,
  };
  services.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(Json(services))
}

/// `POST /services`
pub async fn create<S>(
  State(panel): State<Arc<Panel<S>>>,
  Json(body): Json<NewService>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let service = panel.services().add_new(body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(service)))
}

/// `GET /services/{id}`
pub async fn get_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Service>, ApiError>
where
  S: RecordStore + 'static,
{
  let service = panel
    .services()
    .get(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("service {id} not found")))?;
  Ok(Json(service))
}

/// `PUT /services/{id}`
pub async fn update<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
  Json(body): Json<Service>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  if body.id != id {
    return Err(ApiError::BadRequest(format!(
      "body id {:?} does not match path id {id:?}",
      body.id
    )));
  }
  panel.services().update(body).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /services/{id}`
pub async fn delete_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  panel.delete_service(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
