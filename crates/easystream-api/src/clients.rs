//! Handlers for `/clients` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/clients` | Optional `?q=<text>` and `?status=active\|inactive\|all` |
//! | `POST`   | `/clients` | Body: [`NewClient`]; returns 201 + stored client |
//! | `GET`    | `/clients/{id}` | 404 if not found |
//! | `PUT`    | `/clients/{id}` | Body: full client; purchase cache is preserved |
//! | `DELETE` | `/clients/{id}` | Optional `?cascade=true` |
//! | `GET`    | `/clients/{id}/purchases` | Purchases owned by the client |

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
  client::{Client, ClientStatus, NewClient},
  panel::ClientDeletion,
  purchase::Purchase,
  repo::Filter,
  store::RecordStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Case-insensitive substring over name and WhatsApp number.
  pub q:      Option<String>,
  #[serde(default)]
  pub status: Filter<ClientStatus>,
}

/// `GET /clients[?q=...][&status=...]`, sorted by name.
pub async fn list<S>(
  State(panel): State<Arc<Panel<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Client>>, ApiError>
where
  S: RecordStore + 'static,
{
  let repo = panel.clients();
  let mut clients = repo.list_by_status(params.status).await?;
  if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
    clients.retain(|c| c.matches_text(q));
  }
  clients.sort_by_key(|c| c.name.to_lowercase());
  Ok(Json(clients))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /clients`
pub async fn create<S>(
  State(panel): State<Arc<Panel<S>>>,
  Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let client = panel.register_client(body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(client)))
}

// ─── Get / update / delete ───────────────────────────────────────────────────

/// `GET /clients/{id}`
pub async fn get_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Client>, ApiError>
where
  S: RecordStore + 'static,
{
  let client = panel
    .clients()
    .get(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("client {id} not found")))?;
  Ok(Json(client))
}

/// `PUT /clients/{id}`
pub async fn update<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
  Json(body): Json<Client>,
) -> Result<Json<Client>, ApiError>
where
  S: RecordStore + 'static,
{
  if body.id != id {
    return Err(ApiError::BadRequest(format!(
      "body id {:?} does not match path id {id:?}",
      body.id
    )));
  }
  Ok(Json(panel.update_client(body).await?))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub cascade: bool,
}

/// `DELETE /clients/{id}[?cascade=true]`
pub async fn delete_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<ClientDeletion>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(panel.delete_client(&id, params.cascade).await?))
}

/// `GET /clients/{id}/purchases`, newest first.
pub async fn purchases<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Purchase>>, ApiError>
where
  S: RecordStore + 'static,
{
  let mut purchases = panel.purchases().list_by_client(&id).await?;
  purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
  Ok(Json(purchases))
}
