//! Handlers for `/purchases` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/purchases` | Optional `q`, `service`, `status`, `start`, `end`; newest first |
//! | `POST`   | `/purchases` | Body: [`NewPurchase`]; one purchase per service, returns 201 |
//! | `GET`    | `/purchases/{id}` | 404 if not found |
//! | `DELETE` | `/purchases/{id}` | Always 204 |
//! | `POST`   | `/purchases/{id}/renew` | Returns 201 + the new purchase |

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
  panel::PurchaseView,
  purchase::{NewPurchase, Purchase},
  repo::PurchaseFilter,
  store::RecordStore,
};

use crate::error::ApiError;

/// `GET /purchases[?q=...][&service=...][&status=...][&start=YYYY-MM-DD][&end=YYYY-MM-DD]`
pub async fn list<S>(
  State(panel): State<Arc<Panel<S>>>,
  Query(filter): Query<PurchaseFilter>,
) -> Result<Json<Vec<PurchaseView>>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(panel.purchase_views(&filter, Utc::now()).await?))
}

/// `POST /purchases`
pub async fn create<S>(
  State(panel): State<Arc<Panel<S>>>,
  Json(body): Json<NewPurchase>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let created = panel.record_purchase(body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /purchases/{id}`
pub async fn get_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Purchase>, ApiError>
where
  S: RecordStore + 'static,
{
  let purchase = panel
    .purchases()
    .get(&id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("purchase {id} not found")))?;
  Ok(Json(purchase))
}

/// `DELETE /purchases/{id}`
pub async fn delete_one<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  panel.purchases().delete(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /purchases/{id}/renew`
pub async fn renew<S>(
  State(panel): State<Arc<Panel<S>>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let renewed = panel.renew_purchase(&id, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(renewed)))
}
