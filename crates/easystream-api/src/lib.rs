//! JSON REST API for EasyStream.
//!
//! Exposes an axum [`Router`] backed by a [`Panel`] over any
//! [`RecordStore`]. Authentication is left to the embedding server.
//!
//! Handlers sample the wall clock once per request and pass it down as the
//! reference instant.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", easystream_api::api_router(panel.clone()))
//! ```

pub mod backup;
pub mod clients;
pub mod error;
pub mod purchases;
pub mod reports;
pub mod services;
pub mod settings;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use easystream_core::{Panel, store::RecordStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `panel`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(panel: Arc<Panel<S>>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Clients
    .route("/clients", get(clients::list::<S>).post(clients::create::<S>))
    .route(
      "/clients/{id}",
      get(clients::get_one::<S>)
        .put(clients::update::<S>)
        .delete(clients::delete_one::<S>),
    )
    .route("/clients/{id}/purchases", get(clients::purchases::<S>))
    // Services
    .route("/services", get(services::list::<S>).post(services::create::<S>))
    .route(
      "/services/{id}",
      get(services::get_one::<S>)
        .put(services::update::<S>)
        .delete(services::delete_one::<S>),
    )
    // Purchases
    .route("/purchases", get(purchases::list::<S>).post(purchases::create::<S>))
    .route(
      "/purchases/{id}",
      get(purchases::get_one::<S>).delete(purchases::delete_one::<S>),
    )
    .route("/purchases/{id}/renew", post(purchases::renew::<S>))
    // Settings
    .route(
      "/settings/{key}",
      get(settings::get_one::<S>).put(settings::put_one::<S>),
    )
    // Views
    .route("/dashboard", get(reports::dashboard::<S>))
    .route("/reports/monthly", get(reports::monthly::<S>))
    .route("/alerts/expiring", get(reports::expiring::<S>))
    // Bulk transfer
    .route("/backup", get(backup::export::<S>).post(backup::import::<S>))
    .route("/data", delete(backup::clear::<S>))
    .with_state(panel)
}

#[cfg(test)]
mod tests;
