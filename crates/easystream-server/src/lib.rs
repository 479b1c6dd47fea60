//! HTTP server for the EasyStream panel.
//!
//! Mounts the JSON API from `easystream-api` under `/api` behind Basic
//! authentication and adds an unauthenticated `/health` check.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use easystream_api::api_router;
use easystream_core::{Panel, store::RecordStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `easystream.toml` and
/// `EASYSTREAM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_username")]
  pub auth_username:      String,
  #[serde(default)]
  pub auth_password_hash: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("easystream.db") }
fn default_username() -> String { "admin".to_owned() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      store_path:         default_store_path(),
      auth_username:      default_username(),
      auth_password_hash: None,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state for the auth layer.
pub struct AppState<S> {
  pub panel:  Arc<Panel<S>>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      panel:  Arc::clone(&self.panel),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

impl<S> AppState<S> {
  pub fn new(panel: Arc<Panel<S>>, config: ServerConfig) -> Self {
    let auth = AuthConfig {
      username:      config.auth_username.clone(),
      password_hash: config.auth_password_hash.clone(),
    };
    Self { panel, config: Arc::new(config), auth: Arc::new(auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + 'static,
{
  let api = api_router(Arc::clone(&state.panel))
    .layer(middleware::from_fn_with_state(state, require_auth));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
