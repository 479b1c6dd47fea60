//! HTTP Basic-auth extractor, middleware and password hashing.
//!
//! The expected password hash is looked up per request: a hash stored in the
//! `password_hash` setting wins over the one in the configuration file. With
//! neither present the panel is served without authentication.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, Request},
  http::{HeaderMap, request::Parts},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use easystream_core::store::RecordStore;
use rand_core::OsRng;

use crate::{AppState, error::Error};

/// Credentials taken from the server configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: Option<String>,
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Verify Basic credentials in `headers` against `username` and `password_hash`.
pub fn verify_auth(
  headers: &HeaderMap,
  username: &str,
  password_hash: &str,
) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (given_user, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if given_user != username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

/// The hash requests are checked against, if any.
pub async fn expected_hash<S>(state: &AppState<S>) -> Result<Option<String>, Error>
where
  S: RecordStore + 'static,
{
  if let Some(stored) = state.panel.settings().password_hash().await? {
    return Ok(Some(stored));
  }
  Ok(state.auth.password_hash.clone())
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RecordStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(hash) = expected_hash(state).await? {
      verify_auth(&parts.headers, &state.auth.username, &hash)?;
    }
    Ok(Authenticated)
  }
}

/// Middleware guarding the API routes.
pub async fn require_auth(_auth: Authenticated, request: Request, next: Next) -> Response {
  next.run(request).await
}
