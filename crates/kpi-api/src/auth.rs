//! HTTP Basic authentication and scope checks.
//!
//! Every configured account maps a username to an argon2 PHC hash, a role and
//! (for members) the position the account occupies. Authorization is then a
//! matter of comparing the target position against the caller's [`Scope`],
//! served by the store from the committed hierarchy.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use kpi_core::{
  roster::RosterSource,
  scope::{Actor, Role, Scope},
  store::KpiStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// One login accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
  #[serde(default)]
  pub position_id:   Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

/// The verified caller of a handler.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Actor);

/// Verify Basic credentials against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Actor, ApiError> {
  let encoded = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = config
    .accounts
    .iter()
    .find(|a| a.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&account.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Actor {
    username:    account.username.clone(),
    role:        account.role,
    position_id: account.position_id,
  })
}

impl<S, R> FromRequestParts<ApiState<S, R>> for Authenticated
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, R>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth).map(Authenticated)
  }
}

// ─── Authorization ───────────────────────────────────────────────────────────

pub fn require_admin(actor: &Actor) -> Result<(), ApiError> {
  if actor.is_admin() {
    Ok(())
  } else {
    Err(ApiError::Forbidden(format!("{} is not an administrator", actor.username)))
  }
}

/// The positions `actor` may see, from the latest committed hierarchy.
pub async fn scope_of<S, R>(state: &ApiState<S, R>, actor: &Actor) -> Result<Scope, ApiError>
where
  S: KpiStore,
{
  state
    .store
    .scope_for(actor, state.scope_depth)
    .await
    .map_err(ApiError::store)
}

pub fn ensure_visible(scope: &Scope, position: Uuid) -> Result<(), ApiError> {
  if scope.permits(position) {
    Ok(())
  } else {
    Err(ApiError::Forbidden(format!("position {position} is outside your scope")))
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      accounts: vec![Account {
        username:      "ana".into(),
        password_hash: hash,
        role:          Role::Member,
        position_id:   Some(Uuid::nil()),
      }],
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_credentials_yield_actor() {
    let actor = verify_auth(&headers(&basic("ana", "secret")), &config("secret")).unwrap();
    assert_eq!(actor.username, "ana");
    assert_eq!(actor.role, Role::Member);
    assert_eq!(actor.position_id, Some(Uuid::nil()));
  }

  #[test]
  fn wrong_password_or_user_is_rejected() {
    let cfg = config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("ana", "wrong")), &cfg),
      Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
      verify_auth(&headers(&basic("bob", "secret")), &cfg),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_or_malformed_header_is_rejected() {
    let cfg = config("secret");
    assert!(matches!(verify_auth(&HeaderMap::new(), &cfg), Err(ApiError::Unauthorized)));
    assert!(matches!(
      verify_auth(&headers("Basic !!!not-base64!!!"), &cfg),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn members_are_not_admins() {
    let actor = Actor { username: "ana".into(), role: Role::Member, position_id: None };
    assert!(matches!(require_admin(&actor), Err(ApiError::Forbidden(_))));
  }
}
