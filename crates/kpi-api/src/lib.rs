//! JSON REST API for the KPI engine.
//!
//! Exposes an axum [`Router`] backed by any [`kpi_core::store::KpiStore`].
//! Every route requires HTTP Basic authentication; members only reach the
//! positions inside their scope, administrators reach everything.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kpi_api::api_router(state))
//! ```

pub mod auth;
pub mod captures;
pub mod employees;
pub mod error;
pub mod hierarchy;
pub mod kpis;
pub mod periods;
pub mod positions;
pub mod roster;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use kpi_core::{
  Error as CoreError,
  period::Period,
  roster::RosterSource,
  scope::ScopeResolver,
  store::KpiStore,
};

pub use auth::{Account, AuthConfig, Authenticated};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, R> {
  pub store:       Arc<S>,
  /// `None` when no roster feed is configured.
  pub roster:      Option<Arc<R>>,
  pub auth:        Arc<AuthConfig>,
  /// How many levels below their own position members can see.
  pub scope_depth: usize,
}

impl<S, R> ApiState<S, R> {
  pub fn new(store: Arc<S>, auth: AuthConfig) -> Self {
    Self {
      store,
      roster: None,
      auth: Arc::new(auth),
      scope_depth: ScopeResolver::DEFAULT_DEPTH,
    }
  }

  pub fn with_roster(mut self, roster: Arc<R>) -> Self {
    self.roster = Some(roster);
    self
  }

  pub fn with_scope_depth(mut self, depth: usize) -> Self {
    self.scope_depth = depth;
    self
  }
}

impl<S, R> Clone for ApiState<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:       self.store.clone(),
      roster:      self.roster.clone(),
      auth:        self.auth.clone(),
      scope_depth: self.scope_depth,
    }
  }
}

/// `period` if given, else the current open period.
pub(crate) async fn resolve_period<S, R>(
  state: &ApiState<S, R>,
  period: Option<Period>,
) -> Result<Period, ApiError>
where
  S: KpiStore,
{
  if let Some(p) = period {
    return Ok(p);
  }
  state
    .store
    .current_period()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::store(CoreError::PeriodNotOpen(Period::current())))
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(state: ApiState<S, R>) -> Router<()>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  Router::new()
    // Positions
    .route("/positions", get(positions::list::<S, R>).post(positions::create::<S, R>))
    .route("/positions/{id}", get(positions::get_one::<S, R>))
    .route("/positions/{id}/ancestors", get(positions::ancestors::<S, R>))
    .route("/positions/{id}/kpis", put(positions::assign_kpis::<S, R>))
    .route("/positions/{id}/supervisor", put(positions::set_supervisor::<S, R>))
    .route("/positions/{id}/report", get(positions::report::<S, R>))
    .route("/positions/{id}/close", post(positions::close_period::<S, R>))
    // KPI definitions
    .route("/kpis", get(kpis::list::<S, R>).post(kpis::create::<S, R>))
    // Employees
    .route("/employees", get(employees::list::<S, R>).post(employees::create::<S, R>))
    .route("/employees/{id}/position", put(employees::reassign::<S, R>))
    // Hierarchy
    .route("/hierarchy", get(hierarchy::tree::<S, R>))
    .route("/scope", get(hierarchy::scope::<S, R>))
    // Captures
    .route("/captures", post(captures::capture::<S, R>))
    .route("/captures/close", post(captures::close::<S, R>))
    // Periods
    .route("/periods", post(periods::open::<S, R>))
    .route("/periods/current", get(periods::current::<S, R>))
    // Roster
    .route("/roster/reconcile", post(roster::reconcile::<S, R>))
    .with_state(state)
}
