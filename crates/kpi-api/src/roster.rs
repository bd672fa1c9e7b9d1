//! `POST /roster/reconcile`: one-way import from the roster feed.
//!
//! An unconfigured or unreachable feed answers `200` with
//! `{"status":"source_unavailable",…}`; nothing is written in that case.

use axum::{Json, extract::State};
use kpi_core::{
  roster::{self, RosterSource, RosterStatus},
  store::KpiStore,
};

use crate::{ApiState, Authenticated, auth::require_admin, error::ApiError};

pub async fn reconcile<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<RosterStatus>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let status = roster::reconcile_from(state.store.as_ref(), state.roster.as_deref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(status))
}
