//! Handlers for the org chart and the caller's scope.

use axum::{Json, extract::State};
use kpi_core::{
  hierarchy::OrgNode,
  roster::RosterSource,
  scope::{Actor, Scope},
  store::KpiStore,
};
use serde::Serialize;

use crate::{ApiState, Authenticated, auth::scope_of, error::ApiError};

/// `GET /hierarchy`: one tree per root position.
pub async fn tree<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(_): Authenticated,
) -> Result<Json<Vec<OrgNode>>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let graph = state.store.hierarchy().await.map_err(ApiError::store)?;
  Ok(Json(graph.tree()))
}

#[derive(Debug, Serialize)]
pub struct ScopeView {
  pub actor: Actor,
  pub depth: usize,
  pub scope: Scope,
}

/// `GET /scope`
pub async fn scope<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<ScopeView>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let scope = scope_of(&state, &actor).await?;
  Ok(Json(ScopeView { actor, depth: state.scope_depth, scope }))
}
