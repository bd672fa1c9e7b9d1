//! Handlers for `/kpis` endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kpi_core::{
  catalog::{KpiDefinition, NewKpi},
  roster::RosterSource,
  store::KpiStore,
};

use crate::{ApiState, Authenticated, auth::require_admin, error::ApiError};

/// `GET /kpis`
pub async fn list<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(_): Authenticated,
) -> Result<Json<Vec<KpiDefinition>>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let kpis = state.store.list_kpis().await.map_err(ApiError::store)?;
  Ok(Json(kpis))
}

/// `POST /kpis`: body: [`NewKpi`], e.g.
/// `{"description":"Ventas","kind":{"type":"numeric","ranges":[…]}}`
pub async fn create<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<NewKpi>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let kpi = state.store.add_kpi(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(kpi)))
}
