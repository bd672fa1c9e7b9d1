//! Handlers for `/periods` endpoints.

use axum::{Json, extract::State};
use kpi_core::{
  period::Period,
  roster::RosterSource,
  store::{KpiStore, Rollover},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, Authenticated, auth::require_admin, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CurrentPeriod {
  pub period: Option<Period>,
}

/// `GET /periods/current`: `{"period": null}` before the first rollover.
pub async fn current<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(_): Authenticated,
) -> Result<Json<CurrentPeriod>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let period = state.store.current_period().await.map_err(ApiError::store)?;
  Ok(Json(CurrentPeriod { period }))
}

#[derive(Debug, Deserialize)]
pub struct OpenBody {
  pub period: Period,
}

/// `POST /periods`: body: `{"period":"2024-05"}`. Idempotent.
pub async fn open<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<OpenBody>,
) -> Result<Json<Rollover>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let rollover = state
    .store
    .open_period(body.period)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rollover))
}
