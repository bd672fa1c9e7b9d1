//! Handlers for `/captures` endpoints.
//!
//! A missing `period` means the current open period.

use axum::{Json, extract::State};
use kpi_core::{
  period::{Capture, CaptureKey, Period},
  roster::RosterSource,
  store::{CaptureRequest, KpiStore},
  threshold::RawValue,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, Authenticated,
  auth::{ensure_visible, scope_of},
  error::ApiError,
  resolve_period,
};

#[derive(Debug, Deserialize)]
pub struct CaptureBody {
  pub position_id: Uuid,
  pub kpi_id:      Uuid,
  #[serde(default)]
  pub period:      Option<Period>,
  /// A number, or a string (parsed for numeric KPIs, kept for criteria).
  pub value:       RawValue,
}

/// `POST /captures`
pub async fn capture<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<CaptureBody>,
) -> Result<Json<Capture>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, body.position_id)?;
  let period = resolve_period(&state, body.period).await?;
  let capture = state
    .store
    .capture(CaptureRequest {
      position_id: body.position_id,
      kpi_id: body.kpi_id,
      period,
      value: body.value,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(capture))
}

#[derive(Debug, Deserialize)]
pub struct CloseBody {
  pub position_id: Uuid,
  pub kpi_id:      Uuid,
  #[serde(default)]
  pub period:      Option<Period>,
}

/// `POST /captures/close`
pub async fn close<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<CloseBody>,
) -> Result<Json<Capture>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, body.position_id)?;
  let period = resolve_period(&state, body.period).await?;
  let key = CaptureKey { position_id: body.position_id, kpi_id: body.kpi_id, period };
  let capture = state.store.close(key, Some(actor.username)).await.map_err(ApiError::store)?;
  Ok(Json(capture))
}
