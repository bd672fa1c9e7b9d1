//! Handlers for `/positions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/positions` | Members see only their scope |
//! | `POST` | `/positions` | Admin. Body: [`NewPosition`] |
//! | `GET`  | `/positions/{id}` | 404 if not found |
//! | `GET`  | `/positions/{id}/ancestors` | Nearest supervisor first |
//! | `PUT`  | `/positions/{id}/kpis` | Admin. Body: `{"kpi_ids":[…]}` |
//! | `PUT`  | `/positions/{id}/supervisor` | Admin. Body: `{"supervisor_id":…}` |
//! | `GET`  | `/positions/{id}/report` | Optional `?period=YYYY-MM` |
//! | `POST` | `/positions/{id}/close` | Optional `?period=YYYY-MM` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use kpi_core::{
  catalog::{NewPosition, Position},
  period::{Capture, Period},
  roster::RosterSource,
  store::{KpiStore, PositionReport},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState, Authenticated,
  auth::{ensure_visible, require_admin, scope_of},
  error::ApiError,
  resolve_period,
};

// ─── List / create / get ─────────────────────────────────────────────────────

/// `GET /positions`
pub async fn list<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<Position>>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let scope = scope_of(&state, &actor).await?;
  let positions = state
    .store
    .list_positions()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .filter(|p| scope.permits(p.position_id))
    .collect();
  Ok(Json(positions))
}

/// `POST /positions`
pub async fn create<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<NewPosition>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let position = state.store.add_position(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(position)))
}

/// `GET /positions/{id}`
pub async fn get_one<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Position>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, id)?;
  let position = state
    .store
    .get_position(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("position {id} not found")))?;
  Ok(Json(position))
}

// ─── Hierarchy edges ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Ancestors {
  pub position_id: Uuid,
  /// Nearest supervisor first, ending at a root.
  pub ancestors:   Vec<Uuid>,
}

/// `GET /positions/{id}/ancestors`
pub async fn ancestors<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Ancestors>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, id)?;
  let graph = state.store.hierarchy().await.map_err(ApiError::store)?;
  let ancestors = graph.ancestors_of(id).map_err(ApiError::store)?;
  Ok(Json(Ancestors { position_id: id, ancestors }))
}

#[derive(Debug, Deserialize)]
pub struct SupervisorBody {
  #[serde(default)]
  pub supervisor_id: Option<Uuid>,
}

/// `PUT /positions/{id}/supervisor`: `null` makes the position a root.
pub async fn set_supervisor<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<SupervisorBody>,
) -> Result<Json<Position>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let position = state
    .store
    .reassign_supervisor(id, body.supervisor_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(position))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub kpi_ids: Vec<Uuid>,
}

/// `PUT /positions/{id}/kpis`
pub async fn assign_kpis<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Position>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let position = state
    .store
    .assign_kpis(id, body.kpi_ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(position))
}

// ─── Period views ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
  pub period: Option<Period>,
}

/// `GET /positions/{id}/report[?period=YYYY-MM]`
pub async fn report<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<PositionReport>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, id)?;
  let period = resolve_period(&state, params.period).await?;
  let report = state
    .store
    .position_report(id, period)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(report))
}

/// `POST /positions/{id}/close[?period=YYYY-MM]`: closes every open slot.
pub async fn close_period<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  Query(params): Query<PeriodParams>,
) -> Result<Json<Vec<Capture>>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  ensure_visible(&scope_of(&state, &actor).await?, id)?;
  let period = resolve_period(&state, params.period).await?;
  let closed = state
    .store
    .close_position_period(id, period, Some(actor.username))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(closed))
}
