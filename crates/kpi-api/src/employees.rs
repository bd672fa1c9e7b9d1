//! Handlers for `/employees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees` | `?text=&limit=&offset=`; members see their scope |
//! | `POST` | `/employees` | Admin. Body: [`NewEmployee`] |
//! | `PUT`  | `/employees/{id}/position` | Body: `{"position_id":…}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use kpi_core::{
  catalog::{Employee, EmployeeQuery, NewEmployee},
  roster::RosterSource,
  scope::Scope,
  store::KpiStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, Authenticated,
  auth::{require_admin, scope_of},
  error::ApiError,
};

/// `GET /employees[?text=…&limit=…&offset=…]`
pub async fn list<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Query(mut query): Query<EmployeeQuery>,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  query.positions = match scope_of(&state, &actor).await? {
    Scope::All => None,
    Scope::Positions(set) => Some(set),
  };
  let employees = state
    .store
    .list_employees(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(employees))
}

/// `POST /employees`
pub async fn create<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Json(body): Json<NewEmployee>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  require_admin(&actor)?;
  let employee = state.store.add_employee(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(employee)))
}

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
  #[serde(default)]
  pub position_id: Option<Uuid>,
}

/// `PUT /employees/{id}/position`: `null` leaves the employee unassigned.
///
/// Members must see both the employee's current position and the target;
/// unassigning is reserved to administrators.
pub async fn reassign<S, R>(
  State(state): State<ApiState<S, R>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<ReassignBody>,
) -> Result<Json<Employee>, ApiError>
where
  S: KpiStore + 'static,
  R: RosterSource + 'static,
{
  let current = state
    .store
    .get_employee(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("employee {id} not found")))?;

  let scope = scope_of(&state, &actor).await?;
  if !scope.permits_optional(current.position_id) || !scope.permits_optional(body.position_id) {
    return Err(ApiError::Forbidden(format!(
      "moving employee {id} requires both positions to be in your scope"
    )));
  }

  let employee = state
    .store
    .reassign_employee(id, body.position_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(employee))
}
