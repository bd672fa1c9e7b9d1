//! The `KpiStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `kpi-store-sqlite`).
//! Higher layers (`kpi-api`, `kpi-server`) depend on this abstraction, not on
//! any concrete backend.
//!
//! Every mutating method is a single atomic unit of work: it either commits
//! fully or leaves the store untouched.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  catalog::{
    Employee, EmployeeQuery, KpiDefinition, KpiKind, NewEmployee, NewKpi, NewPosition,
    Position,
  },
  error::DomainError,
  hierarchy::HierarchyGraph,
  period::{Capture, CaptureKey, Period},
  roster::{ReconcileReport, RosterCandidate},
  scope::{Actor, Scope},
  threshold::RawValue,
};

// ─── Request / response types ────────────────────────────────────────────────

/// Input to [`KpiStore::capture`].
#[derive(Debug, Clone)]
pub struct CaptureRequest {
  pub position_id: Uuid,
  pub kpi_id:      Uuid,
  pub period:      Period,
  pub value:       RawValue,
}

impl CaptureRequest {
  pub fn key(&self) -> CaptureKey {
    CaptureKey {
      position_id: self.position_id,
      kpi_id:      self.kpi_id,
      period:      self.period,
    }
  }
}

/// Result of [`KpiStore::open_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rollover {
  pub period:          Period,
  /// Open slots created for assignments that had none in `period`.
  pub opened:          usize,
  /// Slots of earlier periods that were still open and have been closed.
  pub closed_previous: usize,
}

/// One assigned KPI and its capture for the report's period.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
  pub kpi:          KpiDefinition,
  pub capture:      Option<Capture>,
  pub meets_target: Option<bool>,
}

impl ReportRow {
  pub fn new(kpi: KpiDefinition, capture: Option<Capture>) -> Self {
    let target = match &kpi.kind {
      KpiKind::Numeric { target, .. } => *target,
      KpiKind::Criterion => None,
    };
    let meets_target = capture
      .as_ref()
      .and_then(|c| c.value.as_ref())
      .and_then(|v| v.meets_target(target));
    Self { kpi, capture, meets_target }
  }
}

/// Every KPI assigned to a position with its capture for one period, ordered
/// by KPI description.
#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
  pub position: Position,
  pub period:   Period,
  pub rows:     Vec<ReportRow>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a KPI store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait KpiStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Positions ─────────────────────────────────────────────────────────

  /// Create a position. A supervisor, if given, must exist.
  fn add_position(
    &self,
    input: NewPosition,
  ) -> impl Future<Output = Result<Position, Self::Error>> + Send + '_;

  fn get_position(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Position>, Self::Error>> + Send + '_;

  /// All positions ordered by description.
  fn list_positions(
    &self,
  ) -> impl Future<Output = Result<Vec<Position>, Self::Error>> + Send + '_;

  /// Replace the KPI assignment set of a position, keeping the given order.
  /// Historical captures of removed KPIs are kept.
  fn assign_kpis(
    &self,
    position_id: Uuid,
    kpi_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Position, Self::Error>> + Send + '_;

  // ── KPI definitions ───────────────────────────────────────────────────

  fn add_kpi(
    &self,
    input: NewKpi,
  ) -> impl Future<Output = Result<KpiDefinition, Self::Error>> + Send + '_;

  fn get_kpi(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<KpiDefinition>, Self::Error>> + Send + '_;

  /// All KPI definitions ordered by description.
  fn list_kpis(
    &self,
  ) -> impl Future<Output = Result<Vec<KpiDefinition>, Self::Error>> + Send + '_;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Create an employee. The external id is normalised and must be unique.
  fn add_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  fn get_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Employees ordered by name, filtered and paginated by `query`.
  fn list_employees<'a>(
    &'a self,
    query: &'a EmployeeQuery,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + 'a;

  // ── Hierarchy ─────────────────────────────────────────────────────────

  /// Snapshot of the latest committed hierarchy.
  fn hierarchy(
    &self,
  ) -> impl Future<Output = Result<HierarchyGraph, Self::Error>> + Send + '_;

  /// Move an employee to a position, or unassign them with `None`.
  fn reassign_employee(
    &self,
    employee_id: Uuid,
    position_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Change the supervisor of a position. The cycle check and the edge
  /// write happen in one transaction; a rejected change writes nothing.
  fn reassign_supervisor(
    &self,
    position_id: Uuid,
    supervisor_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Position, Self::Error>> + Send + '_;

  /// The positions `actor` may see: their own and those up to `depth`
  /// levels below it. Always reflects the latest committed hierarchy.
  fn scope_for<'a>(
    &'a self,
    actor: &'a Actor,
    depth: usize,
  ) -> impl Future<Output = Result<Scope, Self::Error>> + Send + 'a;

  // ── Periods ───────────────────────────────────────────────────────────

  /// Make `period` the current open period. Idempotent: re-opening creates
  /// nothing new.
  fn open_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<Rollover, Self::Error>> + Send + '_;

  /// The most recently opened period, if any.
  fn current_period(
    &self,
  ) -> impl Future<Output = Result<Option<Period>, Self::Error>> + Send + '_;

  // ── Captures ──────────────────────────────────────────────────────────

  /// Record (or overwrite) a value in an open slot of the current period.
  fn capture(
    &self,
    request: CaptureRequest,
  ) -> impl Future<Output = Result<Capture, Self::Error>> + Send + '_;

  /// Close one slot, making it immutable. `closed_by` names the closing
  /// user.
  fn close(
    &self,
    key: CaptureKey,
    closed_by: Option<String>,
  ) -> impl Future<Output = Result<Capture, Self::Error>> + Send + '_;

  /// Close every open slot of a position in `period` and return the slots
  /// that were closed by this call.
  fn close_position_period(
    &self,
    position_id: Uuid,
    period: Period,
    closed_by: Option<String>,
  ) -> impl Future<Output = Result<Vec<Capture>, Self::Error>> + Send + '_;

  /// The capture view of a position for `period`.
  fn position_report(
    &self,
    position_id: Uuid,
    period: Period,
  ) -> impl Future<Output = Result<PositionReport, Self::Error>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  /// Create employees for candidates whose external id is not yet known.
  fn reconcile(
    &self,
    candidates: Vec<RosterCandidate>,
  ) -> impl Future<Output = Result<ReconcileReport, Self::Error>> + Send + '_;
}
