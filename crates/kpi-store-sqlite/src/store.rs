//! [`SqliteStore`]: the SQLite implementation of [`KpiStore`].

use std::{
  path::Path,
  sync::{Arc, Mutex},
};

use kpi_core::{
  catalog::{Employee, EmployeeQuery, KpiDefinition, NewEmployee, NewKpi, NewPosition, Position},
  hierarchy::HierarchyGraph,
  period::{Capture, CaptureKey, Period},
  roster::{ReconcileReport, RosterCandidate},
  scope::{Actor, Scope, ScopeResolver},
  store::{CaptureRequest, KpiStore, PositionReport, Rollover},
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{Result, ops, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A KPI store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and the scope memo are
/// reference-counted. The memo is only touched on the connection thread, inside
/// the same unit of work as the hierarchy writes that invalidate it.
#[derive(Clone)]
pub struct SqliteStore {
  conn:              tokio_rusqlite::Connection,
  pub(crate) scopes: Arc<Mutex<ScopeResolver>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self::with_connection(conn);
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self::with_connection(conn);
    store.init_schema().await?;
    Ok(store)
  }

  fn with_connection(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn, scopes: Arc::new(Mutex::new(ScopeResolver::new())) }
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `op` on the connection thread. The outer error is a connection
  /// failure; the inner one is whatever `op` reports.
  async fn run<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(op(conn))).await?
  }
}

// ─── KpiStore impl ───────────────────────────────────────────────────────────

impl KpiStore for SqliteStore {
  type Error = crate::Error;

  // ── Positions ─────────────────────────────────────────────────────────────

  async fn add_position(&self, input: NewPosition) -> Result<Position> {
    let scopes = self.scopes.clone();
    self.run(move |conn| ops::add_position(conn, &scopes, input)).await
  }

  async fn get_position(&self, id: Uuid) -> Result<Option<Position>> {
    self.run(move |conn| ops::load_position(conn, id)).await
  }

  async fn list_positions(&self) -> Result<Vec<Position>> {
    self.run(|conn| ops::load_positions(conn)).await
  }

  async fn assign_kpis(&self, position_id: Uuid, kpi_ids: Vec<Uuid>) -> Result<Position> {
    self
      .run(move |conn| ops::assign_kpis(conn, position_id, kpi_ids))
      .await
  }

  // ── KPI definitions ───────────────────────────────────────────────────────

  async fn add_kpi(&self, input: NewKpi) -> Result<KpiDefinition> {
    self.run(move |conn| ops::add_kpi(conn, input)).await
  }

  async fn get_kpi(&self, id: Uuid) -> Result<Option<KpiDefinition>> {
    self.run(move |conn| ops::load_kpi(conn, id)).await
  }

  async fn list_kpis(&self) -> Result<Vec<KpiDefinition>> {
    self.run(|conn| ops::load_kpis(conn)).await
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
    self.run(move |conn| ops::add_employee(conn, input)).await
  }

  async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>> {
    self.run(move |conn| ops::load_employee(conn, id)).await
  }

  async fn list_employees<'a>(&'a self, query: &'a EmployeeQuery) -> Result<Vec<Employee>> {
    let query = query.clone();
    self.run(move |conn| ops::load_employees(conn, &query)).await
  }

  // ── Hierarchy ─────────────────────────────────────────────────────────────

  async fn hierarchy(&self) -> Result<HierarchyGraph> {
    self.run(|conn| ops::hierarchy(conn)).await
  }

  async fn reassign_employee(
    &self,
    employee_id: Uuid,
    position_id: Option<Uuid>,
  ) -> Result<Employee> {
    let scopes = self.scopes.clone();
    self
      .run(move |conn| ops::reassign_employee(conn, &scopes, employee_id, position_id))
      .await
  }

  async fn reassign_supervisor(
    &self,
    position_id: Uuid,
    supervisor_id: Option<Uuid>,
  ) -> Result<Position> {
    let scopes = self.scopes.clone();
    self
      .run(move |conn| ops::reassign_supervisor(conn, &scopes, position_id, supervisor_id))
      .await
  }

  async fn scope_for<'a>(&'a self, actor: &'a Actor, depth: usize) -> Result<Scope> {
    let scopes = self.scopes.clone();
    let actor = actor.clone();
    self
      .run(move |conn| ops::scope_for(conn, &scopes, &actor, depth))
      .await
  }

  // ── Periods ───────────────────────────────────────────────────────────────

  async fn open_period(&self, period: Period) -> Result<Rollover> {
    self.run(move |conn| ops::open_period(conn, period)).await
  }

  async fn current_period(&self) -> Result<Option<Period>> {
    self.run(|conn| ops::current(conn)).await
  }

  // ── Captures ──────────────────────────────────────────────────────────────

  async fn capture(&self, request: CaptureRequest) -> Result<Capture> {
    self.run(move |conn| ops::capture(conn, request)).await
  }

  async fn close(&self, key: CaptureKey, closed_by: Option<String>) -> Result<Capture> {
    self.run(move |conn| ops::close(conn, key, closed_by.as_deref())).await
  }

  async fn close_position_period(
    &self,
    position_id: Uuid,
    period: Period,
    closed_by: Option<String>,
  ) -> Result<Vec<Capture>> {
    self
      .run(move |conn| {
        ops::close_position_period(conn, position_id, period, closed_by.as_deref())
      })
      .await
  }

  async fn position_report(&self, position_id: Uuid, period: Period) -> Result<PositionReport> {
    self
      .run(move |conn| ops::position_report(conn, position_id, period))
      .await
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn reconcile(&self, candidates: Vec<RosterCandidate>) -> Result<ReconcileReport> {
    self.run(move |conn| ops::reconcile(conn, candidates)).await
  }
}
