//! Synchronous store operations run on the `tokio_rusqlite` connection thread.
//!
//! Each public function is one unit of work. Mutations open an `IMMEDIATE`
//! transaction so that the reads they validate against and the writes they
//! perform are serialised against every other writer; dropping the
//! transaction on an error path rolls everything back.

use std::{
  collections::{BTreeMap, BTreeSet, HashMap, HashSet},
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use kpi_core::{
  Error as CoreError,
  catalog::{Employee, EmployeeQuery, KpiDefinition, NewEmployee, NewKpi, NewPosition, Position},
  hierarchy::HierarchyGraph,
  period::{Capture, CaptureKey, Period, PeriodState, Slot},
  reassign::Organization,
  roster::{self, ReconcileReport, RosterCandidate},
  scope::{Actor, Scope, ScopeResolver},
  store::{CaptureRequest, PositionReport, ReportRow, Rollover},
  threshold::Color,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, types::Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CAPTURE_COLUMNS, EMPLOYEE_COLUMNS, KPI_COLUMNS, POSITION_COLUMNS, RawCapture, RawEmployee,
    RawKpi, RawPosition, decode_period, decode_uuid, encode_dt, encode_kind, encode_period,
    encode_uuid, encode_value,
  },
};

fn write_tx(conn: &mut Connection) -> Result<rusqlite::Transaction<'_>> {
  Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// A poisoned memo may be half-written, so it is dropped rather than trusted.
fn lock(scopes: &Mutex<ScopeResolver>) -> MutexGuard<'_, ScopeResolver> {
  scopes.lock().unwrap_or_else(|poisoned| {
    let mut guard = poisoned.into_inner();
    guard.invalidate();
    guard
  })
}

// ─── Loaders ─────────────────────────────────────────────────────────────────

fn kpi_ids_of(conn: &Connection, position_id: &str) -> Result<Vec<Uuid>> {
  let mut stmt = conn.prepare_cached(
    "SELECT kpi_id FROM position_kpis WHERE position_id = ?1 ORDER BY ordinal",
  )?;
  let ids = stmt
    .query_map([position_id], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  ids.iter().map(|s| decode_uuid(s)).collect()
}

pub fn load_position(conn: &Connection, id: Uuid) -> Result<Option<Position>> {
  let id_str = encode_uuid(id);
  let raw = conn
    .query_row(
      &format!("SELECT {POSITION_COLUMNS} FROM positions WHERE position_id = ?1"),
      [&id_str],
      RawPosition::from_row,
    )
    .optional()?;
  match raw {
    Some(raw) => Ok(Some(raw.into_position(kpi_ids_of(conn, &id_str)?)?)),
    None => Ok(None),
  }
}

fn require_position(conn: &Connection, id: Uuid) -> Result<Position> {
  load_position(conn, id)?.ok_or_else(|| CoreError::PositionNotFound(id).into())
}

pub fn load_positions(conn: &Connection) -> Result<Vec<Position>> {
  let raws = conn
    .prepare(&format!(
      "SELECT {POSITION_COLUMNS} FROM positions ORDER BY description, created_at"
    ))?
    .query_map([], RawPosition::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut assignments: HashMap<String, Vec<Uuid>> = HashMap::new();
  let mut stmt =
    conn.prepare("SELECT position_id, kpi_id FROM position_kpis ORDER BY position_id, ordinal")?;
  let rows = stmt
    .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  for (position_id, kpi_id) in rows {
    assignments
      .entry(position_id)
      .or_default()
      .push(decode_uuid(&kpi_id)?);
  }

  raws
    .into_iter()
    .map(|raw| {
      let kpi_ids = assignments.remove(&raw.position_id).unwrap_or_default();
      raw.into_position(kpi_ids)
    })
    .collect()
}

pub fn load_kpi(conn: &Connection, id: Uuid) -> Result<Option<KpiDefinition>> {
  conn
    .query_row(
      &format!("SELECT {KPI_COLUMNS} FROM kpis WHERE kpi_id = ?1"),
      [encode_uuid(id)],
      RawKpi::from_row,
    )
    .optional()?
    .map(RawKpi::into_kpi)
    .transpose()
}

fn require_kpi(conn: &Connection, id: Uuid) -> Result<KpiDefinition> {
  load_kpi(conn, id)?.ok_or_else(|| CoreError::KpiNotFound(id).into())
}

pub fn load_kpis(conn: &Connection) -> Result<Vec<KpiDefinition>> {
  conn
    .prepare(&format!(
      "SELECT {KPI_COLUMNS} FROM kpis ORDER BY description, created_at"
    ))?
    .query_map([], RawKpi::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawKpi::into_kpi)
    .collect()
}

pub fn load_employee(conn: &Connection, id: Uuid) -> Result<Option<Employee>> {
  conn
    .query_row(
      &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"),
      [encode_uuid(id)],
      RawEmployee::from_row,
    )
    .optional()?
    .map(RawEmployee::into_employee)
    .transpose()
}

pub fn load_employees(conn: &Connection, query: &EmployeeQuery) -> Result<Vec<Employee>> {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    params.push(Value::Text(format!("%{text}%")));
    let n = params.len();
    conds.push(format!("(name LIKE ?{n} OR external_id LIKE ?{n})"));
  }
  if let Some(positions) = &query.positions {
    if positions.is_empty() {
      return Ok(Vec::new());
    }
    let mut placeholders = Vec::with_capacity(positions.len());
    for p in positions {
      params.push(Value::Text(encode_uuid(*p)));
      placeholders.push(format!("?{}", params.len()));
    }
    conds.push(format!("position_id IN ({})", placeholders.join(", ")));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  params.push(Value::Integer(
    query.limit.unwrap_or(EmployeeQuery::DEFAULT_LIMIT) as i64,
  ));
  let limit_idx = params.len();
  params.push(Value::Integer(query.offset.unwrap_or(0) as i64));
  let offset_idx = params.len();

  let sql = format!(
    "SELECT {EMPLOYEE_COLUMNS} FROM employees {where_clause}
     ORDER BY name, external_id
     LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
  );

  conn
    .prepare(&sql)?
    .query_map(rusqlite::params_from_iter(params.iter()), RawEmployee::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawEmployee::into_employee)
    .collect()
}

fn load_all_employees(conn: &Connection) -> Result<Vec<Employee>> {
  conn
    .prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees"))?
    .query_map([], RawEmployee::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawEmployee::into_employee)
    .collect()
}

pub fn load_graph(conn: &Connection) -> Result<HierarchyGraph> {
  let positions = load_positions(conn)?;
  let employees = load_all_employees(conn)?;
  Ok(HierarchyGraph::from_rows(&positions, &employees))
}

fn load_capture(conn: &Connection, key: CaptureKey) -> Result<Option<Capture>> {
  conn
    .query_row(
      &format!(
        "SELECT {CAPTURE_COLUMNS} FROM captures
         WHERE position_id = ?1 AND kpi_id = ?2 AND period = ?3"
      ),
      rusqlite::params![
        encode_uuid(key.position_id),
        encode_uuid(key.kpi_id),
        encode_period(key.period),
      ],
      RawCapture::from_row,
    )
    .optional()?
    .map(RawCapture::into_capture)
    .transpose()
}

fn load_position_captures(
  conn: &Connection,
  position_id: Uuid,
  period: Period,
) -> Result<Vec<Capture>> {
  conn
    .prepare(&format!(
      "SELECT {CAPTURE_COLUMNS} FROM captures WHERE position_id = ?1 AND period = ?2"
    ))?
    .query_map(
      rusqlite::params![encode_uuid(position_id), encode_period(period)],
      RawCapture::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawCapture::into_capture)
    .collect()
}

pub fn current_period(conn: &Connection) -> Result<Option<Period>> {
  let max: Option<String> =
    conn.query_row("SELECT MAX(period) FROM periods", [], |r| r.get(0))?;
  max.as_deref().map(decode_period).transpose()
}

fn upsert_capture(conn: &Connection, capture: &Capture) -> Result<()> {
  let (value_num, value_text) = encode_value(capture.value.as_ref());
  conn.execute(
    "INSERT INTO captures (
       position_id, kpi_id, period, value_num, value_text,
       color, state, captured_at, closed_at, closed_by
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
     ON CONFLICT (position_id, kpi_id, period) DO UPDATE SET
       value_num   = excluded.value_num,
       value_text  = excluded.value_text,
       color       = excluded.color,
       state       = excluded.state,
       captured_at = excluded.captured_at,
       closed_at   = excluded.closed_at,
       closed_by   = excluded.closed_by",
    rusqlite::params![
      encode_uuid(capture.position_id),
      encode_uuid(capture.kpi_id),
      encode_period(capture.period),
      value_num,
      value_text,
      capture.color.as_ref(),
      capture.state.as_ref(),
      capture.captured_at.map(encode_dt),
      capture.closed_at.map(encode_dt),
      capture.closed_by.as_deref(),
    ],
  )?;
  Ok(())
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub fn add_position(
  conn: &mut Connection,
  scopes: &Mutex<ScopeResolver>,
  input: NewPosition,
) -> Result<Position> {
  let description = input.description.trim().to_owned();
  if description.is_empty() {
    return Err(CoreError::InvalidInput("position description is empty".into()).into());
  }

  let tx = write_tx(conn)?;
  let mut scopes = lock(scopes);
  if let Some(s) = input.supervisor_id {
    require_position(&tx, s)?;
    // The supervisor's subtree grows.
    scopes.invalidate();
  }
  let position = Position {
    position_id: Uuid::new_v4(),
    description,
    department: input.department,
    supervisor_id: input.supervisor_id,
    kpi_ids: Vec::new(),
    created_at: Utc::now(),
  };
  tx.execute(
    "INSERT INTO positions (position_id, description, department, supervisor_id, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(position.position_id),
      position.description,
      position.department,
      position.supervisor_id.map(encode_uuid),
      encode_dt(position.created_at),
    ],
  )?;
  tx.commit()?;
  info!(position = %position.position_id, description = %position.description, "position created");
  Ok(position)
}

pub fn assign_kpis(conn: &mut Connection, position_id: Uuid, kpi_ids: Vec<Uuid>) -> Result<Position> {
  let tx = write_tx(conn)?;
  require_position(&tx, position_id)?;

  let mut seen = HashSet::new();
  let kpi_ids: Vec<Uuid> = kpi_ids.into_iter().filter(|k| seen.insert(*k)).collect();
  for kpi_id in &kpi_ids {
    require_kpi(&tx, *kpi_id)?;
  }

  let position_str = encode_uuid(position_id);
  tx.execute("DELETE FROM position_kpis WHERE position_id = ?1", [&position_str])?;
  for (ordinal, kpi_id) in kpi_ids.iter().enumerate() {
    tx.execute(
      "INSERT INTO position_kpis (position_id, kpi_id, ordinal) VALUES (?1, ?2, ?3)",
      rusqlite::params![position_str, encode_uuid(*kpi_id), ordinal as i64],
    )?;
  }
  let position = require_position(&tx, position_id)?;
  tx.commit()?;
  info!(position = %position_id, kpis = position.kpi_ids.len(), "kpi assignments replaced");
  Ok(position)
}

pub fn add_kpi(conn: &mut Connection, input: NewKpi) -> Result<KpiDefinition> {
  input.validate()?;
  let kpi = KpiDefinition {
    kpi_id:      Uuid::new_v4(),
    description: input.description.trim().to_owned(),
    unit:        input.unit,
    department:  input.department,
    kind:        input.kind,
    created_at:  Utc::now(),
  };
  let (kpi_type, ranges_json, target) = encode_kind(&kpi.kind)?;

  conn.execute(
    "INSERT INTO kpis (
       kpi_id, description, unit, department, kpi_type, ranges_json, target, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(kpi.kpi_id),
      kpi.description,
      kpi.unit,
      kpi.department,
      kpi_type,
      ranges_json,
      target,
      encode_dt(kpi.created_at),
    ],
  )?;
  info!(kpi = %kpi.kpi_id, description = %kpi.description, "kpi created");
  Ok(kpi)
}

fn external_id_exists(conn: &Connection, external_id: &str) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM employees WHERE external_id = ?1",
        [external_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn insert_employee(conn: &Connection, employee: &Employee) -> Result<()> {
  conn.execute(
    "INSERT INTO employees (employee_id, external_id, name, position_id, email, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(employee.employee_id),
      employee.external_id,
      employee.name,
      employee.position_id.map(encode_uuid),
      employee.email,
      encode_dt(employee.created_at),
    ],
  )?;
  Ok(())
}

pub fn add_employee(conn: &mut Connection, input: NewEmployee) -> Result<Employee> {
  let external_id = roster::normalize_external_id(&input.external_id)
    .ok_or_else(|| CoreError::InvalidInput("employee external id is blank".into()))?;
  let name = input.name.trim().to_owned();
  if name.is_empty() {
    return Err(CoreError::InvalidInput("employee name is empty".into()).into());
  }

  let tx = write_tx(conn)?;
  if external_id_exists(&tx, &external_id)? {
    return Err(CoreError::DuplicateExternalId(external_id).into());
  }
  if let Some(p) = input.position_id {
    require_position(&tx, p)?;
  }
  let employee = Employee {
    employee_id: Uuid::new_v4(),
    external_id,
    name,
    position_id: input.position_id,
    email: input.email.map(|e| e.trim().to_owned()).filter(|e| !e.is_empty()),
    created_at: Utc::now(),
  };
  insert_employee(&tx, &employee)?;
  tx.commit()?;
  info!(employee = %employee.employee_id, external_id = %employee.external_id, "employee created");
  Ok(employee)
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

pub fn hierarchy(conn: &mut Connection) -> Result<HierarchyGraph> {
  let tx = conn.transaction()?;
  let graph = load_graph(&tx)?;
  debug!(positions = graph.position_count(), "hierarchy loaded");
  Ok(graph)
}

pub fn reassign_employee(
  conn: &mut Connection,
  scopes: &Mutex<ScopeResolver>,
  employee_id: Uuid,
  position_id: Option<Uuid>,
) -> Result<Employee> {
  let tx = write_tx(conn)?;
  let mut scopes = lock(scopes);
  let mut org = Organization::new(load_graph(&tx)?, &mut scopes);
  org.reassign_employee(employee_id, position_id)?;

  tx.execute(
    "UPDATE employees SET position_id = ?2 WHERE employee_id = ?1",
    rusqlite::params![encode_uuid(employee_id), position_id.map(encode_uuid)],
  )?;
  let employee = load_employee(&tx, employee_id)?
    .ok_or(CoreError::EmployeeNotFound(employee_id))?;
  tx.commit()?;
  Ok(employee)
}

/// The ancestor walk and the edge write share one `IMMEDIATE` transaction,
/// so two concurrent reassignments cannot both pass the check and jointly
/// close a cycle.
pub fn reassign_supervisor(
  conn: &mut Connection,
  scopes: &Mutex<ScopeResolver>,
  position_id: Uuid,
  supervisor_id: Option<Uuid>,
) -> Result<Position> {
  let tx = write_tx(conn)?;
  let mut scopes = lock(scopes);
  let mut org = Organization::new(load_graph(&tx)?, &mut scopes);
  org.reassign_supervisor(position_id, supervisor_id)?;

  tx.execute(
    "UPDATE positions SET supervisor_id = ?2 WHERE position_id = ?1",
    rusqlite::params![encode_uuid(position_id), supervisor_id.map(encode_uuid)],
  )?;
  let position = require_position(&tx, position_id)?;
  tx.commit()?;
  Ok(position)
}

/// Scope of `actor`, served from the memo when the hierarchy has not changed
/// since it was computed.
pub fn scope_for(
  conn: &mut Connection,
  scopes: &Mutex<ScopeResolver>,
  actor: &Actor,
  depth: usize,
) -> Result<Scope> {
  if actor.is_admin() {
    return Ok(Scope::All);
  }
  let Some(position) = actor.position_id else {
    return Ok(Scope::Positions(BTreeSet::new()));
  };

  let mut scopes = lock(scopes);
  if let Some(scope) = scopes.lookup(position, depth) {
    return Ok(scope);
  }
  let tx = conn.transaction()?;
  let graph = load_graph(&tx)?;
  let scope = scopes.scope_for(&graph, actor, depth)?;
  debug!(actor = %actor.username, %position, depth, cached = scopes.cached(), "scope computed");
  Ok(scope)
}

// ─── Periods ─────────────────────────────────────────────────────────────────

pub fn open_period(conn: &mut Connection, period: Period) -> Result<Rollover> {
  let tx = write_tx(conn)?;
  if let Some(current) = current_period(&tx)? {
    if period < current {
      return Err(
        CoreError::InvalidPeriod(format!("{period} precedes the current period {current}"))
          .into(),
      );
    }
  }

  let now = encode_dt(Utc::now());
  let period_str = encode_period(period);
  tx.execute(
    "INSERT OR IGNORE INTO periods (period, opened_at) VALUES (?1, ?2)",
    rusqlite::params![period_str, now],
  )?;
  let closed_previous = tx.execute(
    "UPDATE captures SET state = ?2, closed_at = ?3
     WHERE state = ?1 AND period < ?4",
    rusqlite::params![
      PeriodState::Open.as_ref(),
      PeriodState::Closed.as_ref(),
      now,
      period_str,
    ],
  )?;
  let opened = tx.execute(
    "INSERT OR IGNORE INTO captures (position_id, kpi_id, period, color, state)
     SELECT position_id, kpi_id, ?1, ?2, ?3 FROM position_kpis",
    rusqlite::params![period_str, Color::None.as_ref(), PeriodState::Open.as_ref()],
  )?;
  tx.commit()?;

  let rollover = Rollover { period, opened, closed_previous };
  info!(%period, opened, closed_previous, "period opened");
  Ok(rollover)
}

pub fn current(conn: &mut Connection) -> Result<Option<Period>> {
  current_period(conn)
}

// ─── Captures ────────────────────────────────────────────────────────────────

pub fn capture(conn: &mut Connection, request: CaptureRequest) -> Result<Capture> {
  let tx = write_tx(conn)?;
  let position = require_position(&tx, request.position_id)?;
  let kpi = require_kpi(&tx, request.kpi_id)?;
  let key = request.key();

  let slot = Slot {
    key,
    is_current: current_period(&tx)? == Some(key.period),
    stored: load_capture(&tx, key)?,
  };
  let capture = slot.capture(&position, &kpi, request.value, Utc::now())?;
  upsert_capture(&tx, &capture)?;
  tx.commit()?;

  info!(
    position = %capture.position_id,
    kpi = %capture.kpi_id,
    period = %capture.period,
    color = %capture.color,
    "kpi captured"
  );
  Ok(capture)
}

pub fn close(conn: &mut Connection, key: CaptureKey, closed_by: Option<&str>) -> Result<Capture> {
  let tx = write_tx(conn)?;
  let position = require_position(&tx, key.position_id)?;
  require_kpi(&tx, key.kpi_id)?;

  let slot = Slot {
    key,
    is_current: current_period(&tx)? == Some(key.period),
    stored: load_capture(&tx, key)?,
  };
  let capture = slot.close(&position, closed_by, Utc::now())?;
  upsert_capture(&tx, &capture)?;
  tx.commit()?;

  info!(position = %key.position_id, kpi = %key.kpi_id, period = %key.period, "capture closed");
  Ok(capture)
}

pub fn close_position_period(
  conn: &mut Connection,
  position_id: Uuid,
  period: Period,
  closed_by: Option<&str>,
) -> Result<Vec<Capture>> {
  let tx = write_tx(conn)?;
  let position = require_position(&tx, position_id)?;
  let is_current = current_period(&tx)? == Some(period);

  let stored: BTreeMap<Uuid, Capture> = load_position_captures(&tx, position_id, period)?
    .into_iter()
    .map(|c| (c.kpi_id, c))
    .collect();

  // Assigned KPIs without a row only exist as slots in the current period.
  let mut slots: Vec<Slot> = Vec::new();
  if is_current {
    for kpi_id in position.kpi_ids.iter().filter(|k| !stored.contains_key(k)) {
      slots.push(Slot {
        key: CaptureKey { position_id, kpi_id: *kpi_id, period },
        is_current,
        stored: None,
      });
    }
  }
  for (kpi_id, capture) in stored {
    if capture.is_closed() {
      continue;
    }
    slots.push(Slot {
      key: CaptureKey { position_id, kpi_id, period },
      is_current,
      stored: Some(capture),
    });
  }

  let now = Utc::now();
  let mut closed = Vec::with_capacity(slots.len());
  for slot in slots {
    let capture = slot.close(&position, closed_by, now)?;
    upsert_capture(&tx, &capture)?;
    closed.push(capture);
  }
  tx.commit()?;

  info!(position = %position_id, %period, closed = closed.len(), "position period closed");
  Ok(closed)
}

pub fn position_report(
  conn: &mut Connection,
  position_id: Uuid,
  period: Period,
) -> Result<PositionReport> {
  let tx = conn.transaction()?;
  let position = require_position(&tx, position_id)?;
  let mut captures: HashMap<Uuid, Capture> = load_position_captures(&tx, position_id, period)?
    .into_iter()
    .map(|c| (c.kpi_id, c))
    .collect();

  // Assigned KPIs plus any KPI with history in this period.
  let mut kpi_ids = position.kpi_ids.clone();
  kpi_ids.extend(captures.keys().filter(|k| !position.kpi_ids.contains(k)).copied());

  let mut rows = Vec::with_capacity(kpi_ids.len());
  for kpi_id in kpi_ids {
    let kpi = require_kpi(&tx, kpi_id)?;
    rows.push(ReportRow::new(kpi, captures.remove(&kpi_id)));
  }
  rows.sort_by(|a, b| a.kpi.description.cmp(&b.kpi.description));

  debug!(position = %position_id, %period, rows = rows.len(), "position report built");
  Ok(PositionReport { position, period, rows })
}

// ─── Roster ──────────────────────────────────────────────────────────────────

pub fn reconcile(conn: &mut Connection, candidates: Vec<RosterCandidate>) -> Result<ReconcileReport> {
  let tx = write_tx(conn)?;

  let existing: HashSet<String> = tx
    .prepare("SELECT external_id FROM employees")?
    .query_map([], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<_>>()?;
  let plan = roster::plan(&existing, candidates);

  // First position created wins when descriptions repeat.
  let mut by_description: HashMap<String, Uuid> = HashMap::new();
  for p in load_positions(&tx)? {
    by_description.entry(p.description).or_insert(p.position_id);
  }

  let now = Utc::now();
  for candidate in &plan.to_create {
    let position_id = candidate
      .position_hint
      .as_deref()
      .map(str::trim)
      .and_then(|hint| by_description.get(hint).copied());
    insert_employee(&tx, &Employee {
      employee_id: Uuid::new_v4(),
      external_id: candidate.external_id.clone(),
      name: candidate.name.clone(),
      position_id,
      email: candidate.email.clone().filter(|e| !e.trim().is_empty()),
      created_at: now,
    })?;
  }
  tx.commit()?;

  Ok(ReconcileReport { created: plan.to_create.len(), skipped: plan.skipped })
}
