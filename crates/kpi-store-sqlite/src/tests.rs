//! Integration tests for `SqliteStore` against an in-memory database.

use kpi_core::{
  Error as CoreError,
  catalog::{EmployeeQuery, KpiKind, NewEmployee, NewKpi, NewPosition},
  period::{CaptureKey, Period, PeriodState},
  roster::{self, RosterCandidate, RosterStatus},
  scope::{Actor, Role, Scope},
  store::{CaptureRequest, KpiStore},
  threshold::{CaptureValue, Color, RawValue, ThresholdRange},
};
use uuid::Uuid;

use crate::{Error, SqliteRosterSource, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn core(err: Error) -> CoreError {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a core error, got {other:?}"),
  }
}

fn may() -> Period { Period::new(2024, 5).unwrap() }

async fn position(s: &SqliteStore, description: &str, supervisor: Option<Uuid>) -> Uuid {
  s.add_position(NewPosition {
    description:   description.into(),
    department:    None,
    supervisor_id: supervisor,
  })
  .await
  .unwrap()
  .position_id
}

async fn ventas(s: &SqliteStore) -> Uuid {
  s.add_kpi(NewKpi {
    description: "Ventas".into(),
    unit:        Some("%".into()),
    department:  None,
    kind:        KpiKind::Numeric {
      ranges: vec![
        ThresholdRange::new(0.0, 50.0, Color::Red),
        ThresholdRange::new(51.0, 80.0, Color::Yellow),
        ThresholdRange::new(81.0, 999.0, Color::Green),
      ],
      target: Some(80.0),
    },
  })
  .await
  .unwrap()
  .kpi_id
}

async fn criterion(s: &SqliteStore, description: &str) -> Uuid {
  s.add_kpi(NewKpi {
    description: description.into(),
    unit:        None,
    department:  None,
    kind:        KpiKind::Criterion,
  })
  .await
  .unwrap()
  .kpi_id
}

/// A position with the "Ventas" KPI assigned and May 2024 open.
async fn sales_setup(s: &SqliteStore) -> (Uuid, Uuid) {
  let p = position(s, "Gerente de ventas", None).await;
  let k = ventas(s).await;
  s.assign_kpis(p, vec![k]).await.unwrap();
  s.open_period(may()).await.unwrap();
  (p, k)
}

fn request(p: Uuid, k: Uuid, value: impl Into<RawValue>) -> CaptureRequest {
  CaptureRequest { position_id: p, kpi_id: k, period: may(), value: value.into() }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_position() {
  let s = store().await;
  let root = position(&s, "Director", None).await;
  let child = position(&s, "Gerente", Some(root)).await;

  let fetched = s.get_position(child).await.unwrap().unwrap();
  assert_eq!(fetched.supervisor_id, Some(root));
  assert!(s.get_position(Uuid::new_v4()).await.unwrap().is_none());

  let all = s.list_positions().await.unwrap();
  let names: Vec<_> = all.iter().map(|p| p.description.as_str()).collect();
  assert_eq!(names, ["Director", "Gerente"]);
}

#[tokio::test]
async fn position_with_unknown_supervisor_is_rejected() {
  let s = store().await;
  let err = s
    .add_position(NewPosition {
      description:   "Orphan".into(),
      department:    None,
      supervisor_id: Some(Uuid::new_v4()),
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::PositionNotFound(_)));
  assert!(s.list_positions().await.unwrap().is_empty());
}

#[tokio::test]
async fn kpi_definitions_roundtrip_through_storage() {
  let s = store().await;
  let k = ventas(&s).await;
  let c = criterion(&s, "Comentarios").await;

  let stored = s.get_kpi(k).await.unwrap().unwrap();
  let KpiKind::Numeric { ranges, target } = stored.kind else {
    panic!("expected numeric kpi");
  };
  assert_eq!(ranges.len(), 3);
  assert_eq!(ranges[1].color, Color::Yellow);
  assert_eq!(target, Some(80.0));

  assert_eq!(s.get_kpi(c).await.unwrap().unwrap().kind, KpiKind::Criterion);
  assert_eq!(s.list_kpis().await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_kpi_definition_is_rejected() {
  let s = store().await;
  let err = s
    .add_kpi(NewKpi {
      description: "Broken".into(),
      unit:        None,
      department:  None,
      kind:        KpiKind::Numeric {
        ranges: vec![ThresholdRange::new(10.0, 1.0, Color::Red)],
        target: None,
      },
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidDefinition(_)));
}

#[tokio::test]
async fn assign_kpis_replaces_set_and_keeps_order() {
  let s = store().await;
  let p = position(&s, "Gerente", None).await;
  let a = criterion(&s, "A").await;
  let b = criterion(&s, "B").await;

  let updated = s.assign_kpis(p, vec![b, a, b]).await.unwrap();
  assert_eq!(updated.kpi_ids, vec![b, a]);

  let updated = s.assign_kpis(p, vec![a]).await.unwrap();
  assert_eq!(updated.kpi_ids, vec![a]);

  let err = s.assign_kpis(p, vec![Uuid::new_v4()]).await.unwrap_err();
  assert!(matches!(core(err), CoreError::KpiNotFound(_)));
  assert_eq!(s.get_position(p).await.unwrap().unwrap().kpi_ids, vec![a]);
}

#[tokio::test]
async fn employee_external_ids_are_normalised_and_unique() {
  let s = store().await;
  let e = s
    .add_employee(NewEmployee {
      external_id: "123".into(),
      name:        "Ana López".into(),
      position_id: None,
      email:       None,
    })
    .await
    .unwrap();
  assert_eq!(e.external_id, "00123");

  let err = s
    .add_employee(NewEmployee {
      external_id: "00123".into(),
      name:        "Otra".into(),
      position_id: None,
      email:       None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateExternalId(_)));
}

#[tokio::test]
async fn list_employees_filters_and_paginates() {
  let s = store().await;
  let p = position(&s, "Ventas", None).await;
  for (id, name, pos) in [
    ("1", "Carla", Some(p)),
    ("2", "Ana", None),
    ("3", "Beto", Some(p)),
    ("4", "Anabel", Some(p)),
  ] {
    s.add_employee(NewEmployee {
      external_id: id.into(),
      name:        name.into(),
      position_id: pos,
      email:       None,
    })
    .await
    .unwrap();
  }

  let all = s.list_employees(&EmployeeQuery::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(|e| e.name.as_str()).collect();
  assert_eq!(names, ["Ana", "Anabel", "Beto", "Carla"]);

  let query = EmployeeQuery { text: Some("ana".into()), ..Default::default() };
  assert_eq!(s.list_employees(&query).await.unwrap().len(), 2);

  let query = EmployeeQuery { limit: Some(2), offset: Some(1), ..Default::default() };
  let page: Vec<_> = s
    .list_employees(&query)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.name)
    .collect();
  assert_eq!(page, ["Anabel", "Beto"]);

  let query = EmployeeQuery {
    positions: Some([p].into_iter().collect()),
    ..Default::default()
  };
  assert_eq!(s.list_employees(&query).await.unwrap().len(), 3);

  let query = EmployeeQuery { positions: Some(Default::default()), ..Default::default() };
  assert!(s.list_employees(&query).await.unwrap().is_empty());
}

// ─── Captures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn capture_assigns_semaphore_color() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;

  let c = s.capture(request(p, k, 60.0)).await.unwrap();
  assert_eq!(c.color, Color::Yellow);
  assert_eq!(c.state, PeriodState::Open);

  let c = s.capture(request(p, k, "85")).await.unwrap();
  assert_eq!(c.color, Color::Green);
  assert_eq!(c.value, Some(CaptureValue::Number(85.0)));

  let c = s.capture(request(p, k, 10.0)).await.unwrap();
  assert_eq!(c.color, Color::Red);
}

#[tokio::test]
async fn non_numeric_value_for_numeric_kpi_is_rejected() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;
  s.capture(request(p, k, 60.0)).await.unwrap();

  let err = s.capture(request(p, k, "sixty")).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidCaptureValue { .. }));

  let report = s.position_report(p, may()).await.unwrap();
  let capture = report.rows[0].capture.as_ref().unwrap();
  assert_eq!(capture.value, Some(CaptureValue::Number(60.0)));
}

#[tokio::test]
async fn criterion_kpi_stores_text_without_color() {
  let s = store().await;
  let p = position(&s, "Gerente", None).await;
  let k = criterion(&s, "Clima laboral").await;
  s.assign_kpis(p, vec![k]).await.unwrap();
  s.open_period(may()).await.unwrap();

  let c = s.capture(request(p, k, "Buen ambiente")).await.unwrap();
  assert_eq!(c.value, Some(CaptureValue::Text("Buen ambiente".into())));
  assert_eq!(c.color, Color::None);
}

#[tokio::test]
async fn capture_of_unassigned_kpi_is_rejected() {
  let s = store().await;
  let (p, _) = sales_setup(&s).await;
  let other = criterion(&s, "Otro").await;

  let err = s.capture(request(p, other, "x")).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UnassignedKpi { .. }));
}

#[tokio::test]
async fn capture_outside_current_period_is_rejected() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;

  let mut req = request(p, k, 60.0);
  req.period = may().next();
  let err = s.capture(req).await.unwrap_err();
  assert!(matches!(core(err), CoreError::PeriodNotOpen(_)));

  let s = store().await;
  let p = position(&s, "Sin periodo", None).await;
  let k = ventas(&s).await;
  s.assign_kpis(p, vec![k]).await.unwrap();
  let err = s.capture(request(p, k, 60.0)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::PeriodNotOpen(_)));
}

#[tokio::test]
async fn closed_capture_is_immutable() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;
  s.capture(request(p, k, 60.0)).await.unwrap();

  let key = CaptureKey { position_id: p, kpi_id: k, period: may() };
  let closed = s.close(key, Some("ana".into())).await.unwrap();
  assert!(closed.is_closed());
  assert!(closed.closed_at.is_some());
  assert_eq!(closed.closed_by.as_deref(), Some("ana"));

  let err = s.capture(request(p, k, 90.0)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::AlreadyClosed { .. }));

  let err = s.close(key, None).await.unwrap_err();
  assert!(matches!(core(err), CoreError::AlreadyClosed { .. }));

  let report = s.position_report(p, may()).await.unwrap();
  let stored = report.rows[0].capture.as_ref().unwrap();
  assert_eq!(stored.value, Some(CaptureValue::Number(60.0)));
  assert_eq!(stored.color, Color::Yellow);
  assert_eq!(stored.state, PeriodState::Closed);
  assert_eq!(stored.closed_by.as_deref(), Some("ana"));
}

#[tokio::test]
async fn closing_an_unassigned_kpi_is_rejected() {
  let s = store().await;
  let (p, _) = sales_setup(&s).await;
  let other = criterion(&s, "Puntualidad").await;

  let key = CaptureKey { position_id: p, kpi_id: other, period: may() };
  let err = s.close(key, None).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UnassignedKpi { .. }));

  let report = s.position_report(p, may()).await.unwrap();
  assert_eq!(report.rows.len(), 1);
}

#[tokio::test]
async fn stored_capture_closes_after_unassignment() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;
  s.capture(request(p, k, 75.0)).await.unwrap();
  s.assign_kpis(p, vec![]).await.unwrap();

  let key = CaptureKey { position_id: p, kpi_id: k, period: may() };
  let closed = s.close(key, None).await.unwrap();
  assert!(closed.is_closed());
  assert_eq!(closed.value, Some(CaptureValue::Number(75.0)));
}

#[tokio::test]
async fn close_position_period_closes_every_open_slot() {
  let s = store().await;
  let p = position(&s, "Gerente", None).await;
  let a = ventas(&s).await;
  let b = criterion(&s, "Comentarios").await;
  s.assign_kpis(p, vec![a, b]).await.unwrap();
  s.open_period(may()).await.unwrap();
  s.capture(request(p, a, 70.0)).await.unwrap();

  let closed = s.close_position_period(p, may(), Some("jefa".into())).await.unwrap();
  assert_eq!(closed.len(), 2);
  assert!(closed.iter().all(|c| c.is_closed()));
  assert!(closed.iter().all(|c| c.closed_by.as_deref() == Some("jefa")));

  assert!(s.close_position_period(p, may(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn position_report_orders_rows_and_evaluates_target() {
  let s = store().await;
  let p = position(&s, "Gerente", None).await;
  let v = ventas(&s).await;
  let c = criterion(&s, "Actitud").await;
  s.assign_kpis(p, vec![v, c]).await.unwrap();
  s.open_period(may()).await.unwrap();
  s.capture(request(p, v, 85.0)).await.unwrap();

  let report = s.position_report(p, may()).await.unwrap();
  let names: Vec<_> = report.rows.iter().map(|r| r.kpi.description.as_str()).collect();
  assert_eq!(names, ["Actitud", "Ventas"]);
  assert_eq!(report.rows[0].meets_target, None);
  assert_eq!(report.rows[1].meets_target, Some(true));
}

#[tokio::test]
async fn unassigning_a_kpi_keeps_its_history() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;
  s.capture(request(p, k, 40.0)).await.unwrap();

  s.assign_kpis(p, vec![]).await.unwrap();
  let report = s.position_report(p, may()).await.unwrap();
  assert_eq!(report.rows.len(), 1);
  assert_eq!(report.rows[0].capture.as_ref().unwrap().color, Color::Red);
}

// ─── Periods ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_period_is_idempotent_and_closes_previous() {
  let s = store().await;
  let (p, k) = sales_setup(&s).await;
  assert_eq!(s.current_period().await.unwrap(), Some(may()));

  let again = s.open_period(may()).await.unwrap();
  assert_eq!(again.opened, 0);
  assert_eq!(again.closed_previous, 0);

  let june = may().next();
  let rollover = s.open_period(june).await.unwrap();
  assert_eq!(rollover.opened, 1);
  assert_eq!(rollover.closed_previous, 1);
  assert_eq!(s.current_period().await.unwrap(), Some(june));

  let key = CaptureKey { position_id: p, kpi_id: k, period: may() };
  let err = s.close(key, None).await.unwrap_err();
  assert!(matches!(core(err), CoreError::AlreadyClosed { .. }));

  let err = s.open_period(may()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidPeriod(_)));
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn supervisor_cycle_is_rejected_and_nothing_changes() {
  let s = store().await;
  let a = position(&s, "A", None).await;
  let b = position(&s, "B", Some(a)).await;

  let err = s.reassign_supervisor(a, Some(b)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CycleDetected { .. }));

  let err = s.reassign_supervisor(a, Some(a)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CycleDetected { .. }));

  let graph = s.hierarchy().await.unwrap();
  assert!(graph.ancestors_of(a).unwrap().is_empty());
  assert_eq!(graph.ancestors_of(b).unwrap(), vec![a]);
}

#[tokio::test]
async fn supervisor_can_be_moved_and_cleared() {
  let s = store().await;
  let a = position(&s, "A", None).await;
  let b = position(&s, "B", None).await;
  let c = position(&s, "C", Some(a)).await;

  let moved = s.reassign_supervisor(c, Some(b)).await.unwrap();
  assert_eq!(moved.supervisor_id, Some(b));

  let cleared = s.reassign_supervisor(c, None).await.unwrap();
  assert_eq!(cleared.supervisor_id, None);
  assert_eq!(s.hierarchy().await.unwrap().roots().len(), 3);
}

#[tokio::test]
async fn reassign_employee_moves_and_unassigns() {
  let s = store().await;
  let a = position(&s, "A", None).await;
  let b = position(&s, "B", None).await;
  let e = s
    .add_employee(NewEmployee {
      external_id: "7".into(),
      name:        "Eva".into(),
      position_id: Some(a),
      email:       None,
    })
    .await
    .unwrap();

  let moved = s.reassign_employee(e.employee_id, Some(b)).await.unwrap();
  assert_eq!(moved.position_id, Some(b));

  let loose = s.reassign_employee(e.employee_id, None).await.unwrap();
  assert_eq!(loose.position_id, None);

  let err = s.reassign_employee(e.employee_id, Some(Uuid::new_v4())).await.unwrap_err();
  assert!(matches!(core(err), CoreError::PositionNotFound(_)));
  let err = s.reassign_employee(Uuid::new_v4(), Some(a)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::EmployeeNotFound(_)));
}

#[tokio::test]
async fn member_scope_excludes_grandchildren() {
  let s = store().await;
  let root = position(&s, "Director", None).await;
  let child = position(&s, "Gerente", Some(root)).await;
  let grandchild = position(&s, "Analista", Some(child)).await;

  let actor = Actor {
    username:    "director".into(),
    role:        Role::Member,
    position_id: Some(root),
  };
  let Scope::Positions(visible) = s.scope_for(&actor, 1).await.unwrap() else {
    panic!("member should get a bounded scope");
  };
  assert!(visible.contains(&root));
  assert!(visible.contains(&child));
  assert!(!visible.contains(&grandchild));

  let Scope::Positions(deeper) = s.scope_for(&actor, 2).await.unwrap() else {
    panic!("member should get a bounded scope");
  };
  assert!(deeper.contains(&grandchild));
}

fn cached_scopes(s: &SqliteStore) -> usize { s.scopes.lock().unwrap().cached() }

#[tokio::test]
async fn cached_scopes_follow_hierarchy_writes() {
  let s = store().await;
  let a = position(&s, "A", None).await;
  let b = position(&s, "B", None).await;
  let c = position(&s, "C", Some(b)).await;
  let member = |p| Actor { username: "m".into(), role: Role::Member, position_id: Some(p) };

  assert_eq!(s.scope_for(&member(a), 1).await.unwrap(), Scope::Positions([a].into()));
  s.scope_for(&member(b), 1).await.unwrap();
  assert_eq!(cached_scopes(&s), 2);

  // A rejected change keeps the memo.
  let err = s.reassign_supervisor(b, Some(c)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CycleDetected { .. }));
  assert_eq!(cached_scopes(&s), 2);

  s.reassign_supervisor(c, Some(a)).await.unwrap();
  assert_eq!(cached_scopes(&s), 0);
  assert_eq!(s.scope_for(&member(a), 1).await.unwrap(), Scope::Positions([a, c].into()));
  assert_eq!(s.scope_for(&member(b), 1).await.unwrap(), Scope::Positions([b].into()));

  let d = position(&s, "D", Some(a)).await;
  assert_eq!(cached_scopes(&s), 0);
  assert_eq!(s.scope_for(&member(a), 1).await.unwrap(), Scope::Positions([a, c, d].into()));

  let admin = Actor { username: "root".into(), role: Role::Admin, position_id: None };
  assert_eq!(s.scope_for(&admin, 1).await.unwrap(), Scope::All);
}

// ─── Roster ──────────────────────────────────────────────────────────────────

fn candidate(id: &str, name: &str, hint: Option<&str>) -> RosterCandidate {
  RosterCandidate {
    external_id:   id.into(),
    name:          name.into(),
    email:         None,
    position_hint: hint.map(Into::into),
  }
}

#[tokio::test]
async fn reconcile_is_idempotent() {
  let s = store().await;
  let p = position(&s, "Vendedor", None).await;
  let batch = vec![
    candidate("10", "Luis", Some("Vendedor")),
    candidate("11", "Marta", Some("Puesto desconocido")),
  ];

  let first = s.reconcile(batch.clone()).await.unwrap();
  assert_eq!((first.created, first.skipped), (2, 0));

  let second = s.reconcile(batch).await.unwrap();
  assert_eq!((second.created, second.skipped), (0, 2));

  let all = s.list_employees(&EmployeeQuery::default()).await.unwrap();
  assert_eq!(all.len(), 2);
  let luis = all.iter().find(|e| e.name == "Luis").unwrap();
  assert_eq!(luis.external_id, "00010");
  assert_eq!(luis.position_id, Some(p));
  let marta = all.iter().find(|e| e.name == "Marta").unwrap();
  assert_eq!(marta.position_id, None);
}

#[tokio::test]
async fn reconcile_skips_nameless_records() {
  let s = store().await;
  let report = s
    .reconcile(vec![candidate("7", "   ", None), candidate("8", "Nora", None)])
    .await
    .unwrap();
  assert_eq!((report.created, report.skipped), (1, 1));

  let all = s.list_employees(&EmployeeQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].name, "Nora");
}

#[tokio::test]
async fn missing_roster_source_is_reported_not_raised() {
  let s = store().await;
  let status = roster::reconcile_from(&s, None::<&SqliteRosterSource>).await.unwrap();
  assert!(matches!(status, RosterStatus::SourceUnavailable { .. }));

  let missing = SqliteRosterSource::new(
    std::env::temp_dir().join(format!("missing-{}.db", Uuid::new_v4())),
    SqliteRosterSource::DEFAULT_TABLE,
  )
  .unwrap();
  let status = roster::reconcile_from(&s, Some(&missing)).await.unwrap();
  assert!(matches!(status, RosterStatus::SourceUnavailable { .. }));
  assert!(s.list_employees(&EmployeeQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn roster_source_reads_staff_table() {
  let path = std::env::temp_dir().join(format!("roster-{}.db", Uuid::new_v4()));
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE personal (employee_number, full_name TEXT, puesto TEXT);
         INSERT INTO personal VALUES (42, 'Rosa Díaz', 'Vendedor');
         INSERT INTO personal VALUES (43, 'Iván Ruiz', NULL);
         INSERT INTO personal VALUES (44.0, 'Eva Soto', NULL);
         INSERT INTO personal VALUES (45, '   ', NULL);",
      )
      .unwrap();
  }

  let s = store().await;
  let p = position(&s, "Vendedor", None).await;
  let source = SqliteRosterSource::new(&path, "personal").unwrap();
  let status = roster::reconcile_from(&s, Some(&source)).await.unwrap();
  assert!(matches!(
    status,
    RosterStatus::Reconciled(r) if r.created == 3 && r.skipped == 1
  ));

  let query = EmployeeQuery { text: Some("00042".into()), ..Default::default() };
  let rosa = s.list_employees(&query).await.unwrap();
  assert_eq!(rosa.len(), 1);
  assert_eq!(rosa[0].position_id, Some(p));

  let query = EmployeeQuery { text: Some("00044".into()), ..Default::default() };
  let eva = s.list_employees(&query).await.unwrap();
  assert_eq!(eva.len(), 1);
  assert_eq!(eva[0].name, "Eva Soto");

  let _ = std::fs::remove_file(&path);
}

#[test]
fn roster_table_name_is_validated() {
  assert!(SqliteRosterSource::new("x.db", "personal; DROP TABLE x").is_err());
  assert!(SqliteRosterSource::new("x.db", "").is_err());
  assert!(SqliteRosterSource::new("x.db", "staff_2024").is_ok());
}
