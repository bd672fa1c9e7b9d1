//! Hierarchy mutations with their integrity rules.
//!
//! [`Organization`] pairs a [`HierarchyGraph`] with the [`ScopeResolver`]
//! memo derived from it, so an edge change and the invalidation of cached
//! scopes always happen together. The resolver is borrowed: it outlives the
//! unit of work and is shared by later scope queries. A rejected supervisor
//! change restores the graph snapshot taken before the attempt.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Result,
  hierarchy::HierarchyGraph,
  scope::ScopeResolver,
};

#[derive(Debug)]
pub struct Organization<'r> {
  graph:  HierarchyGraph,
  scopes: &'r mut ScopeResolver,
}

impl<'r> Organization<'r> {
  pub fn new(graph: HierarchyGraph, scopes: &'r mut ScopeResolver) -> Self {
    Self { graph, scopes }
  }

  pub fn graph(&self) -> &HierarchyGraph { &self.graph }

  pub fn into_graph(self) -> HierarchyGraph { self.graph }

  /// Move an employee to `position`, or unassign them with `None`.
  ///
  /// Employees are leaves so no cycle is possible; the only failure modes
  /// are unknown identifiers.
  pub fn reassign_employee(&mut self, employee: Uuid, position: Option<Uuid>) -> Result<()> {
    self.graph.set_employee_position(employee, position)?;
    self.scopes.invalidate();
    info!(%employee, ?position, "employee reassigned");
    Ok(())
  }

  /// Point `position` at a new supervisor, or make it a root with `None`.
  ///
  /// Fails with [`crate::Error::CycleDetected`] when `position` would become
  /// its own ancestor; the graph and the scope memo are then left exactly as
  /// they were.
  pub fn reassign_supervisor(&mut self, position: Uuid, supervisor: Option<Uuid>) -> Result<()> {
    let snapshot = self.graph.clone();
    match self.graph.set_supervisor(position, supervisor) {
      Ok(()) => {
        self.scopes.invalidate();
        info!(%position, ?supervisor, "supervisor reassigned");
        Ok(())
      }
      Err(e) => {
        self.graph = snapshot;
        warn!(%position, ?supervisor, error = %e, "supervisor reassignment rejected");
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;
  use crate::{
    Error,
    hierarchy::{EmployeeNode, tests::chain},
    scope::{Actor, Role, Scope},
  };

  fn member(position_id: Uuid) -> Actor {
    Actor { username: "ana".into(), role: Role::Member, position_id: Some(position_id) }
  }

  #[test]
  fn cycle_leaves_graph_and_scopes_untouched() {
    let t = chain();
    let mut scopes = ScopeResolver::new();
    scopes.scope_for(&t.graph, &member(t.a), 1).unwrap();

    let mut org = Organization::new(t.graph, &mut scopes);
    let ancestors_before = org.graph().ancestors_of(t.a).unwrap();
    let graph_before = org.graph().clone();

    let err = org.reassign_supervisor(t.a, Some(t.b)).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
    assert_eq!(org.graph().ancestors_of(t.a).unwrap(), ancestors_before);
    assert_eq!(org.graph(), &graph_before);
    drop(org);
    assert_eq!(scopes.cached(), 1);
  }

  #[test]
  fn supervisor_change_recomputes_scopes() {
    let t = chain();
    let mut scopes = ScopeResolver::new();
    let before = scopes.scope_for(&t.graph, &member(t.other), 1).unwrap();
    assert_eq!(before, Scope::Positions(BTreeSet::from([t.other])));

    let mut org = Organization::new(t.graph, &mut scopes);
    org.reassign_supervisor(t.c, Some(t.other)).unwrap();
    let graph = org.into_graph();
    assert_eq!(scopes.cached(), 0);

    let after = scopes.scope_for(&graph, &member(t.other), 1).unwrap();
    assert_eq!(after, Scope::Positions(BTreeSet::from([t.other, t.c])));
    let old_boss = scopes.scope_for(&graph, &member(t.b), 1).unwrap();
    assert!(!old_boss.permits(t.c));
  }

  #[test]
  fn unknown_supervisor_is_rejected() {
    let t = chain();
    let mut scopes = ScopeResolver::new();
    let mut org = Organization::new(t.graph, &mut scopes);
    let missing = Uuid::new_v4();
    assert!(matches!(
      org.reassign_supervisor(t.a, Some(missing)),
      Err(Error::PositionNotFound(id)) if id == missing
    ));
  }

  #[test]
  fn employee_reassignment_always_legal() {
    let mut t = chain();
    let e = Uuid::new_v4();
    t.graph.insert_employee(EmployeeNode { employee_id: e, name: "Ana".into(), position_id: Some(t.root) });
    let mut scopes = ScopeResolver::new();
    scopes.scope_for(&t.graph, &member(t.root), 1).unwrap();

    let mut org = Organization::new(t.graph, &mut scopes);
    org.reassign_employee(e, Some(t.c)).unwrap();
    assert_eq!(org.graph().employee(e).unwrap().position_id, Some(t.c));

    org.reassign_employee(e, None).unwrap();
    assert_eq!(org.graph().employee(e).unwrap().position_id, None);
    drop(org);
    assert_eq!(scopes.cached(), 0);
  }
}
