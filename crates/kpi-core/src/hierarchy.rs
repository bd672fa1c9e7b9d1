//! The organisational hierarchy as an adjacency map.
//!
//! Positions form a forest through their supervisor edge; employees hang off
//! positions as leaves. Nodes are stored by identifier with no back-pointers:
//! children are found by scanning, and every walk up the supervisor chain is
//! bounded by the number of positions, so even corrupt data cannot loop.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{Employee, Position},
};

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionNode {
  pub position_id:   Uuid,
  pub description:   String,
  pub supervisor_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeNode {
  pub employee_id: Uuid,
  pub name:        String,
  pub position_id: Option<Uuid>,
}

impl From<&Position> for PositionNode {
  fn from(p: &Position) -> Self {
    Self {
      position_id:   p.position_id,
      description:   p.description.clone(),
      supervisor_id: p.supervisor_id,
    }
  }
}

impl From<&Employee> for EmployeeNode {
  fn from(e: &Employee) -> Self {
    Self {
      employee_id: e.employee_id,
      name:        e.name.clone(),
      position_id: e.position_id,
    }
  }
}

// ─── Tree view ───────────────────────────────────────────────────────────────

/// An employee leaf in [`OrgNode`].
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeLeaf {
  pub employee_id: Uuid,
  pub name:        String,
}

/// One position in the org chart with its employees and direct reports.
#[derive(Debug, Clone, Serialize)]
pub struct OrgNode {
  pub position_id: Uuid,
  pub description: String,
  pub employees:   Vec<EmployeeLeaf>,
  pub reports:     Vec<OrgNode>,
}

// ─── Graph ───────────────────────────────────────────────────────────────────

/// Snapshot of the position and employee edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyGraph {
  positions: HashMap<Uuid, PositionNode>,
  employees: HashMap<Uuid, EmployeeNode>,
}

impl HierarchyGraph {
  pub fn new() -> Self { Self::default() }

  /// Build a graph from catalog rows. Edges are taken as stored; use
  /// [`Self::set_supervisor`] to add them with cycle checking.
  pub fn from_rows<'a>(
    positions: impl IntoIterator<Item = &'a Position>,
    employees: impl IntoIterator<Item = &'a Employee>,
  ) -> Self {
    Self {
      positions: positions
        .into_iter()
        .map(|p| (p.position_id, PositionNode::from(p)))
        .collect(),
      employees: employees
        .into_iter()
        .map(|e| (e.employee_id, EmployeeNode::from(e)))
        .collect(),
    }
  }

  pub fn insert_position(&mut self, node: PositionNode) {
    self.positions.insert(node.position_id, node);
  }

  pub fn insert_employee(&mut self, node: EmployeeNode) {
    self.employees.insert(node.employee_id, node);
  }

  pub fn position(&self, id: Uuid) -> Option<&PositionNode> {
    self.positions.get(&id)
  }

  pub fn employee(&self, id: Uuid) -> Option<&EmployeeNode> {
    self.employees.get(&id)
  }

  pub fn contains_position(&self, id: Uuid) -> bool {
    self.positions.contains_key(&id)
  }

  pub fn position_count(&self) -> usize { self.positions.len() }

  fn require_position(&self, id: Uuid) -> Result<&PositionNode> {
    self.positions.get(&id).ok_or(Error::PositionNotFound(id))
  }

  // ── Queries ─────────────────────────────────────────────────────────────

  /// Supervisors of `position`, nearest first, ending at a root.
  ///
  /// Never contains `position` itself. A dangling supervisor reference ends
  /// the chain.
  pub fn ancestors_of(&self, position: Uuid) -> Result<Vec<Uuid>> {
    let mut current = self.require_position(position)?.supervisor_id;
    let mut chain = Vec::new();
    while let Some(id) = current {
      if id == position || chain.len() >= self.positions.len() {
        break;
      }
      let Some(node) = self.positions.get(&id) else { break };
      chain.push(id);
      current = node.supervisor_id;
    }
    Ok(chain)
  }

  pub fn direct_reports_of(&self, position: Uuid) -> Result<BTreeSet<Uuid>> {
    self.require_position(position)?;
    Ok(self.children(position).collect())
  }

  /// Positions reachable downwards from `position` in at most `depth` steps,
  /// excluding `position` itself.
  pub fn descendants_within(
    &self,
    position: Uuid,
    depth: usize,
  ) -> Result<BTreeSet<Uuid>> {
    self.require_position(position)?;
    let mut found = BTreeSet::new();
    let mut frontier = vec![position];
    for _ in 0..depth {
      let next: Vec<Uuid> = frontier
        .iter()
        .flat_map(|&p| self.children(p))
        .filter(|c| *c != position && found.insert(*c))
        .collect();
      if next.is_empty() {
        break;
      }
      frontier = next;
    }
    Ok(found)
  }

  pub fn employees_of(&self, position: Uuid) -> Result<BTreeSet<Uuid>> {
    self.require_position(position)?;
    Ok(
      self
        .employees
        .values()
        .filter(|e| e.position_id == Some(position))
        .map(|e| e.employee_id)
        .collect(),
    )
  }

  /// Positions with no supervisor, or whose supervisor is missing.
  pub fn roots(&self) -> BTreeSet<Uuid> {
    self
      .positions
      .values()
      .filter(|p| {
        p.supervisor_id
          .is_none_or(|s| !self.positions.contains_key(&s))
      })
      .map(|p| p.position_id)
      .collect()
  }

  /// Whether making `supervisor` the supervisor of `position` would put
  /// `position` on its own ancestor chain.
  pub fn would_create_cycle(&self, position: Uuid, supervisor: Uuid) -> Result<bool> {
    self.require_position(position)?;
    self.require_position(supervisor)?;
    if position == supervisor {
      return Ok(true);
    }
    Ok(self.ancestors_of(supervisor)?.contains(&position))
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Point `position` at a new supervisor (or make it a root).
  ///
  /// The cycle check runs before anything changes; on error the graph is
  /// untouched.
  pub fn set_supervisor(
    &mut self,
    position: Uuid,
    supervisor: Option<Uuid>,
  ) -> Result<()> {
    if let Some(s) = supervisor
      && self.would_create_cycle(position, s)?
    {
      return Err(Error::CycleDetected { position_id: position, supervisor_id: s });
    }
    let node = self
      .positions
      .get_mut(&position)
      .ok_or(Error::PositionNotFound(position))?;
    node.supervisor_id = supervisor;
    Ok(())
  }

  /// Move an employee to `position` (or leave them unassigned). Employees
  /// are leaves, so this cannot create a cycle.
  pub fn set_employee_position(
    &mut self,
    employee: Uuid,
    position: Option<Uuid>,
  ) -> Result<()> {
    if let Some(p) = position {
      self.require_position(p)?;
    }
    let node = self
      .employees
      .get_mut(&employee)
      .ok_or(Error::EmployeeNotFound(employee))?;
    node.position_id = position;
    Ok(())
  }

  // ── Tree view ───────────────────────────────────────────────────────────

  /// The org chart: one tree per root, siblings and employees sorted by
  /// name.
  pub fn tree(&self) -> Vec<OrgNode> {
    let mut roots: Vec<&PositionNode> = self
      .roots()
      .into_iter()
      .filter_map(|id| self.positions.get(&id))
      .collect();
    roots.sort_by(|a, b| a.description.cmp(&b.description));
    let budget = self.positions.len();
    roots.into_iter().map(|p| self.subtree(p, budget)).collect()
  }

  fn subtree(&self, node: &PositionNode, budget: usize) -> OrgNode {
    let mut employees: Vec<EmployeeLeaf> = self
      .employees
      .values()
      .filter(|e| e.position_id == Some(node.position_id))
      .map(|e| EmployeeLeaf { employee_id: e.employee_id, name: e.name.clone() })
      .collect();
    employees.sort_by(|a, b| a.name.cmp(&b.name));

    let mut children: Vec<&PositionNode> = self
      .children(node.position_id)
      .filter_map(|id| self.positions.get(&id))
      .collect();
    children.sort_by(|a, b| a.description.cmp(&b.description));

    let reports = if budget == 0 {
      Vec::new()
    } else {
      children
        .into_iter()
        .map(|c| self.subtree(c, budget - 1))
        .collect()
    };

    OrgNode {
      position_id: node.position_id,
      description: node.description.clone(),
      employees,
      reports,
    }
  }

  fn children(&self, position: Uuid) -> impl Iterator<Item = Uuid> + '_ {
    self
      .positions
      .values()
      .filter(move |p| p.supervisor_id == Some(position) && p.position_id != position)
      .map(|p| p.position_id)
  }
}
