//! Visibility scoping.
//!
//! A member sees their own position plus the positions below it, down to a
//! configured depth. The default depth is one: direct reports only, never
//! grandchildren. Administrators see everything.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Result, hierarchy::HierarchyGraph};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Member,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
  pub username:    String,
  pub role:        Role,
  /// The position the caller occupies; members without one see nothing.
  pub position_id: Option<Uuid>,
}

impl Actor {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// The set of positions an actor may view and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "positions", rename_all = "snake_case")]
pub enum Scope {
  All,
  Positions(BTreeSet<Uuid>),
}

impl Scope {
  pub fn permits(&self, position: Uuid) -> bool {
    match self {
      Self::All => true,
      Self::Positions(set) => set.contains(&position),
    }
  }

  /// Like [`Self::permits`], treating "no position" as admin-only.
  pub fn permits_optional(&self, position: Option<Uuid>) -> bool {
    match position {
      Some(p) => self.permits(p),
      None => matches!(self, Self::All),
    }
  }
}

/// Computes and memoises per-position scopes over a [`HierarchyGraph`],
/// keyed by `(position, depth)`.
///
/// The memo is only valid for the graph it was filled from; callers that
/// mutate supervisor edges must call [`ScopeResolver::invalidate`] in the
/// same unit of work.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
  memo: HashMap<(Uuid, usize), BTreeSet<Uuid>>,
}

impl ScopeResolver {
  pub const DEFAULT_DEPTH: usize = 1;

  pub fn new() -> Self { Self::default() }

  /// A memoised scope for a member at `position`, if one is held.
  pub fn lookup(&self, position: Uuid, depth: usize) -> Option<Scope> {
    self
      .memo
      .get(&(position, depth))
      .map(|set| Scope::Positions(set.clone()))
  }

  /// `{position} ∪ descendants within depth`.
  pub fn visible_positions_for(
    &mut self,
    graph: &HierarchyGraph,
    position: Uuid,
    depth: usize,
  ) -> Result<&BTreeSet<Uuid>> {
    let key = (position, depth);
    if !self.memo.contains_key(&key) {
      let set = visible_positions(graph, position, depth)?;
      self.memo.insert(key, set);
    }
    Ok(&self.memo[&key])
  }

  pub fn scope_for(
    &mut self,
    graph: &HierarchyGraph,
    actor: &Actor,
    depth: usize,
  ) -> Result<Scope> {
    if actor.is_admin() {
      return Ok(Scope::All);
    }
    match actor.position_id {
      Some(p) if graph.contains_position(p) => {
        Ok(Scope::Positions(self.visible_positions_for(graph, p, depth)?.clone()))
      }
      _ => Ok(Scope::Positions(BTreeSet::new())),
    }
  }

  pub fn cached(&self) -> usize { self.memo.len() }

  pub fn invalidate(&mut self) { self.memo.clear(); }
}

/// Uncached form of [`ScopeResolver::visible_positions_for`].
pub fn visible_positions(
  graph: &HierarchyGraph,
  position: Uuid,
  depth: usize,
) -> Result<BTreeSet<Uuid>> {
  let mut set = graph.descendants_within(position, depth)?;
  set.insert(position);
  Ok(set)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hierarchy::tests::chain;

  fn member(position_id: Option<Uuid>) -> Actor {
    Actor { username: "ana".into(), role: Role::Member, position_id }
  }

  #[test]
  fn default_scope_is_self_and_direct_reports() {
    let t = chain();
    let mut resolver = ScopeResolver::new();
    let visible = resolver
      .visible_positions_for(&t.graph, t.a, ScopeResolver::DEFAULT_DEPTH)
      .unwrap()
      .clone();

    let mut expected = t.graph.direct_reports_of(t.a).unwrap();
    expected.insert(t.a);
    assert_eq!(visible, expected);
    assert!(!visible.contains(&t.c), "grandchild must not be visible");
    assert!(!visible.contains(&t.root), "supervisor must not be visible");
  }

  #[test]
  fn deeper_scope_reaches_grandchildren() {
    let t = chain();
    let visible = visible_positions(&t.graph, t.a, 2).unwrap();
    assert_eq!(visible, BTreeSet::from([t.a, t.b, t.c]));
    assert_eq!(visible_positions(&t.graph, t.a, 0).unwrap(), BTreeSet::from([t.a]));
  }

  #[test]
  fn admins_see_everything() {
    let t = chain();
    let admin = Actor { username: "root".into(), role: Role::Admin, position_id: None };
    let scope = ScopeResolver::new().scope_for(&t.graph, &admin, 1).unwrap();
    assert!(scope.permits(t.c));
    assert!(scope.permits_optional(None));
  }

  #[test]
  fn member_without_position_sees_nothing() {
    let t = chain();
    let scope = ScopeResolver::new().scope_for(&t.graph, &member(None), 1).unwrap();
    assert_eq!(scope, Scope::Positions(BTreeSet::new()));
    assert!(!scope.permits(t.root));
    assert!(!scope.permits_optional(None));
  }

  #[test]
  fn resolver_memoises_until_invalidated() {
    let t = chain();
    let mut resolver = ScopeResolver::new();
    let scope = resolver.scope_for(&t.graph, &member(Some(t.a)), 1).unwrap();
    resolver.scope_for(&t.graph, &member(Some(t.b)), 1).unwrap();
    resolver.scope_for(&t.graph, &member(Some(t.a)), 2).unwrap();
    assert_eq!(resolver.cached(), 3);
    assert_eq!(resolver.lookup(t.a, 1), Some(scope));
    assert_eq!(resolver.lookup(t.c, 1), None);

    resolver.invalidate();
    assert_eq!(resolver.cached(), 0);
    assert_eq!(resolver.lookup(t.a, 1), None);
  }

  #[test]
  fn role_parses_lowercase() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(Role::Member.to_string(), "member");
  }
}
