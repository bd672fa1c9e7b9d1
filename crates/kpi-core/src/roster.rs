//! One-way import of employees from an external staff roster.
//!
//! Candidates are matched on their normalised external id. Unknown ids become
//! new, unassigned employees (or attached to the position named by their
//! hint, if one with that exact description exists); known ids are skipped
//! without touching the stored record.

use std::{collections::HashSet, future::Future};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::KpiStore;

/// A record offered by the roster feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCandidate {
  pub external_id:   String,
  pub name:          String,
  #[serde(default)]
  pub email:         Option<String>,
  /// Description of the position the roster lists for this person.
  #[serde(default)]
  pub position_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
  pub created: usize,
  pub skipped: usize,
}

/// Outcome of a reconcile request. An unavailable source is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RosterStatus {
  Reconciled(ReconcileReport),
  SourceUnavailable { reason: String },
}

/// Read-only feed of roster candidates.
pub trait RosterSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch(
    &self,
  ) -> impl Future<Output = Result<Vec<RosterCandidate>, Self::Error>> + Send + '_;
}

/// Canonical form of a roster key: the digits of the id, left-padded with
/// zeros to five characters (`"123"` and `"00123"` are the same employee).
/// Ids without digits are kept as trimmed text and padded the same way.
/// Returns `None` for blank ids.
pub fn normalize_external_id(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
  let base = if digits.is_empty() { trimmed } else { digits.as_str() };
  Some(format!("{base:0>5}"))
}

/// The candidates to create after matching against known ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
  /// Candidates with their `external_id` already normalised.
  pub to_create: Vec<RosterCandidate>,
  pub skipped:   usize,
}

/// Match `candidates` against `existing` (normalised ids). Blank ids, blank
/// names and ids repeated within the batch are skipped.
pub fn plan(existing: &HashSet<String>, candidates: Vec<RosterCandidate>) -> ReconcilePlan {
  let mut seen = HashSet::new();
  let mut plan = ReconcilePlan::default();
  for mut candidate in candidates {
    let Some(id) = normalize_external_id(&candidate.external_id) else {
      plan.skipped += 1;
      continue;
    };
    let name = candidate.name.trim();
    if name.is_empty() || existing.contains(&id) || !seen.insert(id.clone()) {
      plan.skipped += 1;
      continue;
    }
    candidate.name = name.to_owned();
    candidate.external_id = id;
    plan.to_create.push(candidate);
  }
  plan
}

/// Pull candidates from `source` and reconcile them into `store`.
///
/// `None` (no roster configured) and fetch failures both yield
/// [`RosterStatus::SourceUnavailable`]; only store failures are errors.
pub async fn reconcile_from<S, R>(
  store: &S,
  source: Option<&R>,
) -> Result<RosterStatus, S::Error>
where
  S: KpiStore,
  R: RosterSource,
{
  let Some(source) = source else {
    warn!("roster import requested but no roster source is configured");
    return Ok(RosterStatus::SourceUnavailable {
      reason: "roster source is not configured".into(),
    });
  };

  let candidates = match source.fetch().await {
    Ok(c) => c,
    Err(e) => {
      warn!(error = %e, "roster source unavailable");
      return Ok(RosterStatus::SourceUnavailable { reason: e.to_string() });
    }
  };

  let report = store.reconcile(candidates).await?;
  info!(created = report.created, skipped = report.skipped, "roster reconciled");
  Ok(RosterStatus::Reconciled(report))
}
