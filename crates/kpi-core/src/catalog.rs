//! Catalog entities: positions, employees and KPI definitions.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, threshold::ThresholdRange};

// ─── Positions ───────────────────────────────────────────────────────────────

/// An organisational slot. Positions form a forest through `supervisor_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
  pub position_id:   Uuid,
  pub description:   String,
  pub department:    Option<String>,
  /// `None` for root positions.
  pub supervisor_id: Option<Uuid>,
  /// Assigned KPIs in assignment order.
  pub kpi_ids:       Vec<Uuid>,
  pub created_at:    DateTime<Utc>,
}

impl Position {
  pub fn is_assigned(&self, kpi_id: Uuid) -> bool {
    self.kpi_ids.contains(&kpi_id)
  }
}

/// Input to [`crate::store::KpiStore::add_position`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPosition {
  pub description:   String,
  #[serde(default)]
  pub department:    Option<String>,
  #[serde(default)]
  pub supervisor_id: Option<Uuid>,
}

// ─── Employees ───────────────────────────────────────────────────────────────

/// A member of staff. Employees are never deleted; losing their position
/// leaves them unassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub employee_id: Uuid,
  /// Normalised roster key; unique across employees.
  pub external_id: String,
  pub name:        String,
  pub position_id: Option<Uuid>,
  pub email:       Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::KpiStore::add_employee`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
  pub external_id: String,
  pub name:        String,
  #[serde(default)]
  pub position_id: Option<Uuid>,
  #[serde(default)]
  pub email:       Option<String>,
}

/// Parameters for [`crate::store::KpiStore::list_employees`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeQuery {
  /// Substring match on name or external id.
  pub text:      Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
  /// Restrict results to employees holding one of these positions. Set by
  /// callers from the requester's scope, never from query strings.
  #[serde(skip)]
  pub positions: Option<BTreeSet<Uuid>>,
}

impl EmployeeQuery {
  pub const DEFAULT_LIMIT: usize = 100;
}

// ─── KPI definitions ─────────────────────────────────────────────────────────

/// Discriminant of [`KpiKind`] as stored in the database.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KpiType {
  Numeric,
  Criterion,
}

/// How captured values of a KPI are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KpiKind {
  Numeric {
    #[serde(default)]
    ranges: Vec<ThresholdRange>,
    #[serde(default)]
    target: Option<f64>,
  },
  /// Free-text result with no semaphore.
  Criterion,
}

impl KpiKind {
  pub fn kpi_type(&self) -> KpiType {
    match self {
      Self::Numeric { .. } => KpiType::Numeric,
      Self::Criterion => KpiType::Criterion,
    }
  }

  fn validate(&self) -> Result<()> {
    let Self::Numeric { ranges, target } = self else {
      return Ok(());
    };
    for (i, r) in ranges.iter().enumerate() {
      if !r.lower.is_finite() || !r.upper.is_finite() {
        return Err(Error::InvalidDefinition(format!(
          "range {i} has a non-finite bound"
        )));
      }
      if r.lower > r.upper {
        return Err(Error::InvalidDefinition(format!(
          "range {i} has lower bound {} above upper bound {}",
          r.lower, r.upper
        )));
      }
    }
    if target.is_some_and(|t| !t.is_finite()) {
      return Err(Error::InvalidDefinition("target is not finite".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiDefinition {
  pub kpi_id:      Uuid,
  pub description: String,
  /// Unit of measure, e.g. "%" or "MXN". Informative only.
  pub unit:        Option<String>,
  pub department:  Option<String>,
  pub kind:        KpiKind,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::KpiStore::add_kpi`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewKpi {
  pub description: String,
  #[serde(default)]
  pub unit:        Option<String>,
  #[serde(default)]
  pub department:  Option<String>,
  pub kind:        KpiKind,
}

impl NewKpi {
  /// Reject definitions the evaluator cannot work with. Overlapping ranges
  /// are allowed; the first configured one wins.
  pub fn validate(&self) -> Result<()> {
    if self.description.trim().is_empty() {
      return Err(Error::InvalidDefinition("description is empty".into()));
    }
    self.kind.validate()
  }
}
