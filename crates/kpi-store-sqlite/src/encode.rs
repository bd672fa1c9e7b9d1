//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, periods as `YYYY-MM` (which sorts chronologically) and threshold
//! ranges as compact JSON.

use chrono::{DateTime, Utc};
use kpi_core::{
  catalog::{Employee, KpiDefinition, KpiKind, KpiType, Position},
  period::{Capture, Period, PeriodState},
  threshold::{CaptureValue, Color, ThresholdRange},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

pub fn encode_period(p: Period) -> String { p.to_string() }

pub fn decode_period(s: &str) -> Result<Period> {
  s.parse()
    .map_err(|_| Error::Decode(format!("period {s:?}")))
}

fn decode_enum<T: std::str::FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

// ─── Positions ───────────────────────────────────────────────────────────────

pub const POSITION_COLUMNS: &str =
  "position_id, description, department, supervisor_id, created_at";

/// Raw strings read directly from a `positions` row.
pub struct RawPosition {
  pub position_id:   String,
  pub description:   String,
  pub department:    Option<String>,
  pub supervisor_id: Option<String>,
  pub created_at:    String,
}

impl RawPosition {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      position_id:   row.get(0)?,
      description:   row.get(1)?,
      department:    row.get(2)?,
      supervisor_id: row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  /// `kpi_ids` come from `position_kpis`, already in assignment order.
  pub fn into_position(self, kpi_ids: Vec<Uuid>) -> Result<Position> {
    Ok(Position {
      position_id: decode_uuid(&self.position_id)?,
      description: self.description,
      department: self.department,
      supervisor_id: decode_opt_uuid(self.supervisor_id.as_deref())?,
      kpi_ids,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── KPI definitions ─────────────────────────────────────────────────────────

pub const KPI_COLUMNS: &str =
  "kpi_id, description, unit, department, kpi_type, ranges_json, target, created_at";

/// The `(kpi_type, ranges_json, target)` columns for a [`KpiKind`].
pub fn encode_kind(kind: &KpiKind) -> Result<(String, String, Option<f64>)> {
  let kpi_type = kind.kpi_type().as_ref().to_owned();
  match kind {
    KpiKind::Numeric { ranges, target } => {
      Ok((kpi_type, serde_json::to_string(ranges)?, *target))
    }
    KpiKind::Criterion => Ok((kpi_type, "[]".to_owned(), None)),
  }
}

/// Raw strings read directly from a `kpis` row.
pub struct RawKpi {
  pub kpi_id:      String,
  pub description: String,
  pub unit:        Option<String>,
  pub department:  Option<String>,
  pub kpi_type:    String,
  pub ranges_json: String,
  pub target:      Option<f64>,
  pub created_at:  String,
}

impl RawKpi {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kpi_id:      row.get(0)?,
      description: row.get(1)?,
      unit:        row.get(2)?,
      department:  row.get(3)?,
      kpi_type:    row.get(4)?,
      ranges_json: row.get(5)?,
      target:      row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_kpi(self) -> Result<KpiDefinition> {
    let kind = match decode_enum::<KpiType>("kpi type", &self.kpi_type)? {
      KpiType::Numeric => {
        let ranges: Vec<ThresholdRange> = serde_json::from_str(&self.ranges_json)?;
        KpiKind::Numeric { ranges, target: self.target }
      }
      KpiType::Criterion => KpiKind::Criterion,
    };
    Ok(KpiDefinition {
      kpi_id: decode_uuid(&self.kpi_id)?,
      description: self.description,
      unit: self.unit,
      department: self.department,
      kind,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Employees ───────────────────────────────────────────────────────────────

pub const EMPLOYEE_COLUMNS: &str =
  "employee_id, external_id, name, position_id, email, created_at";

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub employee_id: String,
  pub external_id: String,
  pub name:        String,
  pub position_id: Option<String>,
  pub email:       Option<String>,
  pub created_at:  String,
}

impl RawEmployee {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id: row.get(0)?,
      external_id: row.get(1)?,
      name:        row.get(2)?,
      position_id: row.get(3)?,
      email:       row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id: decode_uuid(&self.employee_id)?,
      external_id: self.external_id,
      name:        self.name,
      position_id: decode_opt_uuid(self.position_id.as_deref())?,
      email:       self.email,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Captures ────────────────────────────────────────────────────────────────

pub const CAPTURE_COLUMNS: &str = "position_id, kpi_id, period, value_num, value_text, \
                                   color, state, captured_at, closed_at, closed_by";

/// The `(value_num, value_text)` columns for a capture value.
pub fn encode_value(value: Option<&CaptureValue>) -> (Option<f64>, Option<String>) {
  match value {
    Some(CaptureValue::Number(n)) => (Some(*n), None),
    Some(CaptureValue::Text(s)) => (None, Some(s.clone())),
    None => (None, None),
  }
}

/// Raw strings read directly from a `captures` row.
pub struct RawCapture {
  pub position_id: String,
  pub kpi_id:      String,
  pub period:      String,
  pub value_num:   Option<f64>,
  pub value_text:  Option<String>,
  pub color:       String,
  pub state:       String,
  pub captured_at: Option<String>,
  pub closed_at:   Option<String>,
  pub closed_by:   Option<String>,
}

impl RawCapture {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      position_id: row.get(0)?,
      kpi_id:      row.get(1)?,
      period:      row.get(2)?,
      value_num:   row.get(3)?,
      value_text:  row.get(4)?,
      color:       row.get(5)?,
      state:       row.get(6)?,
      captured_at: row.get(7)?,
      closed_at:   row.get(8)?,
      closed_by:   row.get(9)?,
    })
  }

  pub fn into_capture(self) -> Result<Capture> {
    let value = match (self.value_num, self.value_text) {
      (Some(n), _) => Some(CaptureValue::Number(n)),
      (None, Some(s)) => Some(CaptureValue::Text(s)),
      (None, None) => None,
    };
    Ok(Capture {
      position_id: decode_uuid(&self.position_id)?,
      kpi_id: decode_uuid(&self.kpi_id)?,
      period: decode_period(&self.period)?,
      value,
      color: decode_enum::<Color>("color", &self.color)?,
      state: decode_enum::<PeriodState>("capture state", &self.state)?,
      captured_at: decode_opt_dt(self.captured_at.as_deref())?,
      closed_at: decode_opt_dt(self.closed_at.as_deref())?,
      closed_by: self.closed_by,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numeric_kind_encodes_ranges_as_json() {
    let kind = KpiKind::Numeric {
      ranges: vec![ThresholdRange::new(0.0, 50.0, Color::Red)],
      target: Some(80.0),
    };
    let (kpi_type, ranges_json, target) = encode_kind(&kind).unwrap();
    assert_eq!(kpi_type, "numeric");
    assert_eq!(ranges_json, r#"[{"lower":0.0,"upper":50.0,"color":"red"}]"#);
    assert_eq!(target, Some(80.0));
  }

  #[test]
  fn unknown_color_is_a_decode_error() {
    let raw = RawCapture {
      position_id: encode_uuid(Uuid::new_v4()),
      kpi_id:      encode_uuid(Uuid::new_v4()),
      period:      "2024-05".into(),
      value_num:   Some(1.0),
      value_text:  None,
      color:       "purple".into(),
      state:       "open".into(),
      captured_at: None,
      closed_at:   None,
      closed_by:   None,
    };
    assert!(matches!(raw.into_capture(), Err(Error::Decode(_))));
  }
}
