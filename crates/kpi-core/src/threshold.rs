//! Threshold evaluation: maps a captured value onto a semaphore colour.
//!
//! Numeric KPIs carry an ordered list of `[lower, upper]` ranges, each tagged
//! with a colour. Bounds are inclusive and the first matching range wins, so
//! overlapping configurations resolve in configuration order. A value that no
//! range covers is a configuration gap and yields [`Color::None`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error, Result,
  catalog::{KpiDefinition, KpiKind},
};

// ─── Colour ──────────────────────────────────────────────────────────────────

/// Semaphore status of a captured value.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
  Green,
  Yellow,
  Red,
  #[default]
  None,
}

// ─── Ranges ──────────────────────────────────────────────────────────────────

/// One `(lower, upper, colour)` triple of a numeric KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
  pub lower: f64,
  pub upper: f64,
  pub color: Color,
}

impl ThresholdRange {
  pub fn new(lower: f64, upper: f64, color: Color) -> Self {
    Self { lower, upper, color }
  }

  /// Inclusive on both ends.
  pub fn contains(&self, value: f64) -> bool {
    self.lower <= value && value <= self.upper
  }
}

/// Colour of the first range containing `value`, or [`Color::None`].
pub fn color_for(ranges: &[ThresholdRange], value: f64) -> Color {
  ranges
    .iter()
    .find(|r| r.contains(value))
    .map_or(Color::None, |r| r.color)
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// Untrusted input as submitted by a client: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
  Number(f64),
  Text(String),
}

impl From<f64> for RawValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<&str> for RawValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

/// A validated, stored capture value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureValue {
  Number(f64),
  Text(String),
}

impl CaptureValue {
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Text(_) => None,
    }
  }

  /// Whether a numeric value reaches `target`. Informative only; the colour
  /// is decided by the ranges alone.
  pub fn meets_target(&self, target: Option<f64>) -> Option<bool> {
    Some(self.as_number()? >= target?)
  }
}

/// Result of evaluating a raw value against a KPI definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
  pub value: CaptureValue,
  pub color: Color,
}

impl Evaluation {
  pub fn meets_target(&self, target: Option<f64>) -> Option<bool> {
    self.value.meets_target(target)
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Validate `raw` for `kpi` and derive its colour.
///
/// Criterion KPIs store the value verbatim and never get a colour. Numeric
/// KPIs accept JSON numbers and numeric strings; anything else, including
/// NaN and infinities, is rejected with [`Error::InvalidCaptureValue`].
pub fn evaluate(kpi: &KpiDefinition, raw: RawValue) -> Result<Evaluation> {
  match &kpi.kind {
    KpiKind::Criterion => {
      let text = match raw {
        RawValue::Text(s) => s,
        RawValue::Number(n) => n.to_string(),
      };
      Ok(Evaluation { value: CaptureValue::Text(text), color: Color::None })
    }
    KpiKind::Numeric { ranges, .. } => {
      let value = parse_numeric(kpi, raw)?;
      Ok(Evaluation {
        value: CaptureValue::Number(value),
        color: color_for(ranges, value),
      })
    }
  }
}

fn parse_numeric(kpi: &KpiDefinition, raw: RawValue) -> Result<f64> {
  let invalid = |reason: String| Error::InvalidCaptureValue {
    kpi_id: kpi.kpi_id,
    reason,
  };

  let value = match raw {
    RawValue::Number(n) => n,
    RawValue::Text(s) => {
      let trimmed = s.trim();
      if trimmed.is_empty() {
        return Err(invalid("empty value for a numeric kpi".into()));
      }
      trimmed
        .parse::<f64>()
        .map_err(|_| invalid(format!("{trimmed:?} is not a number")))?
    }
  };

  if !value.is_finite() {
    return Err(invalid(format!("{value} is not a finite number")));
  }
  Ok(value)
}
