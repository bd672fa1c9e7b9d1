//! Monthly evaluation periods and the capture lifecycle.
//!
//! Every (position, KPI, period) triple moves through two states: `Open`,
//! during which the value may be captured and re-captured freely, and
//! `Closed`, after which it is immutable. Only the current period (the most
//! recently opened one) accepts new values. Opening a new period closes
//! whatever the previous ones left open.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{KpiDefinition, Position},
  threshold::{self, CaptureValue, Color, RawValue},
};

// ─── Period ──────────────────────────────────────────────────────────────────

/// A calendar month, rendered as `YYYY-MM`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
  year:  i32,
  month: u32,
}

impl Period {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
      return Err(Error::InvalidPeriod(format!("{year:04}-{month:02}")));
    }
    Ok(Self { year, month })
  }

  /// The period a given date falls in.
  pub fn containing(date: impl Datelike) -> Self {
    Self { year: date.year(), month: date.month() }
  }

  /// The period containing today (UTC).
  pub fn current() -> Self { Self::containing(Utc::now()) }

  pub fn year(self) -> i32 { self.year }

  pub fn month(self) -> u32 { self.month }

  pub fn next(self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidPeriod(s.to_owned());
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
      return Err(invalid());
    }
    let year = year.parse().map_err(|_| invalid())?;
    let month = month.parse().map_err(|_| invalid())?;
    Self::new(year, month).map_err(|_| invalid())
  }
}

impl TryFrom<String> for Period {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Period> for String {
  fn from(p: Period) -> Self { p.to_string() }
}

// ─── Capture ─────────────────────────────────────────────────────────────────

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
pub enum PeriodState {
  #[default]
  Open,
  Closed,
}

/// Identifies one capture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureKey {
  pub position_id: Uuid,
  pub kpi_id:      Uuid,
  pub period:      Period,
}

/// The value recorded for a (position, KPI, period) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
  pub position_id: Uuid,
  pub kpi_id:      Uuid,
  pub period:      Period,
  /// `None` until something is captured; a slot may be closed empty.
  pub value:       Option<CaptureValue>,
  pub color:       Color,
  pub state:       PeriodState,
  pub captured_at: Option<DateTime<Utc>>,
  pub closed_at:   Option<DateTime<Utc>>,
  /// Username of whoever closed the slot; `None` for rollover closes.
  pub closed_by:   Option<String>,
}

impl Capture {
  /// An empty, open slot.
  pub fn open(key: CaptureKey) -> Self {
    Self {
      position_id: key.position_id,
      kpi_id:      key.kpi_id,
      period:      key.period,
      value:       None,
      color:       Color::None,
      state:       PeriodState::Open,
      captured_at: None,
      closed_at:   None,
      closed_by:   None,
    }
  }

  pub fn key(&self) -> CaptureKey {
    CaptureKey {
      position_id: self.position_id,
      kpi_id:      self.kpi_id,
      period:      self.period,
    }
  }

  pub fn is_closed(&self) -> bool { self.state == PeriodState::Closed }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// Everything known about one capture slot at the moment of a transition.
#[derive(Debug, Clone)]
pub struct Slot {
  pub key:        CaptureKey,
  /// Whether `key.period` is the current open period.
  pub is_current: bool,
  /// The stored capture, if the slot has been materialised.
  pub stored:     Option<Capture>,
}

impl Slot {
  /// Validate and apply a capture, returning the capture to persist.
  ///
  /// Re-capturing an open slot overwrites the previous value.
  pub fn capture(
    self,
    position: &Position,
    kpi: &KpiDefinition,
    raw: RawValue,
    now: DateTime<Utc>,
  ) -> Result<Capture> {
    debug_assert_eq!(position.position_id, self.key.position_id);
    debug_assert_eq!(kpi.kpi_id, self.key.kpi_id);

    self.ensure_not_closed()?;
    if !self.is_current {
      return Err(Error::PeriodNotOpen(self.key.period));
    }
    if !position.is_assigned(kpi.kpi_id) {
      return Err(Error::UnassignedKpi {
        position_id: position.position_id,
        kpi_id:      kpi.kpi_id,
      });
    }

    let evaluation = threshold::evaluate(kpi, raw)?;
    let mut capture = self.stored.unwrap_or_else(|| Capture::open(self.key));
    capture.value = Some(evaluation.value);
    capture.color = evaluation.color;
    capture.captured_at = Some(now);
    Ok(capture)
  }

  /// Close the slot, freezing whatever value it holds.
  ///
  /// A stored capture can be closed even after its KPI was unassigned; an
  /// unmaterialised slot only exists for KPIs the position still carries.
  pub fn close(
    self,
    position: &Position,
    closed_by: Option<&str>,
    now: DateTime<Utc>,
  ) -> Result<Capture> {
    debug_assert_eq!(position.position_id, self.key.position_id);

    self.ensure_not_closed()?;
    let mut capture = match self.stored {
      Some(c) => c,
      None if !position.is_assigned(self.key.kpi_id) => {
        return Err(Error::UnassignedKpi {
          position_id: self.key.position_id,
          kpi_id:      self.key.kpi_id,
        });
      }
      None if self.is_current => Capture::open(self.key),
      None => return Err(Error::PeriodNotOpen(self.key.period)),
    };
    capture.state = PeriodState::Closed;
    capture.closed_at = Some(now);
    capture.closed_by = closed_by.map(str::to_owned);
    Ok(capture)
  }

  fn ensure_not_closed(&self) -> Result<()> {
    match &self.stored {
      Some(c) if c.is_closed() => Err(Error::AlreadyClosed {
        position_id: self.key.position_id,
        kpi_id:      self.key.kpi_id,
        period:      self.key.period,
      }),
      _ => Ok(()),
    }
  }
}
