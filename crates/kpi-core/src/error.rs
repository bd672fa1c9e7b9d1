//! Error types for `kpi-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::period::Period;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid value for kpi {kpi_id}: {reason}")]
  InvalidCaptureValue { kpi_id: Uuid, reason: String },

  #[error("kpi {kpi_id} is not assigned to position {position_id}")]
  UnassignedKpi { position_id: Uuid, kpi_id: Uuid },

  #[error("period {period} is already closed for position {position_id}, kpi {kpi_id}")]
  AlreadyClosed {
    position_id: Uuid,
    kpi_id:      Uuid,
    period:      Period,
  },

  #[error("making {supervisor_id} the supervisor of {position_id} would create a cycle")]
  CycleDetected { position_id: Uuid, supervisor_id: Uuid },

  #[error("roster source unavailable: {0}")]
  SourceUnavailable(String),

  #[error("period {0} is not open for capture")]
  PeriodNotOpen(Period),

  #[error("invalid period: {0:?}")]
  InvalidPeriod(String),

  #[error("invalid kpi definition: {0}")]
  InvalidDefinition(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("position not found: {0}")]
  PositionNotFound(Uuid),

  #[error("employee not found: {0}")]
  EmployeeNotFound(Uuid),

  #[error("kpi not found: {0}")]
  KpiNotFound(Uuid),

  #[error("an employee with external id {0:?} already exists")]
  DuplicateExternalId(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Stable machine-readable identifier surfaced to API clients.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidCaptureValue { .. } => "invalid_capture_value",
      Self::UnassignedKpi { .. } => "unassigned_kpi",
      Self::AlreadyClosed { .. } => "already_closed",
      Self::CycleDetected { .. } => "cycle_detected",
      Self::SourceUnavailable(_) => "source_unavailable",
      Self::PeriodNotOpen(_) => "period_not_open",
      Self::InvalidPeriod(_) => "invalid_period",
      Self::InvalidDefinition(_) => "invalid_definition",
      Self::InvalidInput(_) => "invalid_input",
      Self::PositionNotFound(_) => "position_not_found",
      Self::EmployeeNotFound(_) => "employee_not_found",
      Self::KpiNotFound(_) => "kpi_not_found",
      Self::DuplicateExternalId(_) => "duplicate_external_id",
      Self::Serialization(_) => "serialization",
    }
  }

  /// `true` for the lookup failures that map to "not found".
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::PositionNotFound(_) | Self::EmployeeNotFound(_) | Self::KpiNotFound(_)
    )
  }
}

/// Implemented by backend error types so higher layers can tell a domain
/// rejection apart from an infrastructure failure.
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

impl DomainError for std::convert::Infallible {
  fn domain(&self) -> Option<&Error> { match *self {} }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
