//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use kpi_core::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// A domain rule rejected the request.
  #[error("{message}")]
  Rejected {
    status:  StatusCode,
    code:    &'static str,
    message: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain rejections keep their code, anything
  /// else is an internal failure.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    if let Some(domain) = e.domain() {
      warn!(code = domain.code(), error = %domain, "request rejected");
      return ApiError::Rejected {
        status:  status_for(domain),
        code:    domain.code(),
        message: domain.to_string(),
      };
    }
    ApiError::Store(Box::new(e))
  }

  fn code(&self) -> &'static str {
    match self {
      ApiError::Unauthorized => "unauthorized",
      ApiError::Forbidden(_) => "forbidden",
      ApiError::NotFound(_) => "not_found",
      ApiError::Rejected { code, .. } => *code,
      ApiError::Store(_) => "internal",
    }
  }
}

fn status_for(e: &kpi_core::Error) -> StatusCode {
  use kpi_core::Error as E;
  match e {
    e if e.is_not_found() => StatusCode::NOT_FOUND,
    E::AlreadyClosed { .. }
    | E::CycleDetected { .. }
    | E::PeriodNotOpen(_)
    | E::DuplicateExternalId(_) => StatusCode::CONFLICT,
    E::InvalidCaptureValue { .. }
    | E::UnassignedKpi { .. }
    | E::InvalidDefinition(_)
    | E::InvalidPeriod(_)
    | E::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    E::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Rejected { status, .. } => *status,
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let message = match &self {
      ApiError::Rejected { message, .. } => message.clone(),
      other => other.to_string(),
    };

    let mut res =
      (status, Json(json!({ "error": self.code(), "message": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"kpi\""),
      );
    }
    res
  }
}
