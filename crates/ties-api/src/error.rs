//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A violated relation invariant or an unresolvable selection/view id —
  /// the store's validation taxonomy, passed through unchanged.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by walking its source chain for the core
  /// taxonomy. Validation failures surface as 422 and missing records as
  /// 404; anything else is an internal storage error.
  pub fn from_store<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    use ties_core::Error as Core;

    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error);
    let mut current: Option<&(dyn std::error::Error + 'static)> =
      Some(boxed.as_ref());
    while let Some(err) = current {
      if let Some(core) = err.downcast_ref::<Core>() {
        return match core {
          Core::TypeNotFound(_)
          | Core::RelationNotFound(_)
          | Core::PartnerNotFound(_) => Self::NotFound(core.to_string()),
          _ => Self::Validation(core.to_string()),
        };
      }
      current = err.source();
    }
    Self::Store(boxed)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_validation_and_not_found() {
    let err = ApiError::from_store(ties_core::Error::OverlappingDuplicate);
    assert!(matches!(err, ApiError::Validation(_)));

    let err =
      ApiError::from_store(ties_core::Error::RelationNotFound(uuid::Uuid::nil()));
    assert!(matches!(err, ApiError::NotFound(_)));
  }

  #[test]
  fn classifies_through_wrapping_errors() {
    #[derive(Debug, thiserror::Error)]
    #[error("store: {0}")]
    struct Wrapper(#[from] ties_core::Error);

    let err = ApiError::from_store(Wrapper(ties_core::Error::SelfRelationNotAllowed));
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[test]
  fn opaque_errors_stay_internal() {
    let err = ApiError::from_store(std::io::Error::other("disk on fire"));
    assert!(matches!(err, ApiError::Store(_)));
  }
}
