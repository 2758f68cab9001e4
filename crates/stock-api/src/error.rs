//! API error type and [`axum::response::IntoResponse`] implementation.

use std::time::Duration;

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use stock_core::operation::OperationError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("conflict: {0}")]
  Conflict(String),

  /// The operation registry could not pick a handler.
  #[error("dispatch error: {0}")]
  Dispatch(String),

  #[error("timed out after {0:?}")]
  Timeout(Duration),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error. Validation and timeout failures raised by the
  /// SQLite store keep their meaning; anything else is a server error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::from_boxed(Box::new(e))
  }

  fn from_boxed(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
    match e.downcast::<stock_store_sqlite::Error>() {
      Ok(store_err) => match *store_err {
        stock_store_sqlite::Error::Core(core) => core.into(),
        stock_store_sqlite::Error::Timeout(after) => Self::Timeout(after),
        other => Self::Store(Box::new(other)),
      },
      Err(e) => Self::Store(e),
    }
  }
}

impl From<stock_core::Error> for ApiError {
  fn from(e: stock_core::Error) -> Self {
    use stock_core::Error as E;
    match e {
      E::Validation(_) | E::EmptyChildList(_) | E::MalformedDate(_) => {
        Self::BadRequest(e.to_string())
      }
      E::AuthenticationFailure => Self::Unauthorized,
      E::DispatchAmbiguity(_) | E::UnknownOperation(_) => Self::Dispatch(e.to_string()),
    }
  }
}

impl From<OperationError> for ApiError {
  fn from(e: OperationError) -> Self {
    match e {
      OperationError::Core(core) => core.into(),
      OperationError::Store(boxed) => Self::from_boxed(boxed),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Dispatch(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"stock\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_validation_becomes_bad_request() {
    let e = stock_store_sqlite::Error::Core(stock_core::Error::EmptyChildList("transfert"));
    assert!(matches!(ApiError::store(e), ApiError::BadRequest(_)));
  }

  #[test]
  fn store_timeout_is_kept() {
    let e = stock_store_sqlite::Error::Timeout(Duration::from_secs(1));
    assert!(matches!(ApiError::store(e), ApiError::Timeout(_)));
  }

  #[test]
  fn unknown_operation_is_a_server_error() {
    let e: ApiError = stock_core::Error::UnknownOperation("nope".into()).into();
    assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[tokio::test]
  async fn conflict_has_json_body() {
    let res = ApiError::Conflict("secret already in use".into()).into_response();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "conflict: secret already in use");
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::from(stock_core::Error::AuthenticationFailure).into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
