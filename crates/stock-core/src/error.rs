//! Error types for `stock-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or blank.
  #[error("validation failed: {0}")]
  Validation(String),

  /// A movement was submitted without any child legs.
  #[error("{0} requires at least one leg")]
  EmptyChildList(&'static str),

  #[error("malformed date filter: {0:?}")]
  MalformedDate(String),

  /// More than one operation claims the same name.
  #[error("operation {0:?} is claimed by more than one handler")]
  DispatchAmbiguity(String),

  #[error("no operation registered under {0:?}")]
  UnknownOperation(String),

  #[error("authentication failed")]
  AuthenticationFailure,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
