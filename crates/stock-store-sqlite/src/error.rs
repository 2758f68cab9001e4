//! Error type for `stock-store-sqlite`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] stock_core::Error),

  /// The database rejected a statement or the connection failed.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sql(#[from] rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  /// A batched insert would need more bound parameters than SQLite allows.
  #[error("{rows} rows of {width} columns exceed the bound parameter limit")]
  TooManyRows { rows: usize, width: usize },

  #[error("store call timed out after {0:?}")]
  Timeout(Duration),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
