//! SQLite backend for the stock movement ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That thread owns the single
//! connection, so every call is serialised on it.

mod credentials;
mod encode;
mod reference;
mod schema;
mod store;

pub mod error;
pub mod statement;

pub use error::{Error, Result};
pub use store::SqliteStore;
