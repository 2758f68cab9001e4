//! Core types and trait definitions for the stock movement ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The SQLite backend and the API layer both depend on it.

// Native `async fn` in traits, as in the store traits below.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod error;
pub mod filter;
pub mod movement;
pub mod operation;
pub mod ops;
pub mod reference;
pub mod store;

pub use error::{Error, Result};
