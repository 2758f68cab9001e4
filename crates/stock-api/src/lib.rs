//! JSON HTTP API for the stock movement ledger.
//!
//! Exposes an axum [`Router`] backed by any store implementing the three
//! store traits. Movement and table routes resolve their handler through the
//! [`OperationRegistry`]; operations flagged as requiring authentication
//! check HTTP Basic credentials against the [`CredentialStore`] first.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod movements;
pub mod reference;
pub mod tables;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::HeaderMap,
  routing::{delete, get},
};
use serde::Deserialize;
use stock_core::{
  operation::{OperationOutput, OperationRegistry, OperationRequest},
  store::{CredentialStore, MovementStore, ReferenceStore},
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STOCK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Upper bound on every store call, in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_timeout_secs() -> u64 { 30 }

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the API needs from a storage backend.
pub trait Backend: MovementStore + CredentialStore + ReferenceStore + 'static {}

impl<T> Backend for T where T: MovementStore + CredentialStore + ReferenceStore + 'static {}

/// Shared state threaded through all axum handlers.
pub struct AppState<S: Backend> {
  pub store:    Arc<S>,
  /// Built once at start-up; read-only afterwards.
  pub registry: Arc<OperationRegistry<S>>,
}

impl<S: Backend> AppState<S> {
  /// State with the built-in operations registered.
  pub fn new(store: Arc<S>) -> Result<Self, stock_core::Error> {
    Ok(Self { store, registry: Arc::new(OperationRegistry::with_builtins()?) })
  }
}

impl<S: Backend> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), registry: Arc::clone(&self.registry) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router<S: Backend>(state: AppState<S>) -> Router {
  Router::new()
    // Operations
    .route("/tables", get(tables::view::<S>).post(tables::create::<S>))
    .route(
      "/transferts",
      get(movements::list_transferts::<S>).post(movements::create_transfert::<S>),
    )
    .route(
      "/livraisons",
      get(movements::list_livraisons::<S>).post(movements::create_livraison::<S>),
    )
    // Reference data
    .route("/reference/collines", get(reference::all_collines::<S>))
    .route(
      "/reference/collines/{district}",
      get(reference::district_collines::<S>).put(reference::replace_collines::<S>),
    )
    .route(
      "/reference/{vocabulary}",
      get(reference::values::<S>).put(reference::replace_values::<S>),
    )
    // Credentials
    .route("/credentials", get(credentials::list::<S>).post(credentials::add::<S>))
    .route("/credentials/{subject}", delete(credentials::remove::<S>))
    .route("/users", get(credentials::users::<S>))
    .with_state(state)
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Resolve `name`, authenticate if the operation asks for it, and run it.
pub(crate) async fn dispatch<S: Backend>(
  state:   &AppState<S>,
  headers: &HeaderMap,
  name:    &str,
  request: OperationRequest,
) -> Result<OperationOutput, ApiError> {
  let operation = state.registry.resolve(name)?;
  if operation.requires_auth() {
    let subject = auth::authenticate(state.store.as_ref(), headers).await?;
    tracing::debug!(%subject, operation = name, "authenticated");
  }
  Ok(operation.run(state.store.as_ref(), request).await?)
}

// ─── Integration tests ────────────────────────────────────────────────────────
