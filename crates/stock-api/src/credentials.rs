//! Handlers for `/credentials` and `/users`. Every route requires authentication.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/credentials` | Stored digests; never clear secrets |
//! | `GET`    | `/users` | Companion list of subject names |
//! | `POST`   | `/credentials` | Body: `{"subject":"…","secret":"…"}`; 409 if the secret is taken |
//! | `DELETE` | `/credentials/{subject}` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use stock_core::{
  credential::{Credential, User},
  store::CredentialStore,
};

use crate::{AppState, Backend, auth::Authenticated, error::ApiError};

/// `GET /credentials`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Credential>>, ApiError> {
  Ok(Json(state.store.list().await.map_err(ApiError::store)?))
}

/// `GET /users`
pub async fn users<S: Backend>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<User>>, ApiError> {
  Ok(Json(state.store.list_users().await.map_err(ApiError::store)?))
}

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub subject: String,
  pub secret:  String,
}

/// `POST /credentials`
pub async fn add<S: Backend>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<AddBody>,
) -> Result<StatusCode, ApiError> {
  let added = state
    .store
    .add(&body.subject, &body.secret)
    .await
    .map_err(ApiError::store)?;
  if !added {
    return Err(ApiError::Conflict("secret already in use".into()));
  }
  Ok(StatusCode::CREATED)
}

/// `DELETE /credentials/{subject}`
pub async fn remove<S: Backend>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(subject): Path<String>,
) -> Result<StatusCode, ApiError> {
  state.store.remove(&subject).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
