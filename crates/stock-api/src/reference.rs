//! Handlers for `/reference`: lookup vocabularies and collines.
//!
//! Reads are public; replacing a list requires authentication.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use stock_core::{
  reference::{Colline, Vocabulary},
  store::ReferenceStore,
};

use crate::{AppState, Backend, auth::Authenticated, error::ApiError};

fn vocabulary(name: &str) -> Result<Vocabulary, ApiError> {
  name
    .parse()
    .map_err(|_| ApiError::NotFound(format!("vocabulary {name:?}")))
}

/// `GET /reference/{vocabulary}`
pub async fn values<S: Backend>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
  let values = state
    .store
    .values(vocabulary(&name)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(values))
}

/// `PUT /reference/{vocabulary}`, body: `["a", "b"]`
pub async fn replace_values<S: Backend>(
  State(state): State<AppState<S>>,
  Authenticated(subject): Authenticated,
  Path(name): Path<String>,
  Json(body): Json<Vec<String>>,
) -> Result<StatusCode, ApiError> {
  let vocab = vocabulary(&name)?;
  state
    .store
    .replace_values(vocab, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(%subject, %vocab, "vocabulary replaced");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /reference/collines`
pub async fn all_collines<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Colline>>, ApiError> {
  let collines = state.store.collines(None).await.map_err(ApiError::store)?;
  Ok(Json(collines))
}

/// `GET /reference/collines/{district}`
pub async fn district_collines<S: Backend>(
  State(state): State<AppState<S>>,
  Path(district): Path<String>,
) -> Result<Json<Vec<Colline>>, ApiError> {
  let collines = state
    .store
    .collines(Some(district))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(collines))
}

/// `PUT /reference/collines/{district}`, body: `["Mubuga", "Itaba"]`
pub async fn replace_collines<S: Backend>(
  State(state): State<AppState<S>>,
  Authenticated(_): Authenticated,
  Path(district): Path<String>,
  Json(body): Json<Vec<String>>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .replace_collines(district, body)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
