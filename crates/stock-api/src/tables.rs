//! Handlers for `/tables`: table creation and listing, via the registry.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
};
use stock_core::{
  operation::{OperationOutput, OperationRequest},
  ops::{CREATE_TABLES, VIEW_TABLES},
};

use crate::{AppState, Backend, dispatch, error::ApiError};

/// `GET /tables`
pub async fn view<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<OperationOutput>, ApiError> {
  Ok(Json(dispatch(&state, &headers, VIEW_TABLES, OperationRequest::Empty).await?))
}

/// `POST /tables`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
  dispatch(&state, &headers, CREATE_TABLES, OperationRequest::Empty).await?;
  Ok(StatusCode::NO_CONTENT)
}
