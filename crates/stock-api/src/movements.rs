//! Handlers for `/transferts` and `/livraisons`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/transferts` | `?date=YYYY-MM-DD\|*` and at most one of `official`, `depot` |
//! | `POST` | `/transferts` | Body: [`NewTransfert`]; returns 201 + stored movement |
//! | `GET`  | `/livraisons` | `?date=…` and at most one of `official`, `district` |
//! | `POST` | `/livraisons` | Body: [`NewLivraison`] |
//!
//! All four go through the operation registry.

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::Deserialize;
use stock_core::{
  filter::{DateFilter, LivraisonKey, LivraisonQuery, MovementQuery, TransfertKey, TransfertQuery},
  movement::{NewLivraison, NewTransfert},
  operation::{OperationOutput, OperationRequest},
  ops::{CREATE_LIVRAISON, CREATE_TRANSFERT, VIEW_MOVEMENTS},
};

use crate::{AppState, Backend, dispatch, error::ApiError};

fn parse_date(date: Option<&str>) -> Result<DateFilter, ApiError> {
  Ok(date.map(str::parse).transpose()?.unwrap_or_default())
}

// ─── Transfert ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TransfertParams {
  /// Exact date or `*`; absent means every date.
  pub date:     Option<String>,
  pub official: Option<String>,
  /// Origin depot.
  pub depot:    Option<String>,
}

impl TransfertParams {
  pub fn into_query(self) -> Result<TransfertQuery, ApiError> {
    let date = parse_date(self.date.as_deref())?;
    let key = match (self.official, self.depot) {
      (None, None) => TransfertKey::Any,
      (Some(o), None) => TransfertKey::Official(o),
      (None, Some(d)) => TransfertKey::OriginDepot(d),
      (Some(_), Some(_)) => {
        return Err(ApiError::BadRequest("filter by official or depot, not both".into()));
      }
    };
    Ok(TransfertQuery::new(date, key))
  }
}

/// `GET /transferts[?date=…][&official=…|&depot=…]`
pub async fn list_transferts<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<TransfertParams>,
) -> Result<Json<OperationOutput>, ApiError> {
  let query = MovementQuery::Transfert(params.into_query()?);
  let rows = dispatch(&state, &headers, VIEW_MOVEMENTS, OperationRequest::ViewMovements(query)).await?;
  Ok(Json(rows))
}

/// `POST /transferts`
pub async fn create_transfert<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<NewTransfert>,
) -> Result<impl IntoResponse, ApiError> {
  let created =
    dispatch(&state, &headers, CREATE_TRANSFERT, OperationRequest::CreateTransfert(body)).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Livraison ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LivraisonParams {
  pub date:     Option<String>,
  pub official: Option<String>,
  /// Target district.
  pub district: Option<String>,
}

impl LivraisonParams {
  pub fn into_query(self) -> Result<LivraisonQuery, ApiError> {
    let date = parse_date(self.date.as_deref())?;
    let key = match (self.official, self.district) {
      (None, None) => LivraisonKey::Any,
      (Some(o), None) => LivraisonKey::Official(o),
      (None, Some(d)) => LivraisonKey::District(d),
      (Some(_), Some(_)) => {
        return Err(ApiError::BadRequest("filter by official or district, not both".into()));
      }
    };
    Ok(LivraisonQuery::new(date, key))
  }
}

/// `GET /livraisons[?date=…][&official=…|&district=…]`
pub async fn list_livraisons<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<LivraisonParams>,
) -> Result<Json<OperationOutput>, ApiError> {
  let query = MovementQuery::Livraison(params.into_query()?);
  let rows = dispatch(&state, &headers, VIEW_MOVEMENTS, OperationRequest::ViewMovements(query)).await?;
  Ok(Json(rows))
}

/// `POST /livraisons`
pub async fn create_livraison<S: Backend>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<NewLivraison>,
) -> Result<impl IntoResponse, ApiError> {
  let created =
    dispatch(&state, &headers, CREATE_LIVRAISON, OperationRequest::CreateLivraison(body)).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn both_keys_is_rejected() {
    let p = TransfertParams {
      date:     None,
      official: Some("Jean".into()),
      depot:    Some("Central-A".into()),
    };
    assert!(matches!(p.into_query(), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn missing_date_means_any() {
    let q = LivraisonParams { district: Some("Gitega".into()), ..Default::default() }
      .into_query()
      .unwrap();
    assert_eq!(q.date, DateFilter::Any);
    assert_eq!(q.key, LivraisonKey::District("Gitega".into()));
  }

  #[test]
  fn malformed_date_is_bad_request() {
    let p = TransfertParams { date: Some("yesterday".into()), ..Default::default() };
    assert!(matches!(p.into_query(), Err(ApiError::BadRequest(_))));
  }
}
