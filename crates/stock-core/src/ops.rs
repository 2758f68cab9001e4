//! The built-in operations and [`OperationRegistry::with_builtins`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
  Result,
  filter::MovementQuery,
  operation::{Operation, OperationError, OperationOutput, OperationRegistry, OperationRequest},
  store::MovementStore,
};

pub const CREATE_TABLES: &str = "create_tables";
pub const VIEW_TABLES: &str = "view_tables";
pub const CREATE_TRANSFERT: &str = "create_transfert";
pub const CREATE_LIVRAISON: &str = "create_livraison";
pub const VIEW_MOVEMENTS: &str = "view_movements";

/// Create any missing table.
pub struct CreateTables;

/// List the tables present in the store.
pub struct ViewTables;

pub struct CreateTransfert;

pub struct CreateLivraison;

/// Filtered read of either movement kind. Open to unauthenticated callers.
pub struct ViewMovements;

#[async_trait]
impl<S: MovementStore> Operation<S> for CreateTables {
  fn name(&self) -> &'static str { CREATE_TABLES }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError> {
    let OperationRequest::Empty = request else {
      return Err(OperationError::unexpected(CREATE_TABLES, &request));
    };
    store.create_tables().await.map_err(OperationError::store)?;
    Ok(OperationOutput::Done)
  }
}

#[async_trait]
impl<S: MovementStore> Operation<S> for ViewTables {
  fn name(&self) -> &'static str { VIEW_TABLES }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError> {
    let OperationRequest::Empty = request else {
      return Err(OperationError::unexpected(VIEW_TABLES, &request));
    };
    let tables = store.list_tables().await.map_err(OperationError::store)?;
    Ok(OperationOutput::Tables(tables))
  }
}

#[async_trait]
impl<S: MovementStore> Operation<S> for CreateTransfert {
  fn name(&self) -> &'static str { CREATE_TRANSFERT }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError> {
    let OperationRequest::CreateTransfert(input) = request else {
      return Err(OperationError::unexpected(CREATE_TRANSFERT, &request));
    };
    input.validate()?;
    let transfert = store
      .create_transfert(input)
      .await
      .map_err(OperationError::store)?;
    Ok(OperationOutput::Transfert(transfert))
  }
}

#[async_trait]
impl<S: MovementStore> Operation<S> for CreateLivraison {
  fn name(&self) -> &'static str { CREATE_LIVRAISON }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError> {
    let OperationRequest::CreateLivraison(input) = request else {
      return Err(OperationError::unexpected(CREATE_LIVRAISON, &request));
    };
    input.validate()?;
    let livraison = store
      .create_livraison(input)
      .await
      .map_err(OperationError::store)?;
    Ok(OperationOutput::Livraison(livraison))
  }
}

#[async_trait]
impl<S: MovementStore> Operation<S> for ViewMovements {
  fn name(&self) -> &'static str { VIEW_MOVEMENTS }

  fn requires_auth(&self) -> bool { false }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError> {
    let OperationRequest::ViewMovements(query) = request else {
      return Err(OperationError::unexpected(VIEW_MOVEMENTS, &request));
    };
    match query {
      MovementQuery::Transfert(q) => {
        let rows = store.transfert_rows(&q).await.map_err(OperationError::store)?;
        Ok(OperationOutput::TransfertRows(rows))
      }
      MovementQuery::Livraison(q) => {
        let rows = store.livraison_rows(&q).await.map_err(OperationError::store)?;
        Ok(OperationOutput::LivraisonRows(rows))
      }
    }
  }
}

impl<S: MovementStore + 'static> OperationRegistry<S> {
  /// A registry holding the five built-in operations.
  pub fn with_builtins() -> Result<Self> {
    let mut registry = Self::new();
    registry.register(Arc::new(CreateTables))?;
    registry.register(Arc::new(ViewTables))?;
    registry.register(Arc::new(CreateTransfert))?;
    registry.register(Arc::new(CreateLivraison))?;
    registry.register(Arc::new(ViewMovements))?;
    Ok(registry)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error,
    filter::{LivraisonQuery, TransfertQuery},
    movement::{Livraison, LivraisonRow, NewLivraison, NewTransfert, Transfert, TransfertRow},
  };

  struct EmptyStore;

  impl MovementStore for EmptyStore {
    type Error = std::convert::Infallible;
    async fn create_tables(&self) -> Result<(), Self::Error> { Ok(()) }
    async fn list_tables(&self) -> Result<Vec<String>, Self::Error> { Ok(vec!["transfert".into()]) }
    async fn create_transfert(&self, _: NewTransfert) -> Result<Transfert, Self::Error> { unimplemented!() }
    async fn create_livraison(&self, _: NewLivraison) -> Result<Livraison, Self::Error> { unimplemented!() }
    async fn delete_transfert(&self, _: i64) -> Result<bool, Self::Error> { Ok(false) }
    async fn delete_livraison(&self, _: i64) -> Result<bool, Self::Error> { Ok(false) }
    async fn transfert_rows(&self, _: &TransfertQuery) -> Result<Vec<TransfertRow>, Self::Error> { Ok(vec![]) }
    async fn livraison_rows(&self, _: &LivraisonQuery) -> Result<Vec<LivraisonRow>, Self::Error> { Ok(vec![]) }
  }

  #[test]
  fn builtins_are_all_registered() {
    let r = OperationRegistry::<EmptyStore>::with_builtins().unwrap();
    assert_eq!(r.count(), 5);
    for name in [CREATE_TABLES, VIEW_TABLES, CREATE_TRANSFERT, CREATE_LIVRAISON, VIEW_MOVEMENTS] {
      assert_eq!(r.resolve(name).unwrap().name(), name);
    }
  }

  #[test]
  fn only_reads_are_public() {
    let r = OperationRegistry::<EmptyStore>::with_builtins().unwrap();
    assert!(!r.resolve(VIEW_MOVEMENTS).unwrap().requires_auth());
    assert!(r.resolve(CREATE_TRANSFERT).unwrap().requires_auth());
    assert!(r.resolve(VIEW_TABLES).unwrap().requires_auth());
  }

  #[tokio::test]
  async fn view_tables_lists_store_tables() {
    let r = OperationRegistry::<EmptyStore>::with_builtins().unwrap();
    let out = r
      .resolve(VIEW_TABLES)
      .unwrap()
      .run(&EmptyStore, OperationRequest::Empty)
      .await
      .unwrap();
    assert!(matches!(out, OperationOutput::Tables(t) if t == ["transfert"]));
  }

  #[tokio::test]
  async fn mismatched_request_is_a_validation_error() {
    let r = OperationRegistry::<EmptyStore>::with_builtins().unwrap();
    let err = r
      .resolve(CREATE_TRANSFERT)
      .unwrap()
      .run(&EmptyStore, OperationRequest::Empty)
      .await
      .unwrap_err();
    assert!(matches!(err, OperationError::Core(Error::Validation(_))));
  }

  #[tokio::test]
  async fn view_movements_dispatches_on_kind() {
    let r = OperationRegistry::<EmptyStore>::with_builtins().unwrap();
    let op = r.resolve(VIEW_MOVEMENTS).unwrap();
    let out = op
      .run(
        &EmptyStore,
        OperationRequest::ViewMovements(MovementQuery::Livraison(LivraisonQuery::all())),
      )
      .await
      .unwrap();
    assert!(matches!(out, OperationOutput::LivraisonRows(rows) if rows.is_empty()));
  }
}
