//! Operation registry, a name-keyed command dispatcher.
//!
//! Operations are registered once at start-up into an explicit
//! [`OperationRegistry`], which is then shared read-only. A caller resolves an
//! operation by name and runs it against a store. Each name is claimed by
//! exactly one operation: a second claimant is refused at registration time.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{
  Error, Result,
  filter::MovementQuery,
  movement::{Livraison, LivraisonRow, NewLivraison, NewTransfert, Transfert, TransfertRow},
  store::MovementStore,
};

// ─── Requests and outputs ────────────────────────────────────────────────────

/// Arguments handed to [`Operation::run`]. Which variant an operation accepts
/// depends on the operation.
#[derive(Debug, Clone)]
pub enum OperationRequest {
  /// For operations that take no arguments.
  Empty,
  CreateTransfert(NewTransfert),
  CreateLivraison(NewLivraison),
  ViewMovements(MovementQuery),
}

impl OperationRequest {
  fn label(&self) -> &'static str {
    match self {
      Self::Empty => "empty",
      Self::CreateTransfert(_) => "create_transfert",
      Self::CreateLivraison(_) => "create_livraison",
      Self::ViewMovements(_) => "view_movements",
    }
  }
}

/// What an operation produced. Serialises to the bare payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
  Done,
  Tables(Vec<String>),
  Transfert(Transfert),
  Livraison(Livraison),
  TransfertRows(Vec<TransfertRow>),
  LivraisonRows(Vec<LivraisonRow>),
}

#[derive(Debug, Error)]
pub enum OperationError {
  #[error(transparent)]
  Core(#[from] Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl OperationError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// The request variant did not fit the operation it was sent to.
  pub fn unexpected(operation: &str, request: &OperationRequest) -> Self {
    Self::Core(Error::Validation(format!(
      "operation {operation:?} cannot handle a {:?} request",
      request.label()
    )))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A named, runnable operation over a [`MovementStore`].
#[async_trait]
pub trait Operation<S: MovementStore>: Send + Sync {
  /// The single name this operation answers to.
  fn name(&self) -> &'static str;

  fn is_named(&self, name: &str) -> bool { self.name() == name }

  /// Whether callers must authenticate before running this operation.
  fn requires_auth(&self) -> bool { true }

  async fn run(
    &self,
    store: &S,
    request: OperationRequest,
  ) -> Result<OperationOutput, OperationError>;
}

// ─── Registry ────────────────────────────────────────────────────────────────

pub struct OperationRegistry<S> {
  operations: Vec<Arc<dyn Operation<S>>>,
}

impl<S: MovementStore> OperationRegistry<S> {
  pub fn new() -> Self { Self { operations: Vec::new() } }

  /// Add `operation`. Registering the same instance again is a no-op; a
  /// different operation claiming a taken name is a
  /// [`Error::DispatchAmbiguity`].
  pub fn register(&mut self, operation: Arc<dyn Operation<S>>) -> Result<()> {
    if self.operations.iter().any(|op| Arc::ptr_eq(op, &operation)) {
      return Ok(());
    }

    let name = operation.name();
    let clash = self
      .operations
      .iter()
      .any(|op| op.is_named(name) || operation.is_named(op.name()));
    if clash {
      return Err(Error::DispatchAmbiguity(name.to_owned()));
    }

    self.operations.push(operation);
    Ok(())
  }

  /// The one operation answering to `name`.
  pub fn resolve(&self, name: &str) -> Result<Arc<dyn Operation<S>>> {
    let mut matches = self.operations.iter().filter(|op| op.is_named(name));
    match (matches.next(), matches.next()) {
      (Some(op), None) => Ok(Arc::clone(op)),
      (None, _) => Err(Error::UnknownOperation(name.to_owned())),
      // `register` refuses a second claimant, so this only guards the invariant.
      (Some(_), Some(_)) => Err(Error::DispatchAmbiguity(name.to_owned())),
    }
  }

  pub fn count(&self) -> usize { self.operations.len() }

  pub fn names(&self) -> Vec<&'static str> {
    self.operations.iter().map(|op| op.name()).collect()
  }
}

impl<S: MovementStore> Default for OperationRegistry<S> {
  fn default() -> Self { Self::new() }
}

impl<S> fmt::Debug for OperationRegistry<S>
where
  S: MovementStore,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.operations.iter().map(|op| op.name())).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::{LivraisonQuery, TransfertQuery};

  // A store that is never touched; the registry only needs the type.
  struct NoopStore;

  impl MovementStore for NoopStore {
    type Error = std::convert::Infallible;
    async fn create_tables(&self) -> Result<(), Self::Error> { Ok(()) }
    async fn list_tables(&self) -> Result<Vec<String>, Self::Error> { Ok(vec!["noop".into()]) }
    async fn create_transfert(&self, _: NewTransfert) -> Result<Transfert, Self::Error> { unimplemented!() }
    async fn create_livraison(&self, _: NewLivraison) -> Result<Livraison, Self::Error> { unimplemented!() }
    async fn delete_transfert(&self, _: i64) -> Result<bool, Self::Error> { unimplemented!() }
    async fn delete_livraison(&self, _: i64) -> Result<bool, Self::Error> { unimplemented!() }
    async fn transfert_rows(&self, _: &TransfertQuery) -> Result<Vec<TransfertRow>, Self::Error> { Ok(vec![]) }
    async fn livraison_rows(&self, _: &LivraisonQuery) -> Result<Vec<LivraisonRow>, Self::Error> { Ok(vec![]) }
  }

  struct Named(&'static str);

  #[async_trait]
  impl Operation<NoopStore> for Named {
    fn name(&self) -> &'static str { self.0 }

    async fn run(
      &self,
      _: &NoopStore,
      _: OperationRequest,
    ) -> Result<OperationOutput, OperationError> {
      Ok(OperationOutput::Tables(vec![self.0.to_owned()]))
    }
  }

  /// Claims every name, to exercise the two-sided clash check.
  struct Greedy;

  #[async_trait]
  impl Operation<NoopStore> for Greedy {
    fn name(&self) -> &'static str { "greedy" }

    fn is_named(&self, _: &str) -> bool { true }

    async fn run(
      &self,
      _: &NoopStore,
      _: OperationRequest,
    ) -> Result<OperationOutput, OperationError> {
      Ok(OperationOutput::Done)
    }
  }

  fn registry(names: &[&'static str]) -> OperationRegistry<NoopStore> {
    let mut r = OperationRegistry::new();
    for n in names {
      r.register(Arc::new(Named(n))).unwrap();
    }
    r
  }

  #[test]
  fn resolves_by_name_regardless_of_order() {
    for order in [["a", "b", "c"], ["c", "b", "a"], ["b", "a", "c"]] {
      let r = registry(&order);
      assert_eq!(r.resolve("a").unwrap().name(), "a");
      assert_eq!(r.resolve("c").unwrap().name(), "c");
    }
  }

  #[test]
  fn same_instance_twice_is_noop() {
    let mut r = OperationRegistry::<NoopStore>::new();
    let a: Arc<dyn Operation<NoopStore>> = Arc::new(Named("a"));
    r.register(Arc::clone(&a)).unwrap();
    r.register(Arc::clone(&a)).unwrap();
    assert_eq!(r.count(), 1);
  }

  #[test]
  fn second_claimant_is_refused() {
    let mut r = registry(&["a", "b"]);
    let err = r.register(Arc::new(Named("a"))).unwrap_err();
    assert!(matches!(err, Error::DispatchAmbiguity(n) if n == "a"));
    assert_eq!(r.count(), 2);
  }

  #[test]
  fn greedy_operation_is_refused() {
    let mut r = registry(&["a"]);
    assert!(matches!(
      r.register(Arc::new(Greedy)),
      Err(Error::DispatchAmbiguity(_))
    ));
  }

  #[test]
  fn resolve_refuses_two_claimants() {
    // Bypasses `register` to reach the resolve-time check.
    let r = OperationRegistry::<NoopStore> {
      operations: vec![Arc::new(Named("a")), Arc::new(Greedy)],
    };
    assert!(matches!(r.resolve("a"), Err(Error::DispatchAmbiguity(n)) if n == "a"));
    assert_eq!(r.resolve("greedy").unwrap().name(), "greedy");
  }

  #[test]
  fn unknown_name_fails() {
    let r = registry(&["a"]);
    assert!(matches!(r.resolve("z"), Err(Error::UnknownOperation(n)) if n == "z"));
  }

  #[tokio::test]
  async fn resolved_operation_runs() {
    let r = registry(&["a", "b"]);
    let out = r
      .resolve("b")
      .unwrap()
      .run(&NoopStore, OperationRequest::Empty)
      .await
      .unwrap();
    assert!(matches!(out, OperationOutput::Tables(t) if t == ["b"]));
  }
}
