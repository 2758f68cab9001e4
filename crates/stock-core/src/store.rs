//! Store traits implemented by storage backends (e.g. `stock-store-sqlite`).
//!
//! Higher layers (`stock-api`, the built-in operations) depend on these
//! abstractions, not on a concrete backend. All methods return `Send`
//! futures so the traits can be used from a multi-threaded runtime.

use std::future::Future;

use crate::{
  credential::{Credential, User},
  filter::{LivraisonQuery, TransfertQuery},
  movement::{Livraison, LivraisonRow, NewLivraison, NewTransfert, Transfert, TransfertRow},
  reference::{Colline, Vocabulary},
};

// ─── Movements ───────────────────────────────────────────────────────────────

/// The movement ledger: atomic writer plus filtered reader.
pub trait MovementStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Administration ────────────────────────────────────────────────────

  /// Create every table that does not exist yet. Idempotent.
  fn create_tables(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Names of the tables currently present in the store.
  fn list_tables(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a Transfert and all of its legs, or nothing at all.
  ///
  /// Input is validated before any statement runs; a Transfert without legs
  /// is rejected.
  fn create_transfert(
    &self,
    input: NewTransfert,
  ) -> impl Future<Output = Result<Transfert, Self::Error>> + Send + '_;

  /// Persist a Livraison and its whole loop, or nothing at all.
  fn create_livraison(
    &self,
    input: NewLivraison,
  ) -> impl Future<Output = Result<Livraison, Self::Error>> + Send + '_;

  /// Delete a Transfert; its legs go with it. Returns `false` if no such id.
  fn delete_transfert(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a Livraison and its loop. Returns `false` if no such id.
  fn delete_livraison(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// One row per (Transfert, leg) pair matching `query`, newest date first.
  /// A Transfert without legs never appears.
  fn transfert_rows<'a>(
    &'a self,
    query: &'a TransfertQuery,
  ) -> impl Future<Output = Result<Vec<TransfertRow>, Self::Error>> + Send + 'a;

  /// One row per (Livraison, Boucle leg) pair matching `query`, newest first.
  fn livraison_rows<'a>(
    &'a self,
    query: &'a LivraisonQuery,
  ) -> impl Future<Output = Result<Vec<LivraisonRow>, Self::Error>> + Send + 'a;
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Hashed caller credentials.
pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store a credential pair. Returns `false`, with nothing written, when the
  /// secret digest is already taken.
  fn add<'a>(
    &'a self,
    subject: &'a str,
    secret: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// `true` iff a stored pair matches both digests.
  fn check<'a>(
    &'a self,
    subject: &'a str,
    secret: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove every credential of `subject`.
  fn remove<'a>(&'a self, subject: &'a str) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn list(&self) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;

  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;
}

// ─── Reference data ──────────────────────────────────────────────────────────

/// Table-backed lookup vocabularies.
pub trait ReferenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn values(
    &self,
    vocabulary: Vocabulary,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Reset a vocabulary to exactly `values`.
  fn replace_values(
    &self,
    vocabulary: Vocabulary,
    values: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Collines of one district, or of every district when `None`.
  fn collines(
    &self,
    district: Option<String>,
  ) -> impl Future<Output = Result<Vec<Colline>, Self::Error>> + Send + '_;

  /// Reset the collines of `district` to exactly `collines`.
  fn replace_collines(
    &self,
    district: String,
    collines: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
