//! [`SqliteStore`], the SQLite implementation of the store traits.

use std::{
  iter,
  path::Path,
  time::{Duration, Instant},
};

use rusqlite::types::Value;
use stock_core::{
  filter::{LivraisonKey, LivraisonQuery, TransfertKey, TransfertQuery},
  movement::{
    BoucleEntry, Livraison, LivraisonRow, NewLivraison, NewTransfert, StockSuivant, Transfert,
    TransfertRow,
  },
  store::MovementStore,
};

use crate::{
  Error, Result,
  encode::{
    MOVEMENT_COLUMNS, RawLivraisonRow, RawTransfertRow, encode_date, leg_values, movement_values,
    read_leg,
  },
  schema::SCHEMA,
  statement::BatchInsert,
};

const STOCK_SUIVANT: BatchInsert = BatchInsert::new("stock_suivant", "transfert_id", &["next_depot"]);

const BOUCLE: BatchInsert = BatchInsert::new(
  "boucle",
  "livraison_id",
  &["return_depot", "input", "quantity", "district", "colline"],
);

/// Applied to every store call unless overridden with
/// [`SqliteStore::with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A movement ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  timeout: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, timeout: DEFAULT_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, timeout: DEFAULT_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  /// Bound every subsequent store call by `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, giving up after the configured
  /// timeout. Writes that must not outlive the timeout use
  /// [`SqliteStore::call_before`] instead.
  pub(crate) async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self.call_before(move |conn, _| f(conn)).await
  }

  /// Like [`SqliteStore::call`], but `f` also receives the call's
  /// [`Deadline`]. A closure still queued when the caller gave up runs after
  /// the deadline, so checking it before `commit` turns that late run into a
  /// rollback.
  pub(crate) async fn call_before<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection, Deadline) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let deadline = Deadline::after(self.timeout);
    match tokio::time::timeout(self.timeout, self.conn.call(move |conn| f(conn, deadline))).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(tokio_rusqlite::Error::Other(e))) => match e.downcast::<Error>() {
        Ok(inner) => Err(*inner),
        Err(e) => Err(Error::Database(tokio_rusqlite::Error::Other(e))),
      },
      Ok(Err(e)) => Err(e.into()),
      Err(_) => {
        tracing::warn!(timeout = ?self.timeout, "store call timed out");
        Err(Error::Timeout(self.timeout))
      }
    }
  }
}

/// The instant after which a store call's caller has stopped waiting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
  /// `None` when the timeout is too large to represent.
  at:      Option<Instant>,
  timeout: Duration,
}

impl Deadline {
  fn after(timeout: Duration) -> Self {
    Self { at: Instant::now().checked_add(timeout), timeout }
  }

  /// Fails once the deadline has passed. An open transaction dropped on the
  /// error rolls back.
  pub(crate) fn check(&self) -> tokio_rusqlite::Result<()> {
    match self.at {
      Some(at) if Instant::now() >= at => {
        tracing::warn!(timeout = ?self.timeout, "deadline passed before commit; rolling back");
        Err(tokio_rusqlite::Error::Other(Box::new(Error::Timeout(self.timeout))))
      }
      _ => Ok(()),
    }
  }
}

// ─── MovementStore impl ──────────────────────────────────────────────────────

impl MovementStore for SqliteStore {
  type Error = Error;

  // ── Administration ────────────────────────────────────────────────────────

  async fn create_tables(&self) -> Result<()> { self.init_schema().await }

  async fn list_tables(&self) -> Result<Vec<String>> {
    self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
           ORDER BY name",
        )?;
        let names = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
      })
      .await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_transfert(&self, input: NewTransfert) -> Result<Transfert> {
    input.validate()?;

    let child_sql = STOCK_SUIVANT.sql(input.stock_suivant.len())?;
    let children =
      STOCK_SUIVANT.flatten(input.stock_suivant.iter().map(|d| [Value::Text(d.clone())]))?;
    let parent = movement_values(&input.movement);
    let legs = children.len();

    let (id, stock_suivant) = self
      .call_before(move |conn, deadline| {
        deadline.check()?;
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO transfert ({MOVEMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params_from_iter(parent),
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
          &child_sql,
          rusqlite::params_from_iter(iter::once(Value::Integer(id)).chain(children)),
        )?;

        let stock_suivant = {
          let mut stmt = tx.prepare(
            "SELECT id, transfert_id, next_depot FROM stock_suivant
             WHERE transfert_id = ?1 ORDER BY id",
          )?;
          stmt
            .query_map([id], |row| {
              Ok(StockSuivant {
                id:           row.get(0)?,
                transfert_id: row.get(1)?,
                next_depot:   row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        deadline.check()?;
        tx.commit()?;
        Ok((id, stock_suivant))
      })
      .await?;

    tracing::info!(id, legs, "transfert recorded");
    Ok(Transfert { id, movement: input.movement, stock_suivant })
  }

  async fn create_livraison(&self, input: NewLivraison) -> Result<Livraison> {
    input.validate()?;

    let child_sql = BOUCLE.sql(input.boucle.len())?;
    let children = BOUCLE.flatten(input.boucle.iter().map(leg_values))?;
    let mut parent = movement_values(&input.movement);
    parent.push(Value::Text(input.target_district.clone()));
    let legs = input.boucle.len();

    let (id, boucle) = self
      .call_before(move |conn, deadline| {
        deadline.check()?;
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO livraison ({MOVEMENT_COLUMNS}, target_district)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
          ),
          rusqlite::params_from_iter(parent),
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
          &child_sql,
          rusqlite::params_from_iter(iter::once(Value::Integer(id)).chain(children)),
        )?;

        let boucle = {
          let mut stmt = tx.prepare(
            "SELECT id, livraison_id, return_depot, input, quantity, district, colline
             FROM boucle WHERE livraison_id = ?1 ORDER BY id",
          )?;
          stmt
            .query_map([id], |row| {
              Ok(BoucleEntry {
                id:           row.get(0)?,
                livraison_id: row.get(1)?,
                leg:          read_leg(row, 2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        deadline.check()?;
        tx.commit()?;
        Ok((id, boucle))
      })
      .await?;

    tracing::info!(id, legs, "livraison recorded");
    Ok(Livraison {
      id,
      movement: input.movement,
      target_district: input.target_district,
      boucle,
    })
  }

  async fn delete_transfert(&self, id: i64) -> Result<bool> {
    let deleted = self
      .call(move |conn| Ok(conn.execute("DELETE FROM transfert WHERE id = ?1", [id])?))
      .await?;
    tracing::info!(id, deleted, "transfert delete");
    Ok(deleted > 0)
  }

  async fn delete_livraison(&self, id: i64) -> Result<bool> {
    let deleted = self
      .call(move |conn| Ok(conn.execute("DELETE FROM livraison WHERE id = ?1", [id])?))
      .await?;
    tracing::info!(id, deleted, "livraison delete");
    Ok(deleted > 0)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn transfert_rows(&self, query: &TransfertQuery) -> Result<Vec<TransfertRow>> {
    let date = query.date.date().map(encode_date);
    let (official, depot) = match &query.key {
      TransfertKey::Any => (None, None),
      TransfertKey::Official(o) => (Some(o.clone()), None),
      TransfertKey::OriginDepot(d) => (None, Some(d.clone())),
    };
    tracing::debug!(?query, "reading transferts");

    let raws: Vec<RawTransfertRow> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT t.id, {columns}, ss.next_depot
           FROM transfert t
           JOIN stock_suivant ss ON ss.transfert_id = t.id
           WHERE (?1 IS NULL OR t.date = ?1)
             AND (?2 IS NULL OR t.logistic_official = ?2)
             AND (?3 IS NULL OR t.origin_depot = ?3)
           ORDER BY t.date DESC, t.id DESC, ss.id ASC",
          columns = prefixed("t", MOVEMENT_COLUMNS),
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date, official, depot], RawTransfertRow::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransfertRow::into_row).collect()
  }

  async fn livraison_rows(&self, query: &LivraisonQuery) -> Result<Vec<LivraisonRow>> {
    let date = query.date.date().map(encode_date);
    let (official, district) = match &query.key {
      LivraisonKey::Any => (None, None),
      LivraisonKey::Official(o) => (Some(o.clone()), None),
      LivraisonKey::District(d) => (None, Some(d.clone())),
    };
    tracing::debug!(?query, "reading livraisons");

    let raws: Vec<RawLivraisonRow> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT l.id, {columns}, l.target_district,
                  b.return_depot, b.input, b.quantity, b.district, b.colline
           FROM livraison l
           JOIN boucle b ON b.livraison_id = l.id
           WHERE (?1 IS NULL OR l.date = ?1)
             AND (?2 IS NULL OR l.logistic_official = ?2)
             AND (?3 IS NULL OR l.target_district = ?3)
           ORDER BY l.date DESC, l.id DESC, b.id ASC",
          columns = prefixed("l", MOVEMENT_COLUMNS),
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date, official, district], RawLivraisonRow::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLivraisonRow::into_row).collect()
  }
}

/// `"a, b"` → `"t.a, t.b"`.
fn prefixed(alias: &str, columns: &str) -> String {
  columns
    .split(',')
    .map(|c| format!("{alias}.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}
