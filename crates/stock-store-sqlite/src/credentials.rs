//! [`CredentialStore`] for [`SqliteStore`].
//!
//! Only digests reach the `credentials` table. The companion `users` table
//! keeps the clear subject names for administrators and is written in the
//! same transaction, after the credential insert has succeeded.

use rusqlite::{ErrorCode, OptionalExtension as _};
use stock_core::{
  credential::{Credential, User, digest},
  store::CredentialStore,
};

use crate::{Error, Result, SqliteStore};

fn require(field: &str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Err(stock_core::Error::Validation(format!("{field} must not be empty")).into());
  }
  Ok(())
}

impl CredentialStore for SqliteStore {
  type Error = Error;

  async fn add(&self, subject: &str, secret: &str) -> Result<bool> {
    require("subject", subject)?;
    require("secret", secret)?;

    let subject_hash = digest(subject);
    let secret_hash = digest(secret);
    let name = subject.to_owned();

    let added = self
      .call_before(move |conn, deadline| {
        deadline.check()?;
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO credentials (subject_hash, secret_hash) VALUES (?1, ?2)",
          rusqlite::params![subject_hash, secret_hash],
        );
        match inserted {
          Ok(_) => {}
          Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            return Ok(false);
          }
          Err(e) => return Err(e.into()),
        }
        tx.execute("INSERT INTO users (name) VALUES (?1)", [name])?;
        deadline.check()?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if added {
      tracing::info!(subject, "credential added");
    } else {
      tracing::warn!(subject, "credential rejected: secret already in use");
    }
    Ok(added)
  }

  async fn check(&self, subject: &str, secret: &str) -> Result<bool> {
    let subject_hash = digest(subject);
    let secret_hash = digest(secret);

    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM credentials WHERE subject_hash = ?1 AND secret_hash = ?2",
              rusqlite::params![subject_hash, secret_hash],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await
  }

  async fn remove(&self, subject: &str) -> Result<()> {
    let subject_hash = digest(subject);
    let name = subject.to_owned();

    let removed = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM credentials WHERE subject_hash = ?1", [subject_hash])?;
        tx.execute("DELETE FROM users WHERE name = ?1", [name])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    tracing::info!(subject, removed, "credentials removed");
    Ok(())
  }

  async fn list(&self) -> Result<Vec<Credential>> {
    self
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, subject_hash, secret_hash FROM credentials ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Credential {
              id:           row.get(0)?,
              subject_hash: row.get(1)?,
              secret_hash:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    self
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(User { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }
}
