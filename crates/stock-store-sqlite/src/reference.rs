//! [`ReferenceStore`] for [`SqliteStore`].

use stock_core::{
  reference::{Colline, Vocabulary},
  store::ReferenceStore,
};

use crate::{Error, Result, SqliteStore};

/// Trim, drop blanks and repeats, keep first-seen order.
fn normalise(values: Vec<String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(values.len());
  for v in values {
    let v = v.trim();
    if !v.is_empty() && !out.iter().any(|o| o == v) {
      out.push(v.to_owned());
    }
  }
  out
}

impl ReferenceStore for SqliteStore {
  type Error = Error;

  async fn values(&self, vocabulary: Vocabulary) -> Result<Vec<String>> {
    let vocab = vocabulary.as_str();
    self
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT value FROM reference_values WHERE vocabulary = ?1 ORDER BY id")?;
        let values = stmt
          .query_map([vocab], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(values)
      })
      .await
  }

  async fn replace_values(&self, vocabulary: Vocabulary, values: Vec<String>) -> Result<()> {
    let vocab = vocabulary.as_str();
    let values = normalise(values);
    let count = values.len();

    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM reference_values WHERE vocabulary = ?1", [vocab])?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO reference_values (vocabulary, value) VALUES (?1, ?2)")?;
          for value in &values {
            stmt.execute(rusqlite::params![vocab, value])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(%vocabulary, count, "reference vocabulary replaced");
    Ok(())
  }

  async fn collines(&self, district: Option<String>) -> Result<Vec<Colline>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT district, colline FROM collines
           WHERE (?1 IS NULL OR district = ?1)
           ORDER BY district, id",
        )?;
        let rows = stmt
          .query_map([district], |row| {
            Ok(Colline { district: row.get(0)?, colline: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn replace_collines(&self, district: String, collines: Vec<String>) -> Result<()> {
    let district = district.trim().to_owned();
    if district.is_empty() {
      return Err(stock_core::Error::Validation("district must not be empty".into()).into());
    }
    let collines = normalise(collines);
    let count = collines.len();
    let d = district.clone();

    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM collines WHERE district = ?1", [&d])?;
        {
          let mut stmt = tx.prepare("INSERT INTO collines (district, colline) VALUES (?1, ?2)")?;
          for colline in &collines {
            stmt.execute(rusqlite::params![d, colline])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(district, count, "collines replaced");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::normalise;

  #[test]
  fn normalise_trims_and_dedups() {
    let got = normalise(vec![" a ".into(), "b".into(), "".into(), "a".into()]);
    assert_eq!(got, ["a", "b"]);
  }
}
