//! Multi-row child inserts sized at call time.
//!
//! A parent with N legs is written with a single `INSERT … VALUES (…), (…)`
//! statement. Every placeholder group starts with `?1`, the parent id, which
//! is therefore bound once; the remaining placeholders are numbered in row
//! order so the flattened parameter list lines up with the groups.

use std::fmt::Write as _;

use rusqlite::types::Value;

use crate::{Error, Result};

/// Highest parameter index SQLite accepts (`SQLITE_MAX_VARIABLE_NUMBER`).
pub const MAX_PARAMS: usize = 32_766;

/// `(?1, ?2, …), (?1, …), …` for `rows` groups of `width` child columns.
///
/// Zero rows is an error: the statement would be malformed.
pub fn placeholder_groups(width: usize, rows: usize) -> Result<String> {
  if rows == 0 {
    return Err(stock_core::Error::Validation("no rows to insert".to_owned()).into());
  }
  if rows.saturating_mul(width).saturating_add(1) > MAX_PARAMS {
    return Err(Error::TooManyRows { rows, width });
  }

  let mut sql = String::with_capacity(rows * (6 + width * 6));
  for row in 0..rows {
    if row > 0 {
      sql.push_str(", ");
    }
    sql.push_str("(?1");
    for col in 0..width {
      // Infallible for `String`.
      let _ = write!(sql, ", ?{}", 2 + row * width + col);
    }
    sql.push(')');
  }
  Ok(sql)
}

/// Shape of a child table written in one batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchInsert {
  pub table:         &'static str,
  pub parent_column: &'static str,
  pub columns:       &'static [&'static str],
}

impl BatchInsert {
  pub const fn new(
    table: &'static str,
    parent_column: &'static str,
    columns: &'static [&'static str],
  ) -> Self {
    Self { table, parent_column, columns }
  }

  /// Placeholders per row, excluding the shared parent id.
  pub fn width(&self) -> usize { self.columns.len() }

  /// Statement text for `rows` children.
  pub fn sql(&self, rows: usize) -> Result<String> {
    let groups = placeholder_groups(self.width(), rows)?;
    Ok(format!(
      "INSERT INTO {} ({}, {}) VALUES {groups}",
      self.table,
      self.parent_column,
      self.columns.join(", "),
    ))
  }

  /// Every row's values flattened in statement order, starting at `?2`.
  /// The caller binds the parent id as `?1` in front of them.
  ///
  /// Each row must yield exactly [`width`](Self::width) values.
  pub fn flatten<R, V>(&self, rows: R) -> Result<Vec<Value>>
  where
    R: IntoIterator<Item = V>,
    V: IntoIterator<Item = Value>,
  {
    let mut values = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
      let before = values.len();
      values.extend(row);
      let got = values.len() - before;
      if got != self.width() {
        return Err(
          stock_core::Error::Validation(format!(
            "{} row {index} has {got} values, expected {}",
            self.table,
            self.width()
          ))
          .into(),
        );
      }
    }
    Ok(values)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAIR: BatchInsert = BatchInsert::new("legs", "parent_id", &["a", "b"]);

  #[test]
  fn zero_rows_is_rejected() {
    assert!(matches!(
      placeholder_groups(1, 0),
      Err(Error::Core(stock_core::Error::Validation(_)))
    ));
    assert!(PAIR.sql(0).is_err());
  }

  #[test]
  fn one_row() {
    assert_eq!(placeholder_groups(1, 1).unwrap(), "(?1, ?2)");
    assert_eq!(
      PAIR.sql(1).unwrap(),
      "INSERT INTO legs (parent_id, a, b) VALUES (?1, ?2, ?3)"
    );
  }

  #[test]
  fn many_rows_share_parent_placeholder() {
    assert_eq!(placeholder_groups(1, 3).unwrap(), "(?1, ?2), (?1, ?3), (?1, ?4)");
    assert_eq!(
      placeholder_groups(5, 2).unwrap(),
      "(?1, ?2, ?3, ?4, ?5, ?6), (?1, ?7, ?8, ?9, ?10, ?11)"
    );
  }

  #[test]
  fn oversized_batch_is_rejected() {
    assert!(matches!(
      placeholder_groups(5, MAX_PARAMS / 5 + 1),
      Err(Error::TooManyRows { width: 5, .. })
    ));
    assert!(placeholder_groups(1, MAX_PARAMS - 1).is_ok());
  }

  #[test]
  fn values_are_flattened_in_row_order() {
    let rows = vec![
      vec![Value::Text("x".into()), Value::Text("y".into())],
      vec![Value::Text("z".into()), Value::Text("w".into())],
    ];
    let values = PAIR.flatten(rows).unwrap();
    assert_eq!(values.len(), 4);
    // `?4` in the statement, i.e. index 2 once `?1` is bound in front.
    assert_eq!(values[2], Value::Text("z".into()));
  }

  #[test]
  fn ragged_row_is_rejected() {
    let rows = vec![vec![Value::Text("x".into())]];
    assert!(PAIR.flatten(rows).is_err());
  }
}
