//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text. Read rows are first pulled out as
//! plain strings and converted to domain types outside the connection thread.

use chrono::NaiveDate;
use rusqlite::{Row, types::Value};
use stock_core::movement::{BoucleLeg, LivraisonRow, MovementFields, TransfertRow};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Bound parameters ────────────────────────────────────────────────────────

/// The nine shared parent columns, in schema order.
pub const MOVEMENT_COLUMNS: &str = "date, plate, logistic_official, movement_number, \
                                    origin_depot, destination_depot, transport_type, \
                                    reason, photo_url";

pub fn movement_values(m: &MovementFields) -> Vec<Value> {
  vec![
    Value::Text(encode_date(m.date)),
    Value::Text(m.plate.clone()),
    Value::Text(m.logistic_official.clone()),
    Value::Text(m.movement_number.clone()),
    Value::Text(m.origin_depot.clone()),
    Value::Text(m.destination_depot.clone()),
    Value::Text(m.transport_type.clone()),
    m.reason.clone().map_or(Value::Null, Value::Text),
    m.photo_url.clone().map_or(Value::Null, Value::Text),
  ]
}

pub fn leg_values(leg: &BoucleLeg) -> Vec<Value> {
  vec![
    Value::Text(leg.return_depot.clone()),
    Value::Text(leg.input.clone()),
    Value::Text(leg.quantity.clone()),
    Value::Text(leg.district.clone()),
    Value::Text(leg.colline.clone()),
  ]
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw parent columns, read starting at some column offset.
pub struct RawMovement {
  pub date:              String,
  pub plate:             String,
  pub logistic_official: String,
  pub movement_number:   String,
  pub origin_depot:      String,
  pub destination_depot: String,
  pub transport_type:    String,
  pub reason:            Option<String>,
  pub photo_url:         Option<String>,
}

impl RawMovement {
  /// Read the columns listed in [`MOVEMENT_COLUMNS`] starting at `start`.
  pub fn read(row: &Row<'_>, start: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      date:              row.get(start)?,
      plate:             row.get(start + 1)?,
      logistic_official: row.get(start + 2)?,
      movement_number:   row.get(start + 3)?,
      origin_depot:      row.get(start + 4)?,
      destination_depot: row.get(start + 5)?,
      transport_type:    row.get(start + 6)?,
      reason:            row.get(start + 7)?,
      photo_url:         row.get(start + 8)?,
    })
  }

  pub fn into_fields(self) -> Result<MovementFields> {
    Ok(MovementFields {
      date:              decode_date(&self.date)?,
      plate:             self.plate,
      logistic_official: self.logistic_official,
      movement_number:   self.movement_number,
      origin_depot:      self.origin_depot,
      destination_depot: self.destination_depot,
      transport_type:    self.transport_type,
      reason:            self.reason,
      photo_url:         self.photo_url,
    })
  }
}

/// `transfert` joined with one `stock_suivant` row.
pub struct RawTransfertRow {
  pub id:         i64,
  pub movement:   RawMovement,
  pub next_depot: String,
}

impl RawTransfertRow {
  /// Columns: `id`, the movement columns, `next_depot`.
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      movement:   RawMovement::read(row, 1)?,
      next_depot: row.get(10)?,
    })
  }

  pub fn into_row(self) -> Result<TransfertRow> {
    Ok(TransfertRow {
      id:         self.id,
      movement:   self.movement.into_fields()?,
      next_depot: self.next_depot,
    })
  }
}

/// `livraison` joined with one `boucle` row.
pub struct RawLivraisonRow {
  pub id:              i64,
  pub movement:        RawMovement,
  pub target_district: String,
  pub leg:             BoucleLeg,
}

impl RawLivraisonRow {
  /// Columns: `id`, the movement columns, `target_district`, then the five
  /// boucle columns.
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      movement:        RawMovement::read(row, 1)?,
      target_district: row.get(10)?,
      leg:             read_leg(row, 11)?,
    })
  }

  pub fn into_row(self) -> Result<LivraisonRow> {
    Ok(LivraisonRow {
      id:              self.id,
      movement:        self.movement.into_fields()?,
      target_district: self.target_district,
      leg:             self.leg,
    })
  }
}

pub fn read_leg(row: &Row<'_>, start: usize) -> rusqlite::Result<BoucleLeg> {
  Ok(BoucleLeg {
    return_depot: row.get(start)?,
    input:        row.get(start + 1)?,
    quantity:     row.get(start + 2)?,
    district:     row.get(start + 3)?,
    colline:      row.get(start + 4)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_round_trip() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(encode_date(d), "2024-03-01");
    assert_eq!(decode_date("2024-03-01").unwrap(), d);
  }

  #[test]
  fn bad_date_is_an_error() {
    assert!(matches!(decode_date("2024-13-01"), Err(Error::DateParse(_))));
  }
}
