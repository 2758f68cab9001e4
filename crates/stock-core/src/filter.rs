//! Filters accepted by the movement reader.
//!
//! Every read is `(kind, date-or-wildcard, secondary key)`. The secondary key
//! is either the logistics official who recorded the movement or a
//! kind-specific location: the origin depot for Transferts, the target
//! district for Livraisons.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Date ────────────────────────────────────────────────────────────────────

/// Either an exact calendar date or no date restriction at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateFilter {
  On(NaiveDate),
  #[default]
  Any,
}

impl DateFilter {
  /// Tokens that mean "every date".
  pub const WILDCARDS: [&'static str; 2] = ["*", "all"];

  pub fn date(&self) -> Option<NaiveDate> {
    match self {
      Self::On(d) => Some(*d),
      Self::Any => None,
    }
  }
}

impl FromStr for DateFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if Self::WILDCARDS.iter().any(|w| w.eq_ignore_ascii_case(s)) {
      return Ok(Self::Any);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Self::On)
      .map_err(|_| Error::MalformedDate(s.to_owned()))
  }
}

// ─── Secondary keys ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum TransfertKey {
  #[default]
  Any,
  Official(String),
  OriginDepot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum LivraisonKey {
  #[default]
  Any,
  Official(String),
  District(String),
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`MovementStore::transfert_rows`](crate::store::MovementStore::transfert_rows).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransfertQuery {
  pub date: DateFilter,
  pub key:  TransfertKey,
}

impl TransfertQuery {
  pub fn new(date: DateFilter, key: TransfertKey) -> Self { Self { date, key } }

  /// Every Transfert, every date.
  pub fn all() -> Self { Self::default() }
}

/// Parameters for [`MovementStore::livraison_rows`](crate::store::MovementStore::livraison_rows).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LivraisonQuery {
  pub date: DateFilter,
  pub key:  LivraisonKey,
}

impl LivraisonQuery {
  pub fn new(date: DateFilter, key: LivraisonKey) -> Self { Self { date, key } }

  pub fn all() -> Self { Self::default() }
}

/// A read against either movement kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementQuery {
  Transfert(TransfertQuery),
  Livraison(LivraisonQuery),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_exact_date() {
    let f: DateFilter = "2024-03-01".parse().unwrap();
    assert_eq!(f, DateFilter::On(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
  }

  #[test]
  fn parses_wildcards() {
    assert_eq!("*".parse::<DateFilter>().unwrap(), DateFilter::Any);
    assert_eq!("ALL".parse::<DateFilter>().unwrap(), DateFilter::Any);
    assert_eq!(" all ".parse::<DateFilter>().unwrap(), DateFilter::Any);
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(
      "01/03/2024".parse::<DateFilter>(),
      Err(Error::MalformedDate(_))
    ));
    assert!(matches!("".parse::<DateFilter>(), Err(Error::MalformedDate(_))));
  }

  #[test]
  fn any_has_no_date() {
    assert_eq!(DateFilter::Any.date(), None);
  }
}
