//! Reference vocabularies: the lookup lists a client offers when a movement
//! is being recorded.
//!
//! Values are opaque strings. Movements are not validated against them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A flat list of allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
  Depot,
  ReturnDepot,
  District,
  Input,
  TransportType,
  Program,
}

impl Vocabulary {
  pub const ALL: [Vocabulary; 6] = [
    Self::Depot,
    Self::ReturnDepot,
    Self::District,
    Self::Input,
    Self::TransportType,
    Self::Program,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Depot => "depot",
      Self::ReturnDepot => "return_depot",
      Self::District => "district",
      Self::Input => "input",
      Self::TransportType => "transport_type",
      Self::Program => "program",
    }
  }
}

impl fmt::Display for Vocabulary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Vocabulary {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|v| v.as_str() == s)
      .ok_or_else(|| Error::Validation(format!("unknown vocabulary: {s:?}")))
  }
}

/// A sub-location within a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colline {
  pub district: String,
  pub colline:  String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vocabulary_names_round_trip() {
    for v in Vocabulary::ALL {
      assert_eq!(v.as_str().parse::<Vocabulary>().unwrap(), v);
    }
  }

  #[test]
  fn unknown_vocabulary_is_rejected() {
    assert!("colline".parse::<Vocabulary>().is_err());
  }
}
