//! Movement schema: Transfert and Livraison parents with their child legs.
//!
//! A movement is written once, together with all of its legs, and never
//! updated afterwards. Removing a parent removes its legs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Shared parent fields ────────────────────────────────────────────────────

/// Scalar fields carried by both movement kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFields {
  pub date:              NaiveDate,
  pub plate:             String,
  pub logistic_official: String,
  /// Caller-supplied; several movements may share a number.
  pub movement_number:   String,
  pub origin_depot:      String,
  pub destination_depot: String,
  pub transport_type:    String,
  #[serde(default)]
  pub reason:            Option<String>,
  /// Reference to an uploaded photo of the movement slip, if any.
  #[serde(default)]
  pub photo_url:         Option<String>,
}

impl MovementFields {
  fn validate(&self) -> Result<()> {
    require("plate", &self.plate)?;
    require("logistic_official", &self.logistic_official)?;
    require("movement_number", &self.movement_number)?;
    require("origin_depot", &self.origin_depot)?;
    require("destination_depot", &self.destination_depot)?;
    require("transport_type", &self.transport_type)
  }
}

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  Ok(())
}

// ─── Transfert ───────────────────────────────────────────────────────────────

/// Input for a new Transfert: the parent fields and the depots it visits next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransfert {
  #[serde(flatten)]
  pub movement:      MovementFields,
  /// Next depots, in visiting order.
  pub stock_suivant: Vec<String>,
}

impl NewTransfert {
  pub fn validate(&self) -> Result<()> {
    self.movement.validate()?;
    if self.stock_suivant.is_empty() {
      return Err(Error::EmptyChildList("transfert"));
    }
    for depot in &self.stock_suivant {
      require("stock_suivant", depot)?;
    }
    Ok(())
  }
}

/// One "next depot" leg of a Transfert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSuivant {
  pub id:           i64,
  pub transfert_id: i64,
  pub next_depot:   String,
}

/// A persisted Transfert with its legs in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfert {
  pub id:            i64,
  #[serde(flatten)]
  pub movement:      MovementFields,
  pub stock_suivant: Vec<StockSuivant>,
}

/// A Transfert joined with a single leg, as returned by filtered reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfertRow {
  pub id:         i64,
  #[serde(flatten)]
  pub movement:   MovementFields,
  pub next_depot: String,
}

// ─── Livraison ───────────────────────────────────────────────────────────────

/// One drop-off/return leg of a Livraison loop, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoucleLeg {
  pub return_depot: String,
  /// Commodity label, e.g. a fertiliser or seed variety.
  pub input:        String,
  pub quantity:     String,
  pub district:     String,
  pub colline:      String,
}

impl BoucleLeg {
  fn validate(&self) -> Result<()> {
    require("return_depot", &self.return_depot)?;
    require("input", &self.input)?;
    require("quantity", &self.quantity)?;
    require("district", &self.district)?;
    require("colline", &self.colline)
  }
}

/// Input for a new Livraison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLivraison {
  #[serde(flatten)]
  pub movement:        MovementFields,
  pub target_district: String,
  pub boucle:          Vec<BoucleLeg>,
}

impl NewLivraison {
  pub fn validate(&self) -> Result<()> {
    self.movement.validate()?;
    require("target_district", &self.target_district)?;
    if self.boucle.is_empty() {
      return Err(Error::EmptyChildList("livraison"));
    }
    self.boucle.iter().try_for_each(BoucleLeg::validate)
  }
}

/// A persisted Boucle leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoucleEntry {
  pub id:           i64,
  pub livraison_id: i64,
  #[serde(flatten)]
  pub leg:          BoucleLeg,
}

/// A persisted Livraison with its loop in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livraison {
  pub id:              i64,
  #[serde(flatten)]
  pub movement:        MovementFields,
  pub target_district: String,
  pub boucle:          Vec<BoucleEntry>,
}

/// A Livraison joined with a single Boucle leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivraisonRow {
  pub id:              i64,
  #[serde(flatten)]
  pub movement:        MovementFields,
  pub target_district: String,
  #[serde(flatten)]
  pub leg:             BoucleLeg,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields() -> MovementFields {
    MovementFields {
      date:              NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      plate:             "ABC-123".into(),
      logistic_official: "Jean".into(),
      movement_number:   "42".into(),
      origin_depot:      "Central-A".into(),
      destination_depot: "Central-D".into(),
      transport_type:    "Camion".into(),
      reason:            None,
      photo_url:         None,
    }
  }

  fn leg() -> BoucleLeg {
    BoucleLeg {
      return_depot: "Central-A".into(),
      input:        "DAP".into(),
      quantity:     "50".into(),
      district:     "Gitega".into(),
      colline:      "Mubuga".into(),
    }
  }

  #[test]
  fn transfert_without_legs_is_rejected() {
    let t = NewTransfert { movement: fields(), stock_suivant: vec![] };
    assert!(matches!(t.validate(), Err(Error::EmptyChildList("transfert"))));
  }

  #[test]
  fn transfert_with_blank_depot_is_rejected() {
    let t = NewTransfert {
      movement:      fields(),
      stock_suivant: vec!["Central-B".into(), "  ".into()],
    };
    assert!(matches!(t.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn livraison_without_boucle_is_rejected() {
    let l = NewLivraison {
      movement:        fields(),
      target_district: "Gitega".into(),
      boucle:          vec![],
    };
    assert!(matches!(l.validate(), Err(Error::EmptyChildList("livraison"))));
  }

  #[test]
  fn livraison_missing_plate_is_rejected() {
    let mut movement = fields();
    movement.plate = String::new();
    let l = NewLivraison {
      movement,
      target_district: "Gitega".into(),
      boucle:          vec![leg()],
    };
    assert!(matches!(l.validate(), Err(Error::Validation(m)) if m.contains("plate")));
  }

  #[test]
  fn valid_livraison_passes() {
    let l = NewLivraison {
      movement:        fields(),
      target_district: "Gitega".into(),
      boucle:          vec![leg(), leg()],
    };
    assert!(l.validate().is_ok());
  }

  #[test]
  fn livraison_row_serialises_flat() {
    let row = LivraisonRow {
      id:              7,
      movement:        fields(),
      target_district: "Gitega".into(),
      leg:             leg(),
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["date"], "2024-03-01");
    assert_eq!(json["plate"], "ABC-123");
    assert_eq!(json["colline"], "Mubuga");
    assert_eq!(json["target_district"], "Gitega");
  }
}
