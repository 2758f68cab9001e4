//! Credential records and the digest used to store them.
//!
//! Subjects and secrets are both reduced to a hex SHA-256 digest before they
//! reach storage, so checking a pair is a plain equality lookup.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored credential. Both fields are digests, never clear text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
  pub id:           i64,
  pub subject_hash: String,
  pub secret_hash:  String,
}

/// Human-readable companion entry written after a credential is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:   i64,
  pub name: String,
}

/// Lowercase hex SHA-256 of `value`. Unsalted, so stored digests stay
/// comparable with ones produced by earlier deployments.
pub fn digest(value: &str) -> String { hex::encode(Sha256::digest(value.as_bytes())) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digest_is_known_sha256() {
    assert_eq!(
      digest("abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn digest_is_deterministic_and_sensitive() {
    assert_eq!(digest("secret1"), digest("secret1"));
    assert_ne!(digest("secret1"), digest("secret2"));
    assert_eq!(digest("").len(), 64);
  }
}
