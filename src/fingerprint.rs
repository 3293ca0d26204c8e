//! Content fingerprints for spec documents
//!
//! SHA-256 over the compact JSON encoding of a document. Equal fingerprints
//! mean equal documents, which lets the multi-spec consistency runner skip
//! diffing identical pairs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 fingerprint of one document's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a raw document tree.
    pub fn of(document: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(document).unwrap_or_default();
        Self::from_bytes(canonical.as_bytes())
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
