//! Plan fingerprints for query manifests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// blake3 digest of a printed logical plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanHash(pub [u8; 32]);

impl fmt::Display for PlanHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(blake3::Hash::from(self.0).to_hex().as_str())
    }
}

/// Two plans print identically iff they are the same tree, so the printed
/// form is a stable key.
pub fn hash_str(s: &str) -> PlanHash {
    PlanHash(*blake3::hash(s.as_bytes()).as_bytes())
}
