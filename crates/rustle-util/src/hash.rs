//! Hashing utilities for stable action fingerprints.

use sha2::{Digest, Sha256};

/// Combine multiple string parts into a single composite SHA-256 hash.
///
/// Each part is hashed in order with a length prefix to prevent ambiguity.
pub fn sha256_multi<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        let part = part.as_ref();
        // Length-prefix each part to avoid collisions like ["ab","c"] vs ["a","bc"].
        hasher.update(part.len().to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
