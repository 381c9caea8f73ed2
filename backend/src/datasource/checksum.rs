//! Checksums identifying the exact content of a loaded dataset.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the raw CSV text.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
