//! SHA-256 checksum utilities
//!
//! Secrets never reach the audit log; a short fingerprint of the new
//! credential is recorded instead so two rotations can be told apart.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Hex characters kept in a credential fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Short, non-reversible identifier for a secret: `"sha256:<12 hex>"`.
pub fn fingerprint(secret: &str) -> String {
    let full = compute_content_checksum(secret);
    full[..PREFIX.len() + FINGERPRINT_LEN].to_string()
}
