//! Shared utility helpers.

use sha2::{Digest, Sha256};

/// Bracket-quote each name and join them with commas: `[a],[b]`.
///
/// An empty list renders as `[]`.
pub fn bracket_list<S: AsRef<str>>(names: &[S]) -> String {
    let joined = names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join("],[");
    format!("[{}]", joined)
}

/// Upper-case hex SHA-256 digest of a script.
pub fn script_checksum(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    hex::encode_upper(hasher.finalize())
}
