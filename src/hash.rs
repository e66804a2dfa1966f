use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a configuration source. Two sources share a
/// fingerprint only if their text is byte-for-byte identical, so it keys the
/// snapshot cache and tells a hot-reloaded document apart from its predecessor.
pub fn source_fingerprint(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    format!("{digest:x}")
}
