//! Cache key derivation
//!
//! The key is the artifact's filename: a SHA-256 hash of the source path
//! and the canonical parameter encoding, then the source's last-modified
//! timestamp, then the original file extension. Every invalidating factor
//! is part of the key, so there is no invalidation API; touching the
//! source or changing any parameter simply produces a new key.

use sha2::{Digest, Sha256};

use crate::params::TransformRequest;

/// Deterministic identifier for one cached variant
///
/// Format: `<hex hash>-<mtime>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a request against a source modified at
    /// `source_modified` (epoch seconds).
    pub fn derive(request: &TransformRequest, source_modified: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(request.source.to_string_lossy().as_bytes());
        hasher.update(request.canonical_query().as_bytes());
        let hash = hex::encode(hasher.finalize());

        let extension = request
            .source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        CacheKey(format!("{}-{}.{}", hash, source_modified, extension))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
