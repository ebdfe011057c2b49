//! Stable cookie identity derivation.
//!
//! The jar keys its entries on a compact identifier derived from a cookie's
//! `(name, domain)` pair. The identifier must survive process restarts
//! within a session, so it is a truncated SHA-256 digest rather than a
//! `DefaultHasher` value (which is randomly seeded per process).

use crate::cookies::record::CookieRecord;
use sha2::{Digest, Sha256};
use std::fmt;

/// Compact cache key for a cookie record.
///
/// Keyed on `(name, domain)` only: two records that differ in `path` or
/// `store_id` but agree on name and domain collide by design, and consumers
/// must treat this as a cache key, not a globally unique id. The domain is
/// lowercased before hashing (cookie domains are case-insensitive); the name
/// is hashed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CookieId(u64);

impl CookieId {
    /// Derive the identity of a record from its name and domain.
    pub fn of(record: &CookieRecord) -> Self {
        Self::from_parts(&record.name, &record.domain)
    }

    /// Derive an identity directly from a `(name, domain)` pair.
    pub fn from_parts(name: &str, domain: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(domain.to_ascii_lowercase().as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        CookieId(u64::from_le_bytes(bytes))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CookieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
