//! Caller-owned validation cache keyed by document fingerprint.
//!
//! The cache never reads storage: the caller supplies the identity and the
//! freshness marker. No internal locking; one writer at a time.

use crate::report::ValidationReport;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::SystemTime;
use tracing::trace;

/// Marks which version of a document a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// Modification time reported by the file store.
    Modified(SystemTime),
    /// Any caller-defined version token.
    Token(String),
    /// Hex SHA-256 of the content.
    ContentHash(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// External identity, typically a path.
    pub identity: String,
    pub freshness: Freshness,
}

impl Fingerprint {
    pub fn new(identity: impl Into<String>, freshness: Freshness) -> Self {
        Self {
            identity: identity.into(),
            freshness,
        }
    }

    pub fn modified(identity: impl Into<String>, at: SystemTime) -> Self {
        Self::new(identity, Freshness::Modified(at))
    }

    /// Fingerprint from text the caller already holds.
    pub fn for_content(identity: impl Into<String>, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self::new(identity, Freshness::ContentHash(digest))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    freshness: Freshness,
    report: ValidationReport,
}

/// One entry per identity; a changed freshness marker is a miss.
#[derive(Debug, Default)]
pub struct ValidationCache {
    entries: HashMap<String, CacheEntry>,
}

impl ValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&ValidationReport> {
        let entry = self.entries.get(&fingerprint.identity)?;
        if entry.freshness != fingerprint.freshness {
            trace!(identity = %fingerprint.identity, "cache entry is stale");
            return None;
        }
        Some(&entry.report)
    }

    /// Stored validity for `fingerprint`, if fresh.
    pub fn is_valid(&self, fingerprint: &Fingerprint) -> Option<bool> {
        self.get(fingerprint).map(|r| r.valid)
    }

    /// Store a report, replacing any entry for the same identity.
    pub fn put(&mut self, fingerprint: Fingerprint, report: ValidationReport) {
        self.entries.insert(
            fingerprint.identity,
            CacheEntry {
                freshness: fingerprint.freshness,
                report,
            },
        );
    }

    pub fn remove(&mut self, identity: &str) -> Option<ValidationReport> {
        self.entries.remove(identity).map(|e| e.report)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strictness;
    use std::time::Duration;

    fn report(valid: bool) -> ValidationReport {
        ValidationReport {
            valid,
            strictness: Strictness::Standard,
            issues: Vec::new(),
            fix: None,
        }
    }

    #[test]
    fn content_hash_is_stable() {
        let a = Fingerprint::for_content("a.ahk", "MsgBox(1)");
        let b = Fingerprint::for_content("a.ahk", "MsgBox(1)");
        let c = Fingerprint::for_content("a.ahk", "MsgBox(2)");
        assert_eq!(a, b);
        assert_ne!(a, c);
        match a.freshness {
            Freshness::ContentHash(ref h) => assert_eq!(h.len(), 64),
            _ => panic!("expected content hash"),
        }
    }

    #[test]
    fn hit_requires_matching_freshness() {
        let mut cache = ValidationCache::new();
        let t0 = SystemTime::UNIX_EPOCH;
        cache.put(Fingerprint::modified("s.ahk", t0), report(true));

        assert_eq!(cache.is_valid(&Fingerprint::modified("s.ahk", t0)), Some(true));
        let later = Fingerprint::modified("s.ahk", t0 + Duration::from_secs(1));
        assert!(cache.get(&later).is_none());
        assert!(cache.get(&Fingerprint::modified("other.ahk", t0)).is_none());
    }

    #[test]
    fn put_replaces_entry_for_identity() {
        let mut cache = ValidationCache::new();
        cache.put(Fingerprint::new("s", Freshness::Token("1".into())), report(true));
        cache.put(Fingerprint::new("s", Freshness::Token("2".into())), report(false));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.is_valid(&Fingerprint::new("s", Freshness::Token("2".into()))),
            Some(false)
        );
        assert!(cache.get(&Fingerprint::new("s", Freshness::Token("1".into()))).is_none());
    }

    #[test]
    fn clear_empties() {
        let mut cache = ValidationCache::new();
        cache.put(Fingerprint::for_content("x", "a"), report(true));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.remove("x").is_none());
    }
}
