//! Response cache: content-addressed, time-bounded store of raw completions.
//!
//! Keys are SHA-256 fingerprints of the canonical JSON form of a request
//! (messages, temperature, max_tokens). `serde_json::Value` objects are
//! `BTreeMap`-backed, so serialising through `Value` yields sorted keys and
//! logically identical requests always hash the same.
//!
//! Entries older than the TTL are never matched but are not evicted either;
//! they live until the process exits.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    output: String,
    inserted_at: Instant,
}

/// Shared cache of raw LLM outputs. Hold it behind an `Arc` and inject it into
/// the completion client; concurrent writers to one fingerprint are last-writer-wins.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, fingerprint: &str) -> Option<String> {
        self.get_at(fingerprint, Instant::now())
    }

    pub fn put(&self, fingerprint: String, output: String) {
        self.put_at(fingerprint, output, Instant::now());
    }

    fn get_at(&self, fingerprint: &str, now: Instant) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(fingerprint)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            debug!("Cache hit for {}", &fingerprint[..12.min(fingerprint.len())]);
            Some(entry.output.clone())
        } else {
            None
        }
    }

    fn put_at(&self, fingerprint: String, output: String, now: Instant) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            fingerprint,
            CacheEntry {
                output,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries, stale ones included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// SHA-256 over the sorted-key JSON serialisation of `request`.
pub fn fingerprint<T: Serialize>(request: &T) -> String {
    let canonical = serde_json::to_value(request)
        .map(|v| v.to_string())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
