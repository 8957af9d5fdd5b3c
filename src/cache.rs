//! Upload cache owned by the calling layer
//!
//! Keys are the SHA-256 of the payload, so re-submitting the same workbook
//! returns the stored outcome without reprocessing. The engine itself never
//! consults this cache.

use crate::core::Outcome;
use crate::error::ConsolidationResult;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Hex SHA-256 of a payload
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, Arc<Outcome>>,
    order: VecDeque<String>,
}

/// Bounded content-addressed cache, oldest entry evicted first
pub struct ContentCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl ContentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<Arc<Outcome>> {
        self.lock().map.get(key).cloned()
    }

    /// Return the cached outcome for `bytes`, computing and storing it on a miss.
    /// Errors are not cached.
    pub fn get_or_insert_with<F>(&self, bytes: &[u8], compute: F) -> ConsolidationResult<Arc<Outcome>>
    where
        F: FnOnce(&[u8]) -> ConsolidationResult<Outcome>,
    {
        let key = content_key(bytes);
        if let Some(hit) = self.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }

        debug!(key = %key, "cache miss");
        let outcome = Arc::new(compute(bytes)?);

        let mut entries = self.lock();
        if !entries.map.contains_key(&key) {
            while entries.order.len() >= self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.map.remove(&oldest);
                }
            }
            entries.order.push_back(key.clone());
            entries.map.insert(key, Arc::clone(&outcome));
        }
        Ok(outcome)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // poisoned: entries are still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Diagnostics;
    use std::cell::Cell;

    fn empty_outcome() -> ConsolidationResult<Outcome> {
        Ok(Outcome::Empty {
            diagnostics: Diagnostics::default(),
        })
    }

    #[test]
    fn test_content_key_is_stable() {
        assert_eq!(content_key(b"abc"), content_key(b"abc"));
        assert_ne!(content_key(b"abc"), content_key(b"abd"));
        assert_eq!(content_key(b"").len(), 64);
    }

    #[test]
    fn test_second_call_is_cached() {
        let cache = ContentCache::new(4);
        let calls = Cell::new(0);
        for _ in 0..3 {
            cache
                .get_or_insert_with(b"payload", |_| {
                    calls.set(calls.get() + 1);
                    empty_outcome()
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_oldest_first() {
        let cache = ContentCache::new(2);
        for payload in [b"a".as_slice(), b"b", b"c"] {
            cache.get_or_insert_with(payload, |_| empty_outcome()).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&content_key(b"a")).is_none());
        assert!(cache.get(&content_key(b"c")).is_some());
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = ContentCache::new(2);
        let result = cache.get_or_insert_with(b"bad", |_| {
            Err(crate::error::ConsolidationError::Format("corrupt".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
