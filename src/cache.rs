//! Time-boxed, single-flight memoization.
//!
//! [`TtlCache`] replaces "compute and remember for an hour" wrappers with an
//! explicit key → value store. Each key owns a slot guarded by an async
//! mutex: the first caller for a missing or expired key runs the
//! computation while holding the slot, and every concurrent caller for the
//! same key waits on that slot and then reads the stored value. Different
//! keys never wait on each other.
//!
//! Entries past their TTL are treated as absent on every read, whether or
//! not [`TtlCache::purge_expired`] has removed them yet.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// A cached value and when it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            None => true,
            Some(ttl) => self.inserted_at.elapsed() < ttl,
        }
    }
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<CacheEntry<V>>>>;

/// In-process cache with an optional per-instance TTL.
///
/// `ttl = None` means entries never expire.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Option<Duration>,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl: Some(ttl),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Cache whose entries never expire.
    pub fn unbounded(name: &'static str) -> Self {
        Self {
            name,
            ttl: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn slot(&self, key: K) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }

    /// Return the fresh value for `key`, or run `compute` once and store its result.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let result = self
            .get_or_try_compute(key, move || async move { Ok::<V, Infallible>(compute().await) })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but only an `Ok` result
    /// is stored. An `Err` is handed back and the key stays absent, so the
    /// next caller computes again.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.is_fresh(self.ttl) {
                trace!(cache = self.name, "Cache hit");
                return Ok(entry.value.clone());
            }
            debug!(cache = self.name, "Cache entry expired; recomputing");
        } else {
            debug!(cache = self.name, "Cache miss; computing");
        }

        let value = compute().await?;
        *guard = Some(CacheEntry::new(value.clone()));
        Ok(value)
    }

    /// The fresh value for `key`, without computing or waiting.
    ///
    /// Returns `None` if the key is absent, expired, or currently being computed.
    #[cfg(test)]
    fn peek(&self, key: &K) -> Option<V> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.get(key)?)
        };
        let guard = slot.try_lock().ok()?;
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Drop the entry for `key` so the next lookup recomputes.
    #[cfg(test)]
    fn invalidate(&self, key: &K) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }

    /// Evict expired and empty slots; returns how many were removed.
    ///
    /// Slots with a computation in flight are kept.
    pub fn purge_expired(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        let ttl = self.ttl;
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(guard) => guard.as_ref().is_some_and(|entry| entry.is_fresh(ttl)),
            Err(_) => true,
        });
        let removed = before - slots.len();
        if removed > 0 {
            debug!(cache = self.name, removed, "Purged expired entries");
        }
        removed
    }

    /// Number of slots, including ones that may have expired.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
