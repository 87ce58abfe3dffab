//! Bounded, TTL-aware byte store for rendered listings.

use std::{
    num::NonZeroUsize,
    sync::RwLock,
    time::{Duration, Instant},
};

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::lock::{rw_read, rw_write};

#[derive(Debug, Clone)]
struct CachedListing {
    body: Bytes,
    expires_at: Instant,
}

/// Process-wide cache of rendered listing pages.
///
/// Entries leave the cache only when their TTL lapses, when capacity forces
/// an LRU eviction, or on [`ListingCache::clear`]. Writes to posts do not
/// reach this cache at all, so a cached page may show deleted or edited
/// posts until it expires.
pub struct ListingCache {
    entries: RwLock<LruCache<String, CachedListing>>,
}

impl ListingCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&self, key: impl Into<String>, value: Bytes, ttl: Duration) {
        self.set_at(key.into(), value, ttl, Instant::now());
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = rw_write(&self.entries, "clear");
        let dropped = entries.len();
        entries.clear();
        counter!("blogroll_listing_cache_clear_total").increment(1);
        debug!(cache = "listing", dropped, "Listing cache cleared");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Bytes> {
        let mut entries = rw_write(&self.entries, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                counter!("blogroll_listing_cache_hit_total").increment(1);
                return Some(entry.body.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            counter!("blogroll_listing_cache_expired_total").increment(1);
        }
        counter!("blogroll_listing_cache_miss_total").increment(1);
        None
    }

    pub(crate) fn set_at(&self, key: String, value: Bytes, ttl: Duration, now: Instant) {
        let entry = CachedListing {
            body: value,
            expires_at: now + ttl,
        };
        let mut entries = rw_write(&self.entries, "set");
        if let Some((evicted, _)) = entries.push(key.clone(), entry)
            && evicted != key
        {
            counter!("blogroll_listing_cache_evict_total").increment(1);
        }
    }
}
