use lru::LruCache;
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cached value plus its absolute deadline. `None` never expires.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// Cumulative cache counters. Monotonic for the life of the cache unless
/// explicitly reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub removals: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Capacity- and time-bounded key/value store with strict LRU eviction.
///
/// Recency updates on both read and write; a lookup that finds an expired
/// entry removes it and counts as a miss. All operations are safe under
/// concurrent invocation: the LRU structure sits behind one mutex, so
/// eviction decisions are atomic with respect to concurrent puts, and the
/// counters are atomics that record every operation exactly once.
pub struct BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    removals: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Zero capacity is a programming error and fails fast here rather than
    /// surfacing as misbehavior at query time.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("cache capacity must be greater than zero");
        BoundedCache {
            entries: Mutex::new(LruCache::new(cap)),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            removals: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Insert or replace under the cache's default expiration.
    pub fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Insert or replace with an explicit time-to-live. `Duration::ZERO`
    /// means the entry never expires.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: if ttl.is_zero() {
                None
            } else {
                Some(Instant::now() + ttl)
            },
        };

        let mut entries = self.entries.lock();
        // push reports the displaced pair: same key means replacement,
        // different key means the LRU entry was evicted for capacity.
        if let Some((displaced, _)) = entries.push(key.clone(), entry) {
            if displaced != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(target: "blogdex::cache", "evicted least-recently-used entry");
            }
        }
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookup. Bumps recency on a live hit; removes and misses on an
    /// expired entry.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) => {
                if entry.is_expired(now) {
                    true
                } else {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Remove if present. Returns whether a removal occurred.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.entries.lock().pop(key).is_some();
        if removed {
            self.removals.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Drop every entry. Cumulative counters are unaffected.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Sweep all currently-expired entries and return how many were
    /// dropped. Maintenance only: hit/miss/removal counters stay untouched.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| K::clone(key))
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Non-mutating presence check; expired entries read as absent.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .peek(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
        self.removals.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}
