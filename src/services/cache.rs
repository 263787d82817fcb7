//! Injected TTL cache for quote and history responses.
//!
//! Advisory only: entries are never the source of truth, so losing the whole
//! map changes latency and nothing else. The clock is a trait so tests can
//! drive expiry without sleeping.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.expires_at <= now {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let now = self.clock.now();

        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, e| e.expires_at > now);
            entries.insert(
                key.to_string(),
                Entry {
                    value,
                    expires_at: now + ttl,
                },
            );
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct ManualClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(clock.clone());

        cache.set("key123", json!("hello"), Duration::from_secs(1));
        assert_eq!(cache.get("key123"), Some(json!("hello")));

        clock.advance(Duration::from_millis(1100));
        assert_eq!(cache.get("key123"), None);
    }

    #[test]
    fn set_overwrites_value_and_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::with_clock(clock.clone());

        cache.set("k", json!(1), Duration::from_secs(1));
        cache.set("k", json!(2), Duration::from_secs(10));

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn missing_key_is_none() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nope"), None);
    }
}
