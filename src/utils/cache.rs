use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    written_at: Instant,
    last_used: u64,
}

#[derive(Debug)]
struct Slots<V> {
    entries: HashMap<String, Entry<V>>,
    tick: u64,
}

/// Keyed response memo with write-time expiry and least-recently-used eviction.
///
/// The lock is released while `compute` runs, so two callers racing on the same
/// key may both compute; the later write wins.
#[derive(Debug)]
pub struct ResponseCache<V> {
    name: &'static str,
    ttl: Duration,
    capacity: usize,
    slots: Mutex<Slots<V>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(name: &'static str, ttl: Duration, capacity: usize) -> Self {
        Self {
            name,
            ttl,
            capacity: capacity.max(1),
            slots: Mutex::new(Slots { entries: HashMap::new(), tick: 0 }),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let mut slots = self.slots.lock().await;
        slots.tick += 1;
        let tick = slots.tick;
        let expired = match slots.entries.get_mut(key) {
            Some(entry) if entry.written_at.elapsed() < self.ttl => {
                entry.last_used = tick;
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            slots.entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: String, value: V) {
        let mut slots = self.slots.lock().await;
        slots.tick += 1;
        let tick = slots.tick;
        slots.entries.insert(key, Entry { value, written_at: Instant::now(), last_used: tick });

        while slots.entries.len() > self.capacity {
            let oldest = slots
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    slots.entries.remove(&k);
                    debug!(cache = self.name, key = %k, "Evicted least recently used entry");
                }
                None => break,
            }
        }
    }

    pub async fn get_or_compute<F, Fut>(&self, key: String, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(hit) = self.get(&key).await {
            debug!(cache = self.name, key = %key, "Cache hit");
            return hit;
        }
        let value = compute().await;
        self.insert(key, value.clone()).await;
        value
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slots.lock().await.entries.len()
    }
}
