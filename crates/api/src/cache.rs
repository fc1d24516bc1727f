use dashmap::DashMap;
use std::sync::Arc;

/// Analysis results keyed by transcript id.
pub struct Cache<V> {
    entries: Arc<DashMap<String, V>>,
    max_entries: usize,
}

impl<V: Clone> Cache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn set(&self, key: &str, value: V) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .entries
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            analyses_cached: self.entries.len(),
            max_entries: self.max_entries,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub analyses_cached: usize,
    pub max_entries: usize,
}
