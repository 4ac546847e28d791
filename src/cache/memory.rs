//! In-memory response cache

use super::{is_fresh, CacheKey, CacheResult, ResponseCache};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Response cache holding bodies in a map, for tests and one-off runs
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: HashMap<CacheKey, (Instant, String)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResponseCache for MemoryCache {
    fn lookup(&self, key: &CacheKey, ttl: Option<Duration>) -> CacheResult<Option<String>> {
        Ok(self
            .entries
            .get(key)
            .filter(|(stored_at, _)| is_fresh(stored_at.elapsed(), ttl))
            .map(|(_, body)| body.clone()))
    }

    fn store(&mut self, key: &CacheKey, body: &str) -> CacheResult<()> {
        self.entries
            .insert(key.clone(), (Instant::now(), body.to_string()));
        Ok(())
    }
}
