//! In-memory cache implementation.
//!
//! [`MemoryCache`] keeps every bucket in one shared map guarded by an
//! [`RwLock`]. Handles returned by [`Cache::bucket`] share that map, so a
//! value written through one handle is visible through every other handle
//! with the same bucket name. Entries never expire.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

type Entries = HashMap<(String, String), (String, Vec<u8>)>;

/// Thread-safe in-memory [`Cache`].
#[derive(Default, Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            entries: Arc::clone(&self.entries),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    entries: Arc<RwLock<Entries>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let Ok(entries) = self.entries.read() else {
            tracing::warn!(bucket = %self.name, "Cache lock poisoned");
            return None;
        };
        let (stored_etag, value) = entries.get(&(self.name.clone(), key.to_owned()))?;
        if !etag.is_empty() && stored_etag != etag {
            return None;
        }
        Some(value.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!(bucket = %self.name, "Cache lock poisoned");
            return;
        };
        entries.insert(
            (self.name.clone(), key.to_owned()),
            (etag.to_owned(), value.to_vec()),
        );
    }
}
