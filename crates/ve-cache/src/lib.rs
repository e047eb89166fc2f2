//! Named key-value caches for rendering services.
//!
//! A [`Cache`] hands out [`CacheBucket`]s by name. Buckets store raw bytes
//! tagged with an etag; [`CacheBucketExt`] adds string accessors on top.
//!
//! [`MemoryCache`] is the process-wide implementation used by the renderer.
//! [`NullCache`] stores nothing.
//!
//! ```
//! use ve_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let css = cache.bucket("css");
//! css.set_string("https://example.com/a.css", "", "body {}");
//! assert_eq!(
//!     css.get_string("https://example.com/a.css", ""),
//!     Some("body {}".to_owned())
//! );
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::MemoryCache;

/// One named partition of a [`Cache`].
///
/// A read hits only when the stored etag equals the requested one. An empty
/// etag on read accepts whatever is stored.
pub trait CacheBucket: Send + Sync {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, etag: &str, value: &[u8]);
}

/// Source of [`CacheBucket`]s. Equal names share entries; different names
/// never see each other's keys.
pub trait Cache: Send + Sync {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// Bucket that forgets every write.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}
}

/// Cache with caching turned off.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
