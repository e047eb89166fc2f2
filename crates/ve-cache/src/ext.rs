//! Extension trait for [`CacheBucket`] with string convenience methods.

use crate::CacheBucket;

/// Typed convenience methods for [`CacheBucket`].
///
/// Implemented as default methods on an extension trait so [`CacheBucket`]
/// stays object-safe and implementors only handle raw bytes.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss, etag mismatch, or invalid UTF-8.
    fn get_string(&self, key: &str, etag: &str) -> Option<String> {
        let bytes = self.get(key, etag)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, etag: &str, value: &str) {
        self.set(key, etag, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
