//! Mock object store for testing.
//!
//! Provides [`MockStore`] for unit testing without a cloud bucket.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageErrorKind};
use crate::storage::ObjectStore;

/// In-memory object store.
///
/// Keys are kept sorted, matching the lexicographic listing order of real
/// buckets. Use the builder methods to configure test data.
///
/// # Example
///
/// ```ignore
/// use ve_storage::{MockStore, ObjectStore};
///
/// let store = MockStore::new().with_object("demo/content/a.md", "# A");
/// assert_eq!(store.list_keys("demo/").unwrap(), vec!["demo/content/a.md"]);
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    unavailable: bool,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_object(self, key: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.objects
            .write()
            .unwrap()
            .insert(key.into(), content.into());
        self
    }

    /// Make every call fail as if the backend were down.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::new(StorageErrorKind::Unavailable).with_backend("Mock"));
        }
        Ok(())
    }
}

impl ObjectStore for MockStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.check_available()?;
        Ok(self
            .objects
            .read()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.check_available()?;
        self.objects
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key).with_backend("Mock"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_mock_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockStore>();
    }

    #[test]
    fn test_list_keys_sorted_by_prefix() {
        let store = MockStore::new()
            .with_object("demo/b.md", "b")
            .with_object("demo/a.md", "a")
            .with_object("other/c.md", "c");

        assert_eq!(
            store.list_keys("demo").unwrap(),
            vec!["demo/a.md".to_owned(), "demo/b.md".to_owned()]
        );
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = MockStore::new();

        let err = store.get("demo/a.md").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "[Mock] Not found (key: demo/a.md)");
    }

    #[test]
    fn test_unavailable() {
        let store = MockStore::new().with_object("demo/a.md", "a").unavailable();

        assert_eq!(
            store.get("demo/a.md").unwrap_err().kind,
            StorageErrorKind::Unavailable
        );
    }
}
