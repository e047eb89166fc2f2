//! The [`ObjectStore`] capability.
//!
//! # Keys
//!
//! Keys are bucket-relative, `/`-separated, and never start with `/`:
//! - `"demo/content/alice/essay1.md"` - an essay
//! - `"a3b5125/default.md"` - a content-hash essay
//! - `"demo/content/styles/custom.css"` - a per-essay stylesheet

use std::collections::BTreeSet;

use crate::error::StorageError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DirEntry {
    /// A folder; the name carries a trailing `/`.
    Folder(String),
    /// An object directly under the listed prefix.
    File(String),
}

impl DirEntry {
    /// Entry name as displayed in a listing.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(name) | Self::File(name) => name,
        }
    }
}

/// Bucket-backed object storage.
///
/// Implementations are blocking. A backend wrapping an async SDK owns its
/// runtime and blocks on each call.
pub trait ObjectStore: Send + Sync {
    /// List every key starting with `prefix`.
    ///
    /// An empty prefix lists the whole bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be queried.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Fetch the raw bytes of one object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with [`NotFound`](crate::StorageErrorKind::NotFound) if the key
    /// does not exist, or another kind if the backend fails.
    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// List the immediate children of a folder-like prefix.
    ///
    /// Folders come first, then files, each group sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if listing fails.
    fn dir(&self, prefix: &str) -> Result<Vec<DirEntry>, StorageError> {
        let prefix = prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let mut entries = BTreeSet::new();
        for key in self.list_keys(&root)? {
            let Some(rest) = key.strip_prefix(&root) else {
                continue;
            };
            match rest.split_once('/') {
                Some((folder, _)) if !folder.is_empty() => {
                    entries.insert(DirEntry::Folder(format!("{folder}/")));
                }
                None if !rest.is_empty() => {
                    entries.insert(DirEntry::File(rest.to_owned()));
                }
                _ => {}
            }
        }
        Ok(entries.into_iter().collect())
    }
}
