//! Object storage abstraction for visual essays rendering.
//!
//! Essay markdown, custom stylesheets, and other per-essay files live in a
//! bucket. This crate provides the [`ObjectStore`] trait through which the
//! renderer lists and fetches them, independent of the cloud backend.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ObjectStore`] trait with `list_keys()`, `get()`, and `dir()` methods
//! - [`find_by_suffix`] for locating a key whose tail matches a path
//! - [`StorageError`] carrying a semantic kind plus key and backend context
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! Backends live in sibling crates (`ve-storage-s3`, `ve-storage-gcs`).
//!
//! # Example
//!
//! ```ignore
//! use ve_storage::{ObjectStore, find_by_suffix};
//!
//! let key = find_by_suffix(&store, "demo", "content/alice/essay1.md")?;
//! let bytes = store.get(&key.unwrap())?;
//! ```

mod error;
mod lookup;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod storage;

pub use error::{StorageError, StorageErrorKind};
pub use lookup::{find_by_suffix, split_first};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockStore;
pub use storage::{DirEntry, ObjectStore};
