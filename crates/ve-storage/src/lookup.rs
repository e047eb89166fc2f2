//! Suffix-matched key lookup.
//!
//! Essays are addressed as `first/rest...`. Lookup lists every key under the
//! first segment and accepts the key whose text after its own first `/` is
//! exactly `rest`. This tolerates buckets where the first component of a key
//! differs from the requested one (for example a trailing-slash or
//! differently-cased owner folder) while the remainder still matches.

use crate::error::StorageError;
use crate::storage::ObjectStore;

/// Split a path at its first `/`.
///
/// Returns `None` when there is no `/` or either side is empty.
#[must_use]
pub fn split_first(path: &str) -> Option<(&str, &str)> {
    let (first, rest) = path.trim_start_matches('/').split_once('/')?;
    if first.is_empty() || rest.is_empty() {
        return None;
    }
    Some((first, rest))
}

/// Find the key under `list_prefix` whose post-first-segment tail equals `suffix`.
///
/// # Errors
///
/// Returns [`StorageError`] if listing fails.
pub fn find_by_suffix(
    store: &dyn ObjectStore,
    list_prefix: &str,
    suffix: &str,
) -> Result<Option<String>, StorageError> {
    let keys = store.list_keys(list_prefix)?;
    tracing::debug!(prefix = %list_prefix, count = keys.len(), "Listed keys");
    Ok(keys
        .into_iter()
        .find(|key| key.split_once('/').is_some_and(|(_, tail)| tail == suffix)))
}
