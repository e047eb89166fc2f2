use std::sync::Arc;

use ve_storage::{DirEntry, ObjectStore, find_by_suffix, split_first};

use crate::error::SourceError;
use crate::fetch::Fetch;
use crate::github::{Github, fetch_github};
use crate::locator::ContentLocator;
use crate::path::{SourcePath, source_path};
use crate::source::Source;

/// Turns a [`ContentLocator`] into a [`Source`].
///
/// A `url` bypasses path resolution and is fetched directly. Otherwise the
/// path is classified by [`source_path`] and read from GitHub or from the
/// object store.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ObjectStore>,
    github: Arc<dyn Github>,
    fetch: Arc<dyn Fetch>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ObjectStore>, github: Arc<dyn Github>, fetch: Arc<dyn Fetch>) -> Self {
        Self { store, github, fetch }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn github(&self) -> &dyn Github {
        self.github.as_ref()
    }

    /// Shared URL fetcher, for callers that fetch more than markdown.
    pub fn fetcher(&self) -> Arc<dyn Fetch> {
        Arc::clone(&self.fetch)
    }

    /// Resolve a locator.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when nothing matches.
    pub fn resolve(&self, locator: &ContentLocator) -> Result<Source, SourceError> {
        if let Some(url) = &locator.url {
            return Ok(self.fetch_url(url));
        }

        let resolved = source_path(
            locator.path.as_deref(),
            locator.prefix.as_deref(),
            self.github.as_ref(),
        )
        .ok_or_else(|| SourceError::not_found("empty locator"))?;

        match resolved {
            SourcePath::Github(path) => fetch_github(self.github.as_ref(), &path, locator.git_ref.as_deref()),
            SourcePath::Storage(path) => self.fetch_storage(&path),
        }
    }

    /// Fetch markdown from a URL. A failed fetch yields empty markdown.
    pub fn fetch_url(&self, url: &str) -> Source {
        let markdown = self.fetch.get_text(url).unwrap_or_default();
        tracing::debug!(url = %url, size = markdown.len(), "Loaded remote markdown");
        Source::from_url(url, markdown)
    }

    /// Read a storage path by listing keys under its first segment and
    /// matching the remainder exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when the path has no `/`, no key
    /// matches, or the store fails.
    pub fn fetch_storage(&self, path: &str) -> Result<Source, SourceError> {
        let Some((first, rest)) = split_first(path) else {
            tracing::debug!(path = %path, "Storage path has no owner segment");
            return Err(SourceError::not_found(path));
        };

        let key = find_by_suffix(self.store.as_ref(), first, rest)
            .map_err(|e| {
                tracing::debug!(path = %path, error = %e, "Storage listing failed");
                SourceError::not_found(path)
            })?
            .ok_or_else(|| SourceError::not_found(path))?;

        let bytes = self.store.get(&key).map_err(|e| {
            tracing::debug!(key = %key, error = %e, "Storage read failed");
            SourceError::not_found(path)
        })?;

        tracing::debug!(path = %path, key = %key, size = bytes.len(), "Loaded stored markdown");
        Ok(Source::from_storage(
            path,
            key,
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }

    /// Immediate children of a storage prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when listing fails.
    pub fn list(&self, prefix: &str) -> Result<Vec<DirEntry>, SourceError> {
        self.store.dir(prefix.trim_start_matches('/')).map_err(|e| {
            tracing::debug!(prefix = %prefix, error = %e, "Directory listing failed");
            SourceError::not_found(prefix)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ve_storage::MockStore;

    use super::*;
    use crate::source::OriginKind;
    use crate::{MockFetch, MockGithub};

    fn resolver() -> Resolver {
        let store = MockStore::new()
            .with_object("demo/content/alice/essay1.md", "# Essay one")
            .with_object("demo/content/alice/notes.txt", "plain")
            .with_object("0a1b2c3d/default.md", "# Hashed")
            .with_object("demo-2021/bob/essay.md", "# Bob");
        let github = MockGithub::new()
            .with_repo("acme", "docs", "main")
            .with_file("acme", "docs", "main", "README.md", "# Docs");
        let fetch = MockFetch::new().with_page("https://example.org/essay.md", "# Remote");
        Resolver::new(Arc::new(store), Arc::new(github), Arc::new(fetch))
    }

    #[test]
    fn test_storage_resolution_with_prefix() {
        let locator = ContentLocator::path("alice/essay1").with_prefix("demo/content");

        let source = resolver().resolve(&locator).unwrap();

        assert_eq!(source.origin, OriginKind::ObjectStorage);
        assert_eq!(source.key.as_deref(), Some("demo/content/alice/essay1.md"));
        assert_eq!(source.markdown, "# Essay one");
    }

    #[test]
    fn test_hash_resolution() {
        let source = resolver().resolve(&ContentLocator::path("0a1b2c3d")).unwrap();

        assert_eq!(source.key.as_deref(), Some("0a1b2c3d/default.md"));
    }

    #[test]
    fn test_suffix_match_tolerates_first_segment() {
        let resolver = resolver();
        let source = resolver.fetch_storage("demo/bob/essay.md").unwrap();

        assert_eq!(source.markdown, "# Bob");
        assert_eq!(source.key.as_deref(), Some("demo-2021/bob/essay.md"));
        assert!(resolver.fetch_storage("demo/bob/other.md").is_err());
    }

    #[test]
    fn test_github_resolution() {
        let locator = ContentLocator::path("acme/docs").with_prefix("demo/content");

        let source = resolver().resolve(&locator).unwrap();

        assert_eq!(source.origin, OriginKind::Github);
        assert_eq!(source.markdown, "# Docs");
    }

    #[test]
    fn test_url_bypasses_resolution() {
        let resolver = resolver();

        let found = resolver.resolve(&ContentLocator::url("https://example.org/essay.md")).unwrap();
        assert_eq!(found.origin, OriginKind::Url);
        assert_eq!(found.markdown, "# Remote");

        let missing = resolver.resolve(&ContentLocator::url("https://example.org/none.md")).unwrap();
        assert_eq!(missing.markdown, "");
    }

    #[test]
    fn test_missing_is_not_found() {
        let locator = ContentLocator::path("alice/missing").with_prefix("demo/content");

        assert!(matches!(resolver().resolve(&locator), Err(SourceError::NotFound(_))));
        assert!(resolver().resolve(&ContentLocator::default()).is_err());
    }

    #[test]
    fn test_unavailable_store_is_not_found() {
        let resolver = Resolver::new(
            Arc::new(MockStore::new().unavailable()),
            Arc::new(MockGithub::new()),
            Arc::new(MockFetch::new()),
        );

        assert!(resolver.fetch_storage("demo/x.md").is_err());
    }

    #[test]
    fn test_list() {
        let entries = resolver().list("demo/content/alice/").unwrap();

        assert_eq!(
            entries,
            vec![
                DirEntry::File("essay1.md".to_owned()),
                DirEntry::File("notes.txt".to_owned())
            ]
        );
    }
}
