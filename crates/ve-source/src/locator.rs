/// Caller-supplied request for a document.
///
/// Every field is optional and the combination is ambiguous on purpose: a
/// bare `path` may be a content hash, an `account/repo/...` GitHub path, or a
/// file name under `prefix`. [`Resolver`](crate::Resolver) decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentLocator {
    pub path: Option<String>,
    pub url: Option<String>,
    pub prefix: Option<String>,
    /// Branch, tag, or commit for GitHub-backed documents.
    pub git_ref: Option<String>,
}

impl ContentLocator {
    /// Locator for a path.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Locator for a direct URL.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the default prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the ref.
    #[must_use]
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }
}
