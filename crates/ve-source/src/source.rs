use std::fmt;

/// Backend a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    Github,
    ObjectStorage,
    Url,
    /// Markdown supplied directly by the caller.
    Inline,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Github => "github",
            Self::ObjectStorage => "object-storage",
            Self::Url => "url",
            Self::Inline => "inline",
        })
    }
}

/// A resolved document: markdown text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub markdown: String,
    pub origin: OriginKind,
    /// Document path. Repository-relative for GitHub, the resolved path for
    /// object storage, caller-supplied for inline sources.
    pub path: Option<String>,
    /// Matched object key (object storage only).
    pub key: Option<String>,
    /// Fetched URL (URL origin only).
    pub url: Option<String>,
    pub account: Option<String>,
    pub repo: Option<String>,
    pub git_ref: Option<String>,
}

impl Source {
    fn new(origin: OriginKind, markdown: String) -> Self {
        Self {
            markdown,
            origin,
            path: None,
            key: None,
            url: None,
            account: None,
            repo: None,
            git_ref: None,
        }
    }

    /// Caller-supplied markdown.
    #[must_use]
    pub fn inline(markdown: impl Into<String>, path: Option<String>) -> Self {
        Self {
            path,
            ..Self::new(OriginKind::Inline, markdown.into())
        }
    }

    /// Markdown fetched from a URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(OriginKind::Url, markdown.into())
        }
    }

    /// Markdown read from an object store key.
    #[must_use]
    pub fn from_storage(path: impl Into<String>, key: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            key: Some(key.into()),
            ..Self::new(OriginKind::ObjectStorage, markdown.into())
        }
    }

    /// Markdown read from a GitHub repository.
    #[must_use]
    pub fn from_github(
        account: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
        path: impl Into<String>,
        markdown: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            account: Some(account.into()),
            repo: Some(repo.into()),
            git_ref: Some(git_ref.into()),
            ..Self::new(OriginKind::Github, markdown.into())
        }
    }

    /// Whether the document came from GitHub.
    #[must_use]
    pub fn is_github(&self) -> bool {
        self.origin == OriginKind::Github
    }

    /// `account/repo` for GitHub-backed sources.
    #[must_use]
    pub fn repo_prefix(&self) -> Option<String> {
        match (&self.account, &self.repo) {
            (Some(account), Some(repo)) if self.is_github() => Some(format!("{account}/{repo}")),
            _ => None,
        }
    }
}
