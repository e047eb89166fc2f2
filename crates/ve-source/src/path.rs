//! Locator path classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::github::Github;

static HASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,64}$").unwrap());
static HASH_PREFIXED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,64}/").unwrap());

/// Where a locator path points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePath {
    /// `account/repo[/file]` in a GitHub repository.
    Github(String),
    /// An object storage path, always carrying a file extension.
    Storage(String),
}

impl SourcePath {
    /// The path text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Github(path) | Self::Storage(path) => path,
        }
    }
}

/// Whether the first two segments of `path` name a GitHub repository.
fn names_repo(github: &dyn Github, path: &str) -> bool {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(account), Some(repo)) if !HASH.is_match(account) && !HASH.is_match(repo) => {
            github.has_repo(account, repo)
        }
        _ => false,
    }
}

/// Classify a locator path.
///
/// A content hash maps to `{hash}/default` in storage. A path with no `/` is
/// placed under `prefix`. A hash-prefixed path is storage-backed; otherwise a
/// path whose first two segments name a repository is GitHub-backed. Failing
/// that, the path is tried once more under `prefix` (unless it was already
/// prefixed), and whatever remains is storage-backed. Storage paths whose last
/// segment has no extension get `.md`.
///
/// Returns `None` when neither a path nor a prefix is given.
pub fn source_path(path: Option<&str>, prefix: Option<&str>, github: &dyn Github) -> Option<SourcePath> {
    let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());
    let path = path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());

    let (candidate, is_github) = if let Some(path) = path {
        if HASH.is_match(path) {
            (format!("{path}/default"), false)
        } else {
            let mut prefixed = false;
            let mut candidate = path.to_owned();
            if let Some(prefix) = prefix
                && !candidate.contains('/')
            {
                candidate = format!("{prefix}/{candidate}");
                prefixed = true;
            }

            if HASH_PREFIXED.is_match(&candidate) {
                (candidate, false)
            } else if names_repo(github, &candidate) {
                (candidate, true)
            } else if let Some(prefix) = prefix.filter(|_| !prefixed) {
                let candidate = format!("{prefix}/{candidate}");
                let is_github = !HASH_PREFIXED.is_match(&candidate) && names_repo(github, &candidate);
                (candidate, is_github)
            } else {
                (candidate, false)
            }
        }
    } else {
        let prefix = prefix?;
        if HASH.is_match(prefix) {
            (format!("{prefix}/default"), false)
        } else if HASH_PREFIXED.is_match(prefix) {
            (prefix.to_owned(), false)
        } else {
            (prefix.to_owned(), names_repo(github, prefix))
        }
    };

    tracing::debug!(path = %candidate, is_github, "Classified source path");

    if is_github {
        return Some(SourcePath::Github(candidate));
    }
    let has_extension = candidate
        .rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.'));
    if has_extension {
        Some(SourcePath::Storage(candidate))
    } else {
        Some(SourcePath::Storage(format!("{candidate}.md")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::MockGithub;

    fn github() -> MockGithub {
        MockGithub::new()
            .with_repo("acme", "docs", "main")
            .with_repo("visual-essays", "content", "main")
    }

    fn classify(path: Option<&str>, prefix: Option<&str>) -> Option<SourcePath> {
        source_path(path, prefix, &github())
    }

    #[test]
    fn test_hash_maps_to_default() {
        assert_eq!(
            classify(Some("0a1b2c3d/"), Some("demo/content")),
            Some(SourcePath::Storage("0a1b2c3d/default.md".to_owned()))
        );
    }

    #[test]
    fn test_hash_prefixed_is_storage() {
        assert_eq!(
            classify(Some("0a1b2c3d/essay"), None),
            Some(SourcePath::Storage("0a1b2c3d/essay.md".to_owned()))
        );
    }

    #[test]
    fn test_bare_name_under_repo_prefix_is_github() {
        assert_eq!(
            classify(Some("intro"), Some("visual-essays/content")),
            Some(SourcePath::Github("visual-essays/content/intro".to_owned()))
        );
    }

    #[test]
    fn test_account_repo_path_is_github() {
        assert_eq!(
            classify(Some("acme/docs/essays/one"), Some("demo/content")),
            Some(SourcePath::Github("acme/docs/essays/one".to_owned()))
        );
    }

    #[test]
    fn test_unknown_pair_prefixed_into_storage() {
        assert_eq!(
            classify(Some("alice/essay1"), Some("demo/content")),
            Some(SourcePath::Storage("demo/content/alice/essay1.md".to_owned()))
        );
    }

    #[test]
    fn test_unknown_pair_under_repo_prefix_is_github() {
        assert_eq!(
            classify(Some("essays/one"), Some("acme/docs")),
            Some(SourcePath::Github("acme/docs/essays/one".to_owned()))
        );
    }

    #[test]
    fn test_extension_kept() {
        assert_eq!(
            classify(Some("alice/essay1.md"), None),
            Some(SourcePath::Storage("alice/essay1.md".to_owned()))
        );
    }

    #[test]
    fn test_prefix_only() {
        assert_eq!(
            classify(None, Some("acme/docs")),
            Some(SourcePath::Github("acme/docs".to_owned()))
        );
        assert_eq!(
            classify(None, Some("0a1b2c3d4e")),
            Some(SourcePath::Storage("0a1b2c3d4e/default.md".to_owned()))
        );
        assert_eq!(
            classify(None, Some("0a1b2c3d/sub")),
            Some(SourcePath::Storage("0a1b2c3d/sub.md".to_owned()))
        );
    }

    #[test]
    fn test_nothing_to_resolve() {
        assert_eq!(classify(None, None), None);
        assert_eq!(classify(Some("/"), None), None);
    }

    #[test]
    fn test_storage_paths_always_have_extension() {
        for path in ["a", "a/b", "a/b/c", "0a1b2c3d", "x/y.v2/z"] {
            match classify(Some(path), Some("demo/content")) {
                Some(SourcePath::Storage(p)) => assert!(p.rsplit('/').next().unwrap().contains('.'), "{p}"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
