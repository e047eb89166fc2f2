//! In-memory [`Github`] and [`Fetch`] implementations for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fetch::Fetch;
use crate::github::Github;

/// In-memory GitHub with a fixed set of repositories and files.
#[derive(Debug, Default)]
pub struct MockGithub {
    repos: HashMap<(String, String), String>,
    files: HashMap<String, String>,
}

impl MockGithub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with its default branch.
    #[must_use]
    pub fn with_repo(mut self, account: &str, repo: &str, default_branch: &str) -> Self {
        self.repos
            .insert((account.to_owned(), repo.to_owned()), default_branch.to_owned());
        self
    }

    /// Add a file. The repository is not registered implicitly.
    #[must_use]
    pub fn with_file(mut self, account: &str, repo: &str, git_ref: &str, file: &str, text: &str) -> Self {
        self.files
            .insert(format!("{account}/{repo}/{git_ref}/{file}"), text.to_owned());
        self
    }
}

impl Github for MockGithub {
    fn raw_file(&self, account: &str, repo: &str, git_ref: &str, file: &str) -> Option<String> {
        self.files
            .get(&format!("{account}/{repo}/{git_ref}/{file}"))
            .cloned()
    }

    fn default_branch(&self, account: &str, repo: &str) -> Option<String> {
        self.repos
            .get(&(account.to_owned(), repo.to_owned()))
            .cloned()
    }

    fn has_repo(&self, account: &str, repo: &str) -> bool {
        self.repos
            .contains_key(&(account.to_owned(), repo.to_owned()))
    }
}

/// In-memory URL fetcher that counts requests.
#[derive(Debug, Default)]
pub struct MockFetch {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockFetch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` at `url`.
    #[must_use]
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_owned(), text.to_owned());
        self
    }

    /// Make `url` fail even if a page is registered.
    #[must_use]
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_owned());
        self
    }

    /// Number of `get_text` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for MockFetch {
    fn get_text(&self, url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return None;
        }
        self.pages.get(url).cloned()
    }
}
