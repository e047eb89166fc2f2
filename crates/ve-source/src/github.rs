//! GitHub content access.

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use crate::error::SourceError;
use crate::source::Source;

const DEFAULT_TIMEOUT: u64 = 30;
const FALLBACK_BRANCH: &str = "main";

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Default raw content host.
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Read access to GitHub repositories.
///
/// Failures are reported as absence: a missing file, a non-success status,
/// and a transport error all yield `None` / `false`.
pub trait Github: Send + Sync {
    /// Raw text of `file` in `account/repo` at `git_ref`.
    fn raw_file(&self, account: &str, repo: &str, git_ref: &str, file: &str) -> Option<String>;

    /// The repository's default branch.
    fn default_branch(&self, account: &str, repo: &str) -> Option<String>;

    /// Whether `account/repo` names an existing repository.
    fn has_repo(&self, account: &str, repo: &str) -> bool;
}

/// Fetch a document addressed as `account/repo[/file]`.
///
/// With no ref, the repository's default branch is used (`main` when it
/// cannot be determined). An empty file path means `README.md`; a path with
/// no extension tries `{file}.md`, then `{file}/README.md`.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] when the path has fewer than two
/// segments or no candidate file exists.
pub fn fetch_github(github: &dyn Github, path: &str, git_ref: Option<&str>) -> Result<Source, SourceError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let [account, repo, rest @ ..] = segments.as_slice() else {
        tracing::debug!(path = %path, "GitHub path needs account and repo");
        return Err(SourceError::not_found(path));
    };

    let git_ref = match git_ref {
        Some(r) => r.to_owned(),
        None => github
            .default_branch(account, repo)
            .unwrap_or_else(|| FALLBACK_BRANCH.to_owned()),
    };

    let file = rest.join("/");
    let candidates = if file.is_empty() {
        vec!["README.md".to_owned()]
    } else if rest.last().is_some_and(|last| last.contains('.')) {
        vec![file]
    } else {
        vec![format!("{file}.md"), format!("{file}/README.md")]
    };

    for candidate in candidates {
        if let Some(markdown) = github.raw_file(account, repo, &git_ref, &candidate) {
            tracing::debug!(account, repo, git_ref = %git_ref, file = %candidate, "Fetched GitHub file");
            return Ok(Source::from_github(*account, *repo, git_ref, candidate, markdown));
        }
    }

    tracing::debug!(path = %path, git_ref = %git_ref, "GitHub file not found");
    Err(SourceError::not_found(path))
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// [`Github`] over the public REST API and raw content host.
pub struct HttpGithub {
    agent: Agent,
    api_url: String,
    raw_url: String,
    token: Option<String>,
}

impl HttpGithub {
    /// Create a client. An empty token is treated as none.
    #[must_use]
    pub fn new(api_url: &str, raw_url: &str, token: Option<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_owned(),
            raw_url: raw_url.trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn raw_url(&self, account: &str, repo: &str, git_ref: &str, file: &str) -> String {
        format!("{}/{account}/{repo}/{git_ref}/{file}", self.raw_url)
    }

    fn repo_url(&self, account: &str, repo: &str) -> String {
        format!("{}/repos/{account}/{repo}", self.api_url)
    }

    /// GET `url`, returning the body on a 2xx status.
    fn get(&self, url: &str) -> Option<String> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", "visual-essays");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "GitHub request failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            tracing::debug!(url = %url, status, "GitHub returned non-success status");
            return None;
        }
        let mut body = response.into_body();
        body.read_to_string()
            .inspect_err(|e| tracing::debug!(url = %url, error = %e, "Failed to read GitHub response"))
            .ok()
    }
}

impl Github for HttpGithub {
    fn raw_file(&self, account: &str, repo: &str, git_ref: &str, file: &str) -> Option<String> {
        self.get(&self.raw_url(account, repo, git_ref, file))
    }

    fn default_branch(&self, account: &str, repo: &str) -> Option<String> {
        let body = self.get(&self.repo_url(account, repo))?;
        serde_json::from_str::<RepoInfo>(&body)
            .inspect_err(|e| tracing::debug!(account, repo, error = %e, "Unexpected repository payload"))
            .ok()
            .map(|info| info.default_branch)
    }

    fn has_repo(&self, account: &str, repo: &str) -> bool {
        self.get(&self.repo_url(account, repo)).is_some()
    }
}
