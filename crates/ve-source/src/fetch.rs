use std::time::Duration;

use ureq::Agent;

const DEFAULT_TIMEOUT: u64 = 30;

/// Plain HTTP GET for markdown and stylesheets addressed by URL.
pub trait Fetch: Send + Sync {
    /// Body text on a 2xx response, `None` otherwise.
    fn get_text(&self, url: &str) -> Option<String>;
}

/// [`Fetch`] over ureq.
pub struct HttpFetch {
    agent: Agent,
}

impl Default for HttpFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch {
    #[must_use]
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Fetch for HttpFetch {
    fn get_text(&self, url: &str) -> Option<String> {
        let response = self
            .agent
            .get(url)
            .call()
            .inspect_err(|e| tracing::debug!(url = %url, error = %e, "Fetch failed"))
            .ok()?;

        let status = response.status().as_u16();
        tracing::debug!(url = %url, status, "Fetched URL");
        if !(200..300).contains(&status) {
            return None;
        }
        let mut body = response.into_body();
        body.read_to_string()
            .inspect_err(|e| tracing::debug!(url = %url, error = %e, "Failed to read body"))
            .ok()
    }
}
