//! Google Cloud Storage backend for [`ObjectStore`].
//!
//! Talks to the GCS JSON API directly over HTTP. Listing follows
//! `nextPageToken` until exhausted; objects are downloaded with `alt=media`.
//! Public buckets need no token; private ones take an OAuth bearer token.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use ureq::Agent;
use ve_storage::{ObjectStore, StorageError, StorageErrorKind};

const BACKEND: &str = "Gcs";

/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters left unescaped in object names and query values.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Connection settings for a GCS bucket.
#[derive(Debug, Clone)]
pub struct GcsConfig {
    /// Bucket name.
    pub bucket: String,
    /// API endpoint (override for emulators).
    pub endpoint: Option<String>,
    /// OAuth bearer token.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    items: Vec<ObjectItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectItem {
    name: String,
}

/// GCS bucket exposed as an [`ObjectStore`].
pub struct GcsStore {
    agent: Agent,
    bucket: String,
    endpoint: String,
    token: Option<String>,
}

impl GcsStore {
    /// Create a store for the configured bucket.
    #[must_use]
    pub fn new(config: &GcsConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            bucket: config.bucket.clone(),
            endpoint: config
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_ENDPOINT)
                .trim_end_matches('/')
                .to_owned(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn list_url(&self, prefix: &str, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/storage/v1/b/{}/o?prefix={}&fields=items(name),nextPageToken",
            self.endpoint,
            self.bucket,
            utf8_percent_encode(prefix, COMPONENT)
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&utf8_percent_encode(token, COMPONENT).to_string());
        }
        url
    }

    fn media_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.endpoint,
            self.bucket,
            utf8_percent_encode(key, COMPONENT)
        )
    }

    fn send(&self, url: &str, key: &str) -> Result<ureq::Body, StorageError> {
        let mut request = self.agent.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request.call().map_err(|e| {
            StorageError::new(StorageErrorKind::Unavailable)
                .with_backend(BACKEND)
                .with_key(key)
                .with_source(e)
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            tracing::debug!(key = %key, status, "GCS request failed");
            return Err(StorageError::from_status(status)
                .with_backend(BACKEND)
                .with_key(key));
        }
        Ok(response.into_body())
    }
}

fn parse_page(json: &str) -> Result<ListPage, StorageError> {
    serde_json::from_str(json).map_err(|e| {
        StorageError::new(StorageErrorKind::Other)
            .with_backend(BACKEND)
            .with_source(e)
    })
}

impl ObjectStore for GcsStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.list_url(prefix, page_token.as_deref());
            let json = self.send(&url, prefix)?.read_to_string().map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_backend(BACKEND)
                    .with_key(prefix)
                    .with_source(e)
            })?;
            let page = parse_page(&json)?;
            keys.extend(page.items.into_iter().map(|item| item.name));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(prefix = %prefix, count = keys.len(), "Listed GCS keys");
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.send(&self.media_url(key), key)?
            .read_to_vec()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_backend(BACKEND)
                    .with_key(key)
                    .with_source(e)
            })
    }
}
