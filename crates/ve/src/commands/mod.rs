//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod source;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use ve_config::{Config, StorageBackend};
use ve_source::{HttpFetch, HttpGithub, Resolver};
use ve_storage::ObjectStore;
use ve_storage_gcs::{GcsConfig, GcsStore};
use ve_storage_s3::{S3Config, S3Store};

use crate::error::CliError;

pub(crate) use render::RenderArgs;
pub(crate) use source::SourceArgs;

/// Locator arguments shared by all commands.
#[derive(Args)]
pub(crate) struct LocatorArgs {
    /// Essay path: a content hash, `account/repo/...`, or a name under the prefix.
    path: Option<String>,

    /// Prefix for bare essay names [default: render.default_prefix].
    #[arg(long)]
    prefix: Option<String>,

    /// Fetch markdown from a URL instead of resolving a path.
    #[arg(long, conflicts_with = "path")]
    url: Option<String>,

    /// Git ref for GitHub-hosted essays.
    #[arg(long = "ref")]
    git_ref: Option<String>,

    /// Path to configuration file (default: auto-discover ve.toml).
    #[arg(short, long, env = "VE_CONFIG")]
    config: Option<PathBuf>,
}

impl LocatorArgs {
    fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    fn locator(&self, config: &Config) -> ve_source::ContentLocator {
        ve_source::ContentLocator {
            path: self.path.clone(),
            url: self.url.clone(),
            prefix: Some(
                self.prefix
                    .clone()
                    .unwrap_or_else(|| config.render.default_prefix.clone()),
            )
            .filter(|p| !p.is_empty()),
            git_ref: self.git_ref.clone(),
        }
    }

    /// Human-readable description of the request.
    fn describe(&self) -> String {
        self.url
            .clone()
            .or_else(|| self.path.clone())
            .or_else(|| self.prefix.clone())
            .unwrap_or_else(|| "(default prefix)".to_owned())
    }
}

/// Build the configured object store backend.
fn open_store(config: &Config) -> Result<Arc<dyn ObjectStore>, CliError> {
    let storage = &config.storage;
    let store: Arc<dyn ObjectStore> = match storage.backend {
        StorageBackend::S3 => Arc::new(S3Store::new(&S3Config {
            bucket: storage.bucket.clone(),
            region: storage.region.clone(),
            endpoint: storage.endpoint.clone().filter(|e| !e.is_empty()),
        })?),
        StorageBackend::Gcs => Arc::new(GcsStore::new(&GcsConfig {
            bucket: storage.bucket.clone(),
            endpoint: storage.endpoint.clone().filter(|e| !e.is_empty()),
            token: storage.token.clone().filter(|t| !t.is_empty()),
        })),
    };
    tracing::debug!(backend = ?storage.backend, bucket = %storage.bucket, "Opened object store");
    Ok(store)
}

/// Build a resolver over the configured backends.
fn build_resolver(config: &Config) -> Result<Resolver, CliError> {
    let store = open_store(config)?;
    let github = HttpGithub::new(
        &config.github.api_url,
        &config.github.raw_url,
        config.github.token.clone().filter(|t| !t.is_empty()),
    );
    Ok(Resolver::new(store, Arc::new(github), Arc::new(HttpFetch::new())))
}

/// Write a document to `path`, or to stdout.
fn write_document(text: &str, path: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = path {
        std::fs::write(path, text)?;
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
