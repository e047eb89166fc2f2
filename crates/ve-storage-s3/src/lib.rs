//! Amazon S3 backend for [`ObjectStore`].
//!
//! The AWS SDK is async; [`S3Store`] owns a single-threaded tokio runtime and
//! blocks on each request so the renderer can stay synchronous. Credentials
//! come from the standard AWS provider chain.

use std::error::Error;

use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use ve_storage::{ObjectStore, StorageError, StorageErrorKind};

const BACKEND: &str = "S3";

/// Connection settings for an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// AWS region.
    pub region: String,
    /// S3-compatible endpoint URL.
    pub endpoint: Option<String>,
}

/// S3 bucket exposed as an [`ObjectStore`].
pub struct S3Store {
    bucket: String,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    /// Connect to the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the runtime cannot be created.
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?;
        let client = runtime.block_on(build_client(config));
        Ok(Self {
            bucket: config.bucket.clone(),
            client,
            runtime,
        })
    }
}

async fn build_client(config: &S3Config) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    // S3-compatible endpoints (MinIO, LocalStack) need path-style addressing.
    if config.endpoint.is_some() {
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();
        return Client::from_conf(s3_config);
    }

    Client::new(&sdk_config)
}

impl ObjectStore for S3Store {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.runtime.block_on(async {
            let mut keys = Vec::new();
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .into_paginator()
                .send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| sdk_error(e, prefix))?;
                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|object| object.key().map(str::to_owned)),
                );
            }
            tracing::debug!(prefix = %prefix, count = keys.len(), "Listed S3 keys");
            Ok(keys)
        })
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.runtime.block_on(async {
            let response = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                        StorageError::not_found(key).with_backend(BACKEND)
                    } else {
                        sdk_error(e, key)
                    }
                })?;
            let bytes = response.body.collect().await.map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_backend(BACKEND)
                    .with_key(key)
                    .with_source(e)
            })?;
            Ok(bytes.into_bytes().to_vec())
        })
    }
}

fn sdk_error<E, R>(err: SdkError<E, R>, key: &str) -> StorageError
where
    E: Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let kind = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StorageErrorKind::Unavailable,
        _ => StorageErrorKind::Other,
    };
    tracing::debug!(key = %key, error = %error_chain(&err), "S3 request failed");
    StorageError::new(kind)
        .with_backend(BACKEND)
        .with_key(key)
        .with_source(err)
}

/// Walk the error source chain and join all messages.
fn error_chain(err: &dyn Error) -> String {
    let mut msgs = vec![err.to_string()];
    let mut source = err.source();
    while let Some(s) = source {
        msgs.push(s.to_string());
        source = s.source();
    }
    msgs.join(": ")
}
