//! Content resolution for visual essays.
//!
//! A [`ContentLocator`] names a document ambiguously: a content hash, an
//! `account/repo/...` GitHub path, a file under a default prefix, or a URL.
//! [`Resolver`] classifies it with [`source_path`] and reads the markdown from
//! the matching backend, producing a [`Source`].
//!
//! Backends are capabilities:
//! - [`ve_storage::ObjectStore`] for bucket-backed essays
//! - [`Github`] for repository files ([`HttpGithub`] in production)
//! - [`Fetch`] for direct URLs ([`HttpFetch`] in production)
//!
//! In-memory [`MockGithub`] and [`MockFetch`] are available behind the `mock`
//! feature.

mod error;
mod fetch;
mod github;
mod locator;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod path;
mod resolver;
mod source;

pub use error::SourceError;
pub use fetch::{Fetch, HttpFetch};
pub use github::{DEFAULT_API_URL, DEFAULT_RAW_URL, Github, HttpGithub, fetch_github};
pub use locator::ContentLocator;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockFetch, MockGithub};
pub use path::{SourcePath, source_path};
pub use resolver::Resolver;
pub use source::{OriginKind, Source};
