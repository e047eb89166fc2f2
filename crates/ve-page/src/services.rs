//! Process-wide services shared by concurrent renders.

use std::sync::{Arc, OnceLock};

use ve_cache::{Cache, CacheBucket, CacheBucketExt};
use ve_renderer::{Compiler, Document};
use ve_source::Fetch;

const CSS_BUCKET: &str = "css";

const FOOTER_MARKDOWN: &str = "\
.ve-footer
    - Brought to you by:  [![](https://raw.githubusercontent.com/jstor-labs/juncture-digital/c7d73fb/images/Labs_logo_knockout.svg)](https://labs.jstor.org)
    - [About]()
    - [Terms and conditions]()
";

/// Fetched stylesheet text keyed by URL.
///
/// Entries never expire. A `refresh` read bypasses the cache and overwrites
/// the entry; concurrent writers race with last-writer-wins.
pub struct CssCache {
    bucket: Box<dyn CacheBucket>,
    fetch: Arc<dyn Fetch>,
}

impl CssCache {
    pub fn new(cache: &dyn Cache, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            bucket: cache.bucket(CSS_BUCKET),
            fetch,
        }
    }

    /// Stylesheet text for `url`, or `None` when it was never fetched
    /// successfully.
    pub fn get(&self, url: &str, refresh: bool) -> Option<String> {
        if !refresh && let Some(css) = self.bucket.get_string(url, "") {
            return Some(css);
        }
        match self.fetch.get_text(url) {
            Some(css) => {
                tracing::debug!(url = %url, len = css.len(), "Cached stylesheet");
                self.bucket.set_string(url, "", &css);
                Some(css)
            }
            None => {
                tracing::debug!(url = %url, "Stylesheet fetch failed");
                self.bucket.get_string(url, "")
            }
        }
    }
}

/// The default page footer, compiled on first use.
#[derive(Default)]
pub struct FooterCache {
    footer: OnceLock<Document>,
}

impl FooterCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled footer fragment. Its body holds a single `ve-footer`.
    pub fn get(&self, compiler: &Compiler) -> &Document {
        self.footer.get_or_init(|| compiler.compile(FOOTER_MARKDOWN))
    }
}
