//! Page templates and inline scripts for visual essays rendering.
//!
//! Release builds enable `embed`, which bakes `static/` into the binary with
//! `rust-embed`. Without it the files are read from disk on each call, so edits
//! to a template show up without a rebuild.
//!
//!
//! ```text
//! v1/index.html    legacy page skeleton
//! v1/css/main.css  legacy stylesheet
//! v1/js/main.js    legacy inline script
//! v2/index.html    current page skeleton
//! v2/js/main.js    current inline script
//! ```

use std::borrow::Cow;
#[cfg(not(feature = "embed"))]
use std::path::Path;

#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "static"]
struct Assets;

#[cfg(not(feature = "embed"))]
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Raw bytes of `static/{path}`, if present.
#[cfg(feature = "embed")]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|file| file.data)
}

/// Raw bytes of `static/{path}`, if present.
#[cfg(not(feature = "embed"))]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    std::fs::read(Path::new(STATIC_DIR).join(path)).ok().map(Cow::Owned)
}

/// Text asset; `None` when missing or not UTF-8.
pub fn get_str(path: &str) -> Option<String> {
    let bytes = get(path)?;
    String::from_utf8(bytes.into_owned()).ok()
}
