//! Visual essay page rendering.
//!
//! [`PageRenderer::render`] runs the whole pipeline for one request:
//!
//! 1. resolve the locator to a [`Source`](ve_source::Source)
//! 2. compile markdown into a sectioned document
//! 3. [`rewrite`] links and media sources to absolute URLs
//! 4. [`tag_entities`] from `Q`-number tokens in paragraph text
//! 5. [`normalize_layout`] for tabs and cards
//! 6. assemble the content into the page template picked by
//!    [`TemplateVersion::classify`]
//!
//! Each stage takes the document by mutable reference and leaves it to the
//! next. Stylesheet text and the default footer are cached in services owned
//! by the renderer, so renders stay independent of each other.

mod assemble;
mod context;
mod entities;
mod error;
mod layout;
mod renderer;
mod rewrite;
mod services;
mod template;

pub use assemble::{Assembly, Markers};
pub use context::{RenderContext, RenderOptions};
pub use entities::{EntitySet, tag_entities};
pub use error::RenderError;
pub use layout::normalize_layout;
pub use renderer::PageRenderer;
pub use rewrite::rewrite;
pub use services::{CssCache, FooterCache};
pub use template::TemplateVersion;
