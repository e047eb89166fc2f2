use ve_cache::Cache;
use ve_config::AssetsConfig;
use ve_renderer::Compiler;
use ve_source::{ContentLocator, Resolver, Source, SourceError};

use crate::assemble::{Assembly, Markers};
use crate::context::{RenderContext, RenderOptions};
use crate::entities::tag_entities;
use crate::error::RenderError;
use crate::layout::normalize_layout;
use crate::rewrite::rewrite;
use crate::services::{CssCache, FooterCache};
use crate::template::TemplateVersion;

/// Renders visual essays from a locator to a complete HTML page.
///
/// One renderer serves many concurrent renders. The stylesheet cache and the
/// compiled default footer are its only shared state.
pub struct PageRenderer {
    resolver: Resolver,
    compiler: Compiler,
    css: CssCache,
    footer: FooterCache,
    assets: AssetsConfig,
}

impl PageRenderer {
    /// Create a renderer. Stylesheets are cached in `cache` and fetched
    /// through the resolver's URL fetcher.
    pub fn new(resolver: Resolver, cache: &dyn Cache, assets: AssetsConfig) -> Self {
        let css = CssCache::new(cache, resolver.fetcher());
        Self {
            resolver,
            compiler: Compiler::new(),
            css,
            footer: FooterCache::new(),
            assets,
        }
    }

    /// Replace the markdown compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve and render a document.
    ///
    /// Returns `Ok(None)` when the locator matches no document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingTemplate`] when a page skeleton is
    /// missing from template storage.
    pub fn render(&self, locator: &ContentLocator, options: &RenderOptions) -> Result<Option<String>, RenderError> {
        let source = match self.resolver.resolve(locator) {
            Ok(source) => source,
            Err(SourceError::NotFound(reason)) => {
                tracing::debug!(path = ?locator.path, reason = %reason, "Document not found");
                return Ok(None);
            }
        };
        tracing::debug!(origin = %source.origin, path = ?source.path, "Resolved document");

        let prefix = source.repo_prefix().or_else(|| locator.prefix.clone());
        let ctx = RenderContext::new(options, prefix, locator.git_ref.clone());
        self.render_source(&source, &ctx).map(Some)
    }

    /// Render caller-supplied markdown.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::render`].
    pub fn render_inline(
        &self,
        markdown: &str,
        path: Option<&str>,
        prefix: Option<&str>,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let source = Source::inline(markdown, path.map(str::to_owned));
        let ctx = RenderContext::new(options, prefix.map(str::to_owned), None);
        self.render_source(&source, &ctx)
    }

    /// Run the pipeline over a resolved source.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::render`].
    pub fn render_source(&self, source: &Source, ctx: &RenderContext) -> Result<String, RenderError> {
        let mut doc = self.compiler.compile(&source.markdown);
        let version = TemplateVersion::classify(&doc);

        rewrite(&mut doc, source, ctx, self.resolver.github());
        let markers = Markers::capture(&mut doc);
        tag_entities(&mut doc);
        normalize_layout(&mut doc);

        let assembly = Assembly {
            ctx,
            source,
            version,
            markers: &markers,
            css: &self.css,
            footer: self.footer.get(&self.compiler),
            store: self.resolver.store(),
            assets: &self.assets,
        };
        let html = assembly.assemble(doc)?;
        tracing::info!(version = ?version, size = html.len(), "Rendered page");
        Ok(html)
    }
}
