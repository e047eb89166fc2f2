//! Template assembly.
//!
//! The content document is folded into a page skeleton in two phases. The
//! content phase rearranges the compiled tree (body becomes `<main>`,
//! footnotes and footer move to the end, metadata is read). The template
//! phase loads the skeleton for the classified [`TemplateVersion`] and adds
//! stylesheets, scripts, and head metadata.

use ve_config::AssetsConfig;
use ve_renderer::dom::heading_level;
use ve_renderer::{Document, NodeId};
use ve_source::Source;
use ve_storage::{ObjectStore, find_by_suffix, split_first};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::services::CssCache;
use crate::template::TemplateVersion;

const HYPOTHESIS_SCRIPT: &str = "https://hypothes.is/embed.js";

/// Meta fields that control presentation and are not written to `<meta>`.
const PRESENTATION_FIELDS: &[&str] = &["author", "banner", "layout", "ve-config"];

/// Marker elements read out of the content before layout rewrites it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Text of the first non-empty heading.
    pub first_heading: Option<String>,
    /// `href` of a `ve-style` element.
    pub style: Option<String>,
    /// A `ve-add-hypothesis` element was present.
    pub hypothesis: bool,
}

impl Markers {
    /// Read and remove marker elements from `doc`.
    pub fn capture(doc: &mut Document) -> Self {
        let root = doc.root();
        let first_heading = doc
            .find_all(root, |e| heading_level(&e.name).is_some())
            .into_iter()
            .map(|h| doc.text_content(h).trim().to_owned())
            .find(|text| !text.is_empty());

        let mut style = None;
        for node in doc.elements_named(root, "ve-style") {
            if style.is_none() {
                style = doc.attr(node, "href").map(str::to_owned);
            }
            doc.detach(node);
        }

        let hypotheses = doc.elements_named(root, "ve-add-hypothesis");
        let hypothesis = !hypotheses.is_empty();
        for node in hypotheses {
            doc.detach(node);
        }

        Self {
            first_heading,
            style,
            hypothesis,
        }
    }
}

/// Everything assembly reads besides the content document.
pub struct Assembly<'a> {
    pub ctx: &'a RenderContext,
    pub source: &'a Source,
    pub version: TemplateVersion,
    pub markers: &'a Markers,
    pub css: &'a CssCache,
    /// Compiled default footer fragment.
    pub footer: &'a Document,
    pub store: &'a dyn ObjectStore,
    pub assets: &'a AssetsConfig,
}

/// Content rearranged for mounting, plus what the template phase needs.
struct Content {
    doc: Document,
    main: NodeId,
    meta: Vec<(String, String)>,
    has_footer: bool,
    head_styles: Vec<NodeId>,
}

impl Assembly<'_> {
    /// Assemble `content` into a complete page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingTemplate`] when the skeleton for the
    /// document's template version cannot be loaded.
    pub fn assemble(&self, content: Document) -> Result<String, RenderError> {
        let Some(content) = self.prepare(content) else {
            tracing::warn!("Content has no body");
            return Ok(String::new());
        };
        let mut page = self.load_template()?;
        self.fill(&mut page, &content);
        Ok(page.to_html())
    }

    fn prepare(&self, mut doc: Document) -> Option<Content> {
        let main = doc.body()?;
        doc.rename(main, "main");

        move_footnotes(&mut doc, main);

        let footers = doc.elements_named(main, "ve-footer");
        let has_footer = !footers.is_empty();
        if let Some(&footer) = footers.first() {
            doc.append(main, footer);
        }

        let meta = match self.version {
            TemplateVersion::Legacy => doc
                .find_first(main, |e| e.name == "param" && e.has_attr("ve-config"))
                .and_then(|p| doc.element(p))
                .map(|e| e.attrs.clone())
                .unwrap_or_default(),
            TemplateVersion::Current => match doc.first_named(main, "ve-meta") {
                Some(node) => {
                    let attrs = doc.element(node).map(|e| e.attrs.clone()).unwrap_or_default();
                    doc.detach(node);
                    attrs
                }
                None => Vec::new(),
            },
        };

        if self.version == TemplateVersion::Current
            && let Some(prefix) = &self.ctx.prefix
        {
            let anno_base = match &self.source.path {
                Some(path) => format!("{prefix}/{path}"),
                None => prefix.clone(),
            };
            for node in doc.find_all(main, |e| e.name == "ve-image" || e.name == "ve-media") {
                doc.set_attr(node, "anno-base", anno_base.as_str());
            }
        }

        let head_styles = doc
            .head()
            .map(|head| doc.elements_named(head, "style"))
            .unwrap_or_default();

        Some(Content {
            doc,
            main,
            meta,
            has_footer,
            head_styles,
        })
    }

    fn load_template(&self) -> Result<Document, RenderError> {
        let path = self.version.index_path();
        let mut html = ve_assets::get_str(&path).ok_or(RenderError::MissingTemplate(path))?;
        if let Some(prefix) = &self.ctx.prefix {
            html = html.replace("window.PREFIX = null", &format!("window.PREFIX = '{}'", js_escape(prefix)));
        }
        if let Some(git_ref) = &self.ctx.git_ref {
            html = html.replace("window.REF = null", &format!("window.REF = '{}'", js_escape(git_ref)));
        }
        Ok(Document::parse(&html))
    }

    fn fill(&self, page: &mut Document, content: &Content) {
        let (Some(head), Some(body)) = (page.head(), page.body()) else {
            tracing::warn!(version = ?self.version, "Template has no head or body");
            return;
        };

        let main = page.import(&content.doc, content.main);
        match self.version {
            TemplateVersion::Legacy => {
                let mount = page.find_first(body, |e| {
                    e.name == "component" && e.attr("v-bind:is") == Some("mainComponent")
                });
                match mount {
                    Some(mount) => page.append(mount, main),
                    None => page.insert(body, 0, main),
                }
            }
            TemplateVersion::Current => page.insert(body, 0, main),
        }

        let mut css = String::new();
        self.add_stylesheets(page, head, &mut css);

        if self.markers.hypothesis {
            let script = page.create_element_with("script", &[("src", HYPOTHESIS_SCRIPT), ("async", "true")]);
            page.append(body, script);
        }

        if let Some(base) = page.first_named(head, "base") {
            page.set_attr(base, "href", self.ctx.base_url.as_str());
        }

        if !css.is_empty() {
            let style = page.create_element_with("style", &[("data-id", "default")]);
            page.set_text(style, css);
            page.append(head, style);
        }

        self.add_script(page, body);

        for &style in &content.head_styles {
            let copy = page.import(&content.doc, style);
            page.append(head, copy);
        }

        set_meta(page, head, &content.meta, self.markers.first_heading.as_deref());

        if self.version == TemplateVersion::Current && !content.has_footer {
            if let Some(fragment) = self.footer.body().and_then(|b| self.footer.first_element_child(b)) {
                let footer = page.import(self.footer, fragment);
                page.append(main, footer);
            }
        }

        remove_empty_paragraphs(page);
    }

    fn add_stylesheets(&self, page: &mut Document, head: NodeId, css: &mut String) {
        let env = self.ctx.env;
        let dev = env.is_dev();
        match self.version {
            TemplateVersion::Legacy => {
                let inlined = self
                    .ctx
                    .inline
                    .then(|| ve_assets::get_str("v1/css/main.css"))
                    .flatten();
                match inlined {
                    Some(text) => css.push_str(&text),
                    None => {
                        let href = format!("{}/v1/css/main.css", self.assets.api_static_root(env, &self.ctx.host));
                        link_stylesheet(page, head, &href);
                    }
                }
            }
            TemplateVersion::Current => {
                let url = format!("{}/visual-essays.css", self.assets.css_root(env));
                if self.ctx.inline {
                    if let Some(text) = self.css.get(&url, dev) {
                        css.push_str(&text);
                    }
                } else {
                    link_stylesheet(page, head, &url);
                }
            }
        }

        let Some(href) = self.markers.style.as_deref() else {
            return;
        };
        // Stored stylesheets are always inlined; only remote ones may be linked.
        let text = if !href.starts_with("http") {
            self.stored_stylesheet(href)
        } else if self.ctx.inline {
            self.css.get(href, dev)
        } else {
            link_stylesheet(page, head, href);
            return;
        };
        if let Some(text) = text {
            css.push_str(&text);
        }
    }

    /// Look up a stylesheet under the document's storage prefix. A leading `/`
    /// is relative to the prefix, not the bucket.
    fn stored_stylesheet(&self, href: &str) -> Option<String> {
        let href = href.trim_start_matches('/');
        let path = match &self.ctx.prefix {
            Some(prefix) => format!("{}/{href}", prefix.trim_end_matches('/')),
            None => href.to_owned(),
        };
        let (first, rest) = split_first(&path)?;
        let key = find_by_suffix(self.store, first, rest)
            .inspect_err(|e| tracing::debug!(path = %path, error = %e, "Stylesheet lookup failed"))
            .ok()
            .flatten()?;
        let bytes = self
            .store
            .get(&key)
            .inspect_err(|e| tracing::debug!(key = %key, error = %e, "Stylesheet read failed"))
            .ok()?;
        String::from_utf8(bytes).ok()
    }

    fn add_script(&self, page: &mut Document, body: NodeId) {
        let path = self.version.script_path();
        let inlined = self.ctx.inline.then(|| ve_assets::get_str(&path)).flatten();
        let script = match inlined {
            Some(text) => {
                let script = page.create_element_with("script", &[("type", "module")]);
                page.set_text(script, text);
                script
            }
            None => {
                let src = format!("{}/{path}", self.assets.api_static_root(self.ctx.env, &self.ctx.host));
                page.create_element_with("script", &[("src", src.as_str()), ("type", "module")])
            }
        };
        page.append(body, script);
    }
}

/// Gather footnotes into one trailing section of `main`.
fn move_footnotes(doc: &mut Document, main: NodeId) {
    if let Some(footnotes) = doc.find_first(main, |e| e.name == "div" && e.has_class("footnote")) {
        doc.rename(footnotes, "section");
        doc.append(main, footnotes);
        return;
    }
    let definitions = doc.find_all(main, |e| e.name == "div" && e.has_class("footnote-definition"));
    if definitions.is_empty() {
        return;
    }
    let section = doc.create_element_with("section", &[("class", "footnotes")]);
    for definition in definitions {
        doc.append(section, definition);
    }
    doc.append(main, section);
}

fn link_stylesheet(page: &mut Document, head: NodeId, href: &str) {
    let link = page.create_element_with("link", &[("rel", "stylesheet"), ("href", href)]);
    page.append(head, link);
}

fn set_meta(page: &mut Document, head: NodeId, meta: &[(String, String)], first_heading: Option<&str>) {
    let title = meta
        .iter()
        .find(|(name, _)| name == "title")
        .map(|(_, value)| value.as_str())
        .or(first_heading);
    if let Some(title) = title {
        let node = match page.first_named(head, "title") {
            Some(node) => node,
            None => {
                let node = page.create_element("title");
                page.append(head, node);
                node
            }
        };
        page.set_text(node, title);
    }

    for (name, value) in meta {
        if name == "title" || PRESENTATION_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let node = page.create_element_with("meta", &[("name", name.as_str()), ("content", value.as_str())]);
        page.append(head, node);
    }
}

fn remove_empty_paragraphs(page: &mut Document) {
    let root = page.root();
    for p in page.elements_named(root, "p") {
        let only_text = page.children(p).iter().all(|&c| page.element(c).is_none());
        if only_text && page.text_content(p).trim().is_empty() {
            page.detach(p);
        }
    }
}

fn js_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use ve_cache::MemoryCache;
    use ve_config::Env;
    use ve_renderer::Compiler;
    use ve_source::MockFetch;
    use ve_storage::MockStore;

    use super::*;
    use crate::context::RenderOptions;
    use crate::services::FooterCache;

    struct Fixture {
        ctx: RenderContext,
        source: Source,
        css: CssCache,
        footer: FooterCache,
        compiler: Compiler,
        store: MockStore,
        assets: AssetsConfig,
    }

    impl Fixture {
        fn new(options: &RenderOptions) -> Self {
            let fetch = MockFetch::new().with_page(
                "https://unpkg.com/visual-essays/dist/visual-essays/visual-essays.css",
                "ve-image { display: block }",
            );
            Self {
                ctx: RenderContext::new(options, Some("demo/content".to_owned()), None),
                source: Source::inline("", Some("essay".to_owned())),
                css: CssCache::new(&MemoryCache::new(), Arc::new(fetch)),
                footer: FooterCache::new(),
                compiler: Compiler::new(),
                store: MockStore::new().with_object("demo/content/custom.css", "h1 { color: red }"),
                assets: AssetsConfig::default(),
            }
        }

        fn with_prefix(mut self, options: &RenderOptions, prefix: &str, store: MockStore) -> Self {
            self.ctx = RenderContext::new(options, Some(prefix.to_owned()), None);
            self.store = store;
            self
        }

        fn page(&self, markdown: &str) -> Document {
            let mut doc = self.compiler.compile(markdown);
            let version = TemplateVersion::classify(&doc);
            let markers = Markers::capture(&mut doc);
            let assembly = Assembly {
                ctx: &self.ctx,
                source: &self.source,
                version,
                markers: &markers,
                css: &self.css,
                footer: self.footer.get(&self.compiler),
                store: &self.store,
                assets: &self.assets,
            };
            Document::parse(&assembly.assemble(doc).unwrap())
        }
    }

    fn inline() -> RenderOptions {
        RenderOptions {
            inline: true,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_markers_capture() {
        let mut doc = Compiler::new().compile(
            "\
.ve-style href=custom.css

.ve-add-hypothesis

#  {.x}

## First

text
",
        );
        let markers = Markers::capture(&mut doc);
        assert_eq!(
            markers,
            Markers {
                first_heading: Some("First".to_owned()),
                style: Some("custom.css".to_owned()),
                hypothesis: true,
            }
        );
        assert!(doc.first_named(doc.root(), "ve-style").is_none());
        assert!(doc.first_named(doc.root(), "ve-add-hypothesis").is_none());
    }

    #[test]
    fn test_current_template() {
        let fixture = Fixture::new(&inline());
        let page = fixture.page(".ve-meta title=\"My Essay\" description=\"About\" banner=b.jpg\n\n# Heading\n\n.ve-image src=a.jpg\n");
        let head = page.head().unwrap();
        let body = page.body().unwrap();

        let main = page.first_element_child(body).unwrap();
        assert_eq!(page.name(main), Some("main"));
        assert!(page.first_named(main, "ve-meta").is_none());

        let title = page.first_named(head, "title").unwrap();
        assert_eq!(page.text_content(title), "My Essay");
        let metas: Vec<_> = page
            .find_all(head, |e| e.name == "meta" && e.has_attr("name") && e.has_attr("content"))
            .into_iter()
            .filter_map(|m| page.attr(m, "name").map(str::to_owned))
            .collect();
        assert!(metas.contains(&"description".to_owned()));
        assert!(!metas.contains(&"banner".to_owned()));

        let image = page.first_named(main, "ve-image").unwrap();
        assert_eq!(page.attr(image, "anno-base"), Some("demo/content/essay"));

        let style = page.find_first(head, |e| e.attr("data-id") == Some("default")).unwrap();
        assert_eq!(page.text_content(style), "ve-image { display: block }");

        let script = page.find_first(body, |e| e.name == "script" && e.attr("type") == Some("module")).unwrap();
        assert_eq!(page.attr(script, "src"), None);
        assert!(!page.text_content(script).is_empty());

        let footer = page.element_children(main).last().copied().unwrap();
        assert_eq!(page.name(footer), Some("ve-footer"));

        let html = page.to_html();
        assert!(html.contains("window.PREFIX = 'demo/content'"));
        assert!(html.contains("window.REF = null"));
    }

    #[test]
    fn test_legacy_template() {
        let options = RenderOptions {
            inline: false,
            host: "localhost:8080".to_owned(),
            env: Env::Dev,
            ..RenderOptions::default()
        };
        let fixture = Fixture::new(&options);
        let page = fixture.page("<param ve-config title=\"Old\" author=\"Ann\">\n\n# Heading\n\ntext\n");
        let head = page.head().unwrap();
        let body = page.body().unwrap();

        let mount = page.find_first(body, |e| e.name == "component").unwrap();
        let main = page.first_element_child(mount).unwrap();
        assert_eq!(page.name(main), Some("main"));

        let link = page.find_first(head, |e| e.name == "link" && e.attr("rel") == Some("stylesheet")).unwrap();
        assert_eq!(page.attr(link, "href"), Some("http://localhost:8000/static/v1/css/main.css"));
        let script = page.find_first(body, |e| e.name == "script" && e.attr("type") == Some("module")).unwrap();
        assert_eq!(page.attr(script, "src"), Some("http://localhost:8000/static/v1/js/main.js"));

        let title = page.first_named(head, "title").unwrap();
        assert_eq!(page.text_content(title), "Old");
        assert!(page.find_first(head, |e| e.attr("name") == Some("author")).is_none());
        assert!(page.first_named(main, "ve-footer").is_none());
    }

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let fixture = Fixture::new(&inline());
        let page = fixture.page("# The Heading\n\ntext\n");
        let title = page.first_named(page.head().unwrap(), "title").unwrap();
        assert_eq!(page.text_content(title), "The Heading");
    }

    #[test]
    fn test_custom_footer_replaces_default() {
        let fixture = Fixture::new(&inline());
        let page = fixture.page(".ve-footer\n    - Custom\n\ntext\n");
        let body = page.body().unwrap();
        let footers = page.elements_named(body, "ve-footer");
        assert_eq!(footers.len(), 1);
        assert_eq!(page.text_content(footers[0]).trim(), "Custom");
    }

    #[test]
    fn test_footnotes_section() {
        let fixture = Fixture::new(&inline());
        let page = fixture.page("Text[^1] here.\n\n[^1]: The note.\n\nMore text.\n");
        let main = page.first_named(page.body().unwrap(), "main").unwrap();

        let children = page.element_children(main);
        let section = children[children.len() - 2];
        assert_eq!(page.attr(section, "class"), Some("footnotes"));
        assert!(page.text_content(section).contains("The note."));
    }

    #[test]
    fn test_custom_stylesheet_from_storage() {
        let fixture = Fixture::new(&inline());
        let page = fixture.page(".ve-style href=custom.css\n\ntext\n");
        let style = page
            .find_first(page.head().unwrap(), |e| e.attr("data-id") == Some("default"))
            .unwrap();
        assert!(page.text_content(style).ends_with("h1 { color: red }"));
    }

    fn default_css(page: &Document) -> String {
        page.find_first(page.head().unwrap(), |e| e.attr("data-id") == Some("default"))
            .map(|style| page.text_content(style))
            .unwrap_or_default()
    }

    #[test]
    fn test_rooted_stylesheet_stays_under_prefix() {
        let store = MockStore::new().with_object("0a1b2c3d/custom.css", "h2 { color: blue }");
        let fixture = Fixture::new(&inline()).with_prefix(&inline(), "0a1b2c3d", store);

        let rooted = fixture.page(".ve-style /custom.css\n\ntext\n");
        assert!(default_css(&rooted).ends_with("h2 { color: blue }"));

        let relative = fixture.page(".ve-style custom.css\n\ntext\n");
        assert!(default_css(&relative).ends_with("h2 { color: blue }"));
    }

    #[test]
    fn test_stored_stylesheet_inlined_without_inline_mode() {
        let options = RenderOptions {
            inline: false,
            ..RenderOptions::default()
        };
        let fixture = Fixture::new(&options);
        let page = fixture.page(".ve-style custom.css\n\ntext\n");
        let head = page.head().unwrap();

        assert_eq!(default_css(&page), "h1 { color: red }");
        let links: Vec<_> = page
            .find_all(head, |e| e.name == "link")
            .into_iter()
            .filter_map(|link| page.attr(link, "href").map(str::to_owned))
            .collect();
        assert!(!links.contains(&"custom.css".to_owned()), "{links:?}");
    }

    #[test]
    fn test_remote_stylesheet_linked_without_inline_mode() {
        let options = RenderOptions {
            inline: false,
            ..RenderOptions::default()
        };
        let fixture = Fixture::new(&options);
        let page = fixture.page(".ve-style https://cdn.example.org/essay.css\n\ntext\n");

        let link = page.find_first(page.head().unwrap(), |e| {
            e.name == "link" && e.attr("href") == Some("https://cdn.example.org/essay.css")
        });
        assert!(link.is_some());
        assert_eq!(default_css(&page), "");
    }

    #[test]
    fn test_hypothesis_and_base() {
        let options = RenderOptions {
            base_url: "/demo/".to_owned(),
            ..inline()
        };
        let fixture = Fixture::new(&options);
        let page = fixture.page(".ve-add-hypothesis\n\ntext\n");

        let base = page.first_named(page.head().unwrap(), "base").unwrap();
        assert_eq!(page.attr(base, "href"), Some("/demo/"));
        let embed = page.find_first(page.body().unwrap(), |e| e.attr("src") == Some(HYPOTHESIS_SCRIPT));
        assert!(embed.is_some());
    }

    #[test]
    fn test_empty_paragraphs_removed() {
        let mut page = Document::parse("<p> </p><p>kept</p><p><img src=x></p>");
        remove_empty_paragraphs(&mut page);
        assert_eq!(page.elements_named(page.root(), "p").len(), 2);
    }

    #[test]
    fn test_js_escape() {
        assert_eq!(js_escape("a'b\\c"), "a\\'b\\\\c");
    }
}
