//! Markdown to document tree compilation.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::{Captures, Regex};

use crate::blocks::{self, BlockGenerator, SchemaTable};
use crate::dom::Document;
use crate::outline;

/// Headings that are empty or hold only an attribute block.
static EMPTY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})([ \t]+(?:\{.*\}[ \t]*)?)$").unwrap());

/// Emphasis tags produced inside a `wc:` file token.
static WC_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bwc:\S*</?em>.*\b").unwrap());

static MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==([^=\s](?:[^=]*?[^=\s])?)==").unwrap());

/// Compiles visual essay markdown into a sectioned [`Document`].
///
/// Custom block directives are expanded through a [`BlockGenerator`], so the
/// set of known block types is data in a [`SchemaTable`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    generator: BlockGenerator,
}

impl Compiler {
    /// Compiler with the built-in block schemas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler with a custom schema table.
    #[must_use]
    pub fn with_schemas(schemas: SchemaTable) -> Self {
        Self {
            generator: BlockGenerator::new(schemas),
        }
    }

    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
    }

    /// Compile markdown to an HTML fragment with custom blocks expanded.
    ///
    /// Block bodies are compiled recursively with the same rules.
    #[must_use]
    pub fn to_html(&self, markdown: &str) -> String {
        let normalized = markdown.replace("\r\n", "\n");
        let guarded = EMPTY_HEADING.replace_all(&normalized, "${1} &nbsp;${2}");
        let (source, directives) = blocks::extract(&guarded);

        let parser = TextMergeStream::new(Parser::new_ext(&source, Self::options()));
        let mut html = String::with_capacity(source.len() + source.len() / 2);
        pulldown_cmark::html::push_html(&mut html, highlight_marks(parser).into_iter());

        for (index, directive) in directives.iter().enumerate() {
            let body = self.to_html(&directive.body);
            let element = self.generator.generate(&directive.name, &directive.args, &body);
            html = html.replacen(&blocks::placeholder(index), &element, 1);
        }
        html
    }

    /// Compile markdown into a document tree.
    ///
    /// After HTML generation, emphasis inside `wc:` tokens is turned back into
    /// underscores, headings open nested `<section>` elements, and headings
    /// left empty by the heading guard are removed.
    #[must_use]
    pub fn compile(&self, markdown: &str) -> Document {
        let html = self.to_html(markdown);
        let html = WC_EMPHASIS.replace_all(&html, |caps: &Captures<'_>| {
            caps[0].replace("<em>", "_").replace("</em>", "_")
        });

        let mut doc = Document::parse(&html);
        if let Some(body) = doc.body() {
            outline::sectionize(&mut doc, body);
            outline::prune_empty_headings(&mut doc, body);
        }
        doc
    }
}

/// Wrap `==text==` spans outside code blocks in `<mark>`.
fn highlight_marks<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut in_code = false;
    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code = true;
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                out.push(event);
            }
            Event::Text(text) if !in_code && MARK.is_match(&text) => {
                let mut last = 0;
                for caps in MARK.captures_iter(&text) {
                    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    if whole.start() > last {
                        out.push(Event::Text(CowStr::from(text[last..whole.start()].to_owned())));
                    }
                    out.push(Event::InlineHtml(CowStr::Borrowed("<mark>")));
                    out.push(Event::Text(CowStr::from(inner.as_str().to_owned())));
                    out.push(Event::InlineHtml(CowStr::Borrowed("</mark>")));
                    last = whole.end();
                }
                if last < text.len() {
                    out.push(Event::Text(CowStr::from(text[last..].to_owned())));
                }
            }
            other => out.push(other),
        }
    }
    out
}
