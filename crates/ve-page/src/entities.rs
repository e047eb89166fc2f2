//! Entity tagging.
//!
//! Paragraph text may carry entity tokens (`Q42`). They are stripped from
//! the visible text and recorded in an `entities` attribute, then threaded
//! down the tree so every paragraph and section knows the entities of its
//! context.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use ve_renderer::{Document, NodeId};

static QID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(Q[0-9]+)\b").unwrap());
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}").unwrap());

/// Elements that receive the merged set and pass it to `ve-*` children.
const CONTAINERS: &[&str] = &["p", "section", "main", "body"];

/// Ordered set of entity tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySet(Vec<String>);

impl EntitySet {
    /// Parse a space-separated attribute value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut set = Self::default();
        for token in value.split_whitespace() {
            set.insert(token);
        }
        set
    }

    /// Entity tokens found in free text, in order of appearance.
    #[must_use]
    pub fn find(text: &str) -> Self {
        let mut set = Self::default();
        for caps in QID.captures_iter(text) {
            set.insert(&caps[1]);
        }
        set
    }

    /// Add a token unless already present.
    pub fn insert(&mut self, token: &str) {
        if !self.0.iter().any(|t| t == token) {
            self.0.push(token.to_owned());
        }
    }

    /// `self` followed by the tokens of `other` not already present.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for token in &other.0 {
            merged.insert(token);
        }
        merged
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    fn of(doc: &Document, node: NodeId) -> Self {
        doc.attr(node, "entities").map(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for EntitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Strip entity tokens from paragraphs and thread entity sets down the tree.
pub fn tag_entities(doc: &mut Document) {
    let Some(body) = doc.body() else {
        return;
    };
    for p in doc.elements_named(body, "p") {
        tag_paragraph(doc, p);
    }
    let root = doc.root();
    thread(doc, root, &EntitySet::default());
}

fn tag_paragraph(doc: &mut Document, p: NodeId) {
    let Some(mut text) = doc.sole_text(p).map(str::to_owned) else {
        return;
    };

    let found = EntitySet::find(&text);
    if !found.is_empty() {
        let stripped = QID.replace_all(&text, "").trim().to_owned();
        if stripped.is_empty() {
            if let Some(parent) = doc.parent(p) {
                let merged = EntitySet::of(doc, parent).union(&found);
                doc.set_attr(parent, "entities", merged.to_string());
            }
            doc.detach(p);
            return;
        }
        doc.set_text(p, stripped.clone());
        let merged = EntitySet::of(doc, p).union(&found);
        doc.set_attr(p, "entities", merged.to_string());
        text = stripped;
    }

    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    if lines.len() < 2 {
        return;
    }
    let Some(stamp) = TIMESTAMP.find(lines[0]).map(|m| m.as_str().to_owned()) else {
        return;
    };

    doc.take_children(p);
    doc.set_attr(p, "data-start", stamp.clone());
    let mark = doc.create_element_with("mark", &[("start", &stamp)]);
    let bold = doc.create_element("b");
    let first = doc.create_text(lines[0]);
    let br = doc.create_element("br");
    let rest = doc.create_text(lines[1..].join(" "));
    doc.append(bold, first);
    doc.append(mark, bold);
    doc.append(p, mark);
    doc.append(p, br);
    doc.append(p, rest);
}

/// Depth-first pass carrying the accumulated ancestor set downward.
fn thread(doc: &mut Document, node: NodeId, inherited: &EntitySet) {
    for child in doc.element_children(node) {
        let merged = EntitySet::of(doc, child).union(inherited);
        let is_container = doc.name(child).is_some_and(|name| CONTAINERS.contains(&name));
        if is_container && !merged.is_empty() {
            doc.set_attr(child, "entities", merged.to_string());
            for component in doc.element_children(child) {
                if doc.name(component).is_some_and(|name| name.starts_with("ve-")) {
                    let combined = EntitySet::of(doc, component).union(&merged);
                    doc.set_attr(component, "entities", combined.to_string());
                }
            }
        }
        thread(doc, child, &merged);
    }
}
