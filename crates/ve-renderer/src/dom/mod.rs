//! Arena-backed HTML document tree.
//!
//! Every node lives in one `Vec` owned by [`Document`] and is addressed by a
//! [`NodeId`]. Parent and child links are indices, so a stage can hold ids
//! while mutating the tree through `&mut Document` without aliasing.
//!
//! Detached nodes stay in the arena but are unreachable from the root; every
//! traversal starts at a reachable node, so they are invisible to queries and
//! to serialization.

mod parse;
mod serialize;

pub(crate) use serialize::escape_attr;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element: lowercase tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes as `(name, value)` pairs.
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(index).1)
    }

    /// Class tokens in order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Append a class token if missing.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", joined);
    }

    /// Remove a class token; drops the attribute when no class remains.
    pub fn remove_class(&mut self, class: &str) {
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr("class", joined);
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The document root.
    Document,
    /// `<!DOCTYPE name>`.
    Doctype(String),
    /// An element.
    Element(Element),
    /// Character data.
    Text(String),
    /// `<!-- comment -->`.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// HTML document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: Node::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a complete HTML document.
    ///
    /// Parsing follows the HTML5 tree-construction rules, so the result always
    /// has `html`, `head`, and `body` elements.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node payload.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.slots[id.0].node
    }

    /// Element payload, if `id` is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.slots[id.0].node {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element payload, if `id` is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.slots[id.0].node {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Tag name, if `id` is an element.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Whether `id` is an element named `name`.
    #[must_use]
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    /// Attribute of an element.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Set an attribute on an element. No-op for other node kinds.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    /// Whether an element carries `class`.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Add a class to an element.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            element.add_class(class);
        }
    }

    /// Rename an element, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            name.clone_into(&mut element.name);
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Element children in order.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// First element child.
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some())
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.slots.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::Element(Element::new(name)))
    }

    /// Create a detached element with attributes.
    pub fn create_element_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut element = Element::new(name);
        for (key, value) in attrs {
            element.set_attr(key, *value);
        }
        self.push(Node::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::Text(text.into()))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Detach a node from its parent. Its subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Move `child` to index `index` of `parent`'s children.
    ///
    /// The index is clamped to the child count. Moving a node into its own
    /// subtree is ignored.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!("Refusing to move a node into its own subtree");
            return;
        }
        self.detach(child);
        let children = &mut self.slots[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.slots[child.0].parent = Some(parent);
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert(parent, len, child);
    }

    /// Move `node` directly before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        self.detach(node);
        if let Some(index) = self.index_in_parent(sibling) {
            self.insert(parent, index, node);
        }
    }

    /// Put `new` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Detach every child of `id`, returning them in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.slots[id.0].children);
        for &child in &children {
            self.slots[child.0].parent = None;
        }
        children
    }

    /// Replace all children of `id` with one text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.take_children(id);
        let text = self.create_text(text);
        self.append(id, text);
    }

    /// Descendants of `id` in document order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `id` matching `pred`, in document order.
    pub fn find_all(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.element(n).is_some_and(&pred))
            .collect()
    }

    /// Descendant elements named `name`, in document order.
    #[must_use]
    pub fn elements_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.find_all(id, |e| e.name == name)
    }

    /// First descendant element matching `pred`.
    pub fn find_first(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    /// First descendant element named `name`.
    #[must_use]
    pub fn first_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.find_first(id, |e| e.name == name)
    }

    /// Concatenated text of `id` and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Node::Text(text) = self.node(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Node::Text(text) = self.node(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Text of an element whose only child is a text node.
    #[must_use]
    pub fn sole_text(&self, id: NodeId) -> Option<&str> {
        match self.children(id) {
            [only] => match self.node(*only) {
                Node::Text(text) => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// The `<html>` element.
    #[must_use]
    pub fn html(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&c| self.is_element(c, "html"))
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.html()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.is_element(c, "head"))
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.html()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.is_element(c, "body"))
    }

    /// Deep-copy a subtree of `other` into this document, detached.
    pub fn import(&mut self, other: &Document, id: NodeId) -> NodeId {
        let copy = self.push(other.node(id).clone());
        for &child in other.children(id) {
            let child_copy = self.import(other, child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        serialize::to_html(self, self.root())
    }

    /// Serialize one node and its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::to_html(self, id)
    }

    /// Serialize the children of a node.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|&c| serialize::to_html(self, c))
            .collect()
    }
}

/// Whether a tag name is a heading (`h1`..`h6`).
#[must_use]
pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
