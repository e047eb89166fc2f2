use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, parse_document as parse_html};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::{Document, Element, Node, NodeId};

/// Parse HTML with html5ever and copy the resulting tree into an arena.
pub(super) fn parse_document(html: &str) -> Document {
    let dom = parse_html(RcDom::default(), ParseOpts::default()).one(html);
    let mut doc = Document::new();
    let root = doc.root();
    for child in dom.document.children.borrow().iter() {
        copy_node(&mut doc, root, child);
    }
    doc
}

fn attr_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

fn copy_node(doc: &mut Document, parent: NodeId, handle: &Handle) {
    let id = match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                copy_node(doc, parent, child);
            }
            return;
        }
        NodeData::Doctype { name, .. } => doc.push(Node::Doctype(name.to_string())),
        NodeData::Text { contents } => doc.push(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => doc.push(Node::Comment(contents.to_string())),
        NodeData::ProcessingInstruction { .. } => return,
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let element = Element {
                name: name.local.to_string(),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|a| (attr_name(&a.name), a.value.to_string()))
                    .collect(),
            };
            let id = doc.push(Node::Element(element));
            if let Some(contents) = template_contents.borrow().as_ref() {
                for child in contents.children.borrow().iter() {
                    copy_node(doc, id, child);
                }
            }
            id
        }
    };
    doc.append(parent, id);
    for child in handle.children.borrow().iter() {
        copy_node(doc, id, child);
    }
}
