//! Heading-driven sectioning.

use crate::dom::{Document, Node, NodeId, heading_level};

/// Wrap the children of `container` into nested `<section>` elements.
///
/// Each heading opens a section that runs until the next heading of the same
/// or higher rank. Heading attributes move onto the section.
pub(crate) fn sectionize(doc: &mut Document, container: NodeId) {
    let children = doc.take_children(container);
    let mut open: Vec<(u8, NodeId)> = Vec::new();

    for child in children {
        let level = doc.name(child).and_then(heading_level);
        if let Some(level) = level {
            while open.last().is_some_and(|(l, _)| *l >= level) {
                open.pop();
            }
            let section = doc.create_element("section");
            let attrs = doc
                .element_mut(child)
                .map(|heading| std::mem::take(&mut heading.attrs))
                .unwrap_or_default();
            if let Some(element) = doc.element_mut(section) {
                element.attrs = attrs;
            }
            let parent = open.last().map_or(container, |(_, s)| *s);
            doc.append(parent, section);
            doc.append(section, child);
            open.push((level, section));
        } else {
            let parent = open.last().map_or(container, |(_, s)| *s);
            doc.append(parent, child);
        }
    }
}

/// Remove headings whose only content is whitespace or non-breaking spaces.
pub(crate) fn prune_empty_headings(doc: &mut Document, root: NodeId) {
    let empty: Vec<NodeId> = doc
        .find_all(root, |e| heading_level(&e.name).is_some())
        .into_iter()
        .filter(|&h| {
            doc.children(h).iter().all(|&c| matches!(doc.node(c), Node::Text(_)))
                && doc.text_content(h).trim().is_empty()
        })
        .collect();
    for heading in empty {
        doc.detach(heading);
    }
}
