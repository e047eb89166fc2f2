//! Tabs and cards layout.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ve_renderer::dom::heading_level;
use ve_renderer::{Document, NodeId};

/// Characters left as-is in an escaped file name.
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Hidden list items in card metadata.
const HIDDEN_FIELDS: &[&str] = &["coords", "eid", "qid"];

/// Rewrite `tabs` and `cards` sections into their final markup.
pub fn normalize_layout(doc: &mut Document) {
    let Some(body) = doc.body() else {
        return;
    };
    for section in doc.find_all(body, |e| e.name == "section" && e.has_class("tabs")) {
        config_tabs(doc, section);
    }
    for section in doc.find_all(body, |e| e.name == "section" && e.has_class("cards")) {
        config_cards(doc, section);
    }
}

fn child_sections(doc: &Document, node: NodeId) -> Vec<NodeId> {
    doc.element_children(node)
        .into_iter()
        .filter(|&c| doc.is_element(c, "section"))
        .collect()
}

/// The leading heading of a section, if its first element is one.
fn leading_heading(doc: &Document, section: NodeId) -> Option<NodeId> {
    doc.first_element_child(section)
        .filter(|&h| doc.name(h).and_then(heading_level).is_some())
}

/// Radio-button tabs: one input and label per child section, at positions
/// `2i` and `2i+1`, and classes `tab contentN` on the section.
fn config_tabs(doc: &mut Document, container: NodeId) {
    for (idx, tab) in child_sections(doc, container).into_iter().enumerate() {
        let n = idx + 1;
        let tab_id = format!("tab{n}");

        let heading = leading_heading(doc, tab);
        let label_text = heading
            .map(|h| doc.text_content(h).trim().to_owned())
            .unwrap_or_default();

        let input = doc.create_element_with("input", &[("type", "radio"), ("name", "tabs"), ("id", tab_id.as_str())]);
        if idx == 0 {
            doc.set_attr(input, "checked", "");
        }
        let label = doc.create_element_with("label", &[("for", tab_id.as_str())]);
        doc.set_text(label, label_text);

        doc.insert(container, idx * 2, input);
        doc.insert(container, idx * 2 + 1, label);
        doc.add_class(tab, "tab");
        doc.add_class(tab, &format!("content{n}"));
        if let Some(heading) = heading {
            doc.detach(heading);
        }
    }
}

/// Percent-escape the final path segment of a URL, dropping a trailing `/`.
fn quote_file_name(url: &str) -> String {
    let url = url.strip_suffix('/').unwrap_or(url);
    match url.rsplit_once('/') {
        Some((head, name)) => format!("{head}/{}", utf8_percent_encode(name, FILE_NAME)),
        None => utf8_percent_encode(url, FILE_NAME).to_string(),
    }
}

fn config_cards(doc: &mut Document, container: NodeId) {
    if let Some(element) = doc.element_mut(container) {
        element.remove_class("cards");
    }
    let wrapper = doc.create_element_with("section", &[("class", "cards wrapper")]);

    for card in child_sections(doc, container) {
        config_card(doc, card);
        doc.append(wrapper, card);
    }
    doc.append(container, wrapper);
}

fn config_card(doc: &mut Document, card: NodeId) {
    let heading = leading_heading(doc, card);
    let title_text = heading
        .map(|h| doc.text_content(h).trim().to_owned())
        .unwrap_or_default();
    let title = match doc.attr(card, "href").map(str::to_owned) {
        Some(href) => doc.create_element_with("a", &[("href", href.as_str())]),
        None => doc.create_element("span"),
    };
    doc.set_attr(title, "class", "card-title");
    doc.set_text(title, title_text);
    doc.insert(card, 0, title);
    if let Some(heading) = heading {
        doc.detach(heading);
    }

    if let Some(p) = doc.first_named(card, "p")
        && let Some(img) = doc.first_named(p, "img")
    {
        let src = doc.attr(img, "src").unwrap_or_default();
        let style = format!(
            "background-image:url('{}'); background-repeat:no-repeat; background-size:cover; background-position:center;",
            quote_file_name(src)
        );
        let tile = doc.create_element_with("div", &[("class", "card-image"), ("style", style.as_str())]);
        doc.insert(card, 1, tile);
        doc.detach(p);
    }

    if let Some(list) = doc.first_named(card, "ul") {
        doc.set_attr(list, "class", "card-metadata");
        for item in doc.elements_named(list, "li") {
            let text = doc.text_content(item);
            let label = text.split(':').next().unwrap_or_default().trim().to_lowercase();
            if HIDDEN_FIELDS.contains(&label.as_str()) {
                doc.set_attr(item, "class", "hide");
            }
        }
    }

    if let Some(p) = doc.first_named(card, "p") {
        doc.set_attr(p, "class", "card-abstract");
    }
    doc.add_class(card, "card");
}
