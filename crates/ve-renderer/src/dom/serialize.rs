use super::{Document, Node, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

pub(super) fn to_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.node(id) {
        Node::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        Node::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Text(text) => {
            let raw = doc
                .parent(id)
                .and_then(|p| doc.name(p))
                .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.name.as_str()) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value for a double-quoted attribute.
pub(crate) fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let doc = Document::parse(r#"<p>a<br>b<img src="x.png"></p>"#);
        let body = doc.body().unwrap();

        assert_eq!(doc.inner_html(body), r#"<p>a<br>b<img src="x.png"></p>"#);
    }

    #[test]
    fn test_script_is_not_escaped() {
        let doc = Document::parse("<script>if (a < b && c) {}</script>");
        let head = doc.head().unwrap();

        assert_eq!(doc.inner_html(head), "<script>if (a < b && c) {}</script>");
    }

    #[test]
    fn test_text_and_attr_escaping() {
        let doc = Document::parse(r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2&nbsp;</a>"#);
        let body = doc.body().unwrap();

        assert_eq!(
            doc.inner_html(body),
            r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2&nbsp;</a>"#
        );
    }

    #[test]
    fn test_full_document() {
        let doc = Document::parse("<!DOCTYPE html><html><head><title>T</title></head><body></body></html>");

        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html><html><head><title>T</title></head><body></body></html>"
        );
    }
}
