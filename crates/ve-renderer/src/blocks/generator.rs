use crate::dom::escape_attr;

use super::args::BlockArgs;
use super::schema::SchemaTable;

/// Renders custom blocks into element markup using a [`SchemaTable`].
#[derive(Debug, Clone, Default)]
pub struct BlockGenerator {
    schemas: SchemaTable,
}

impl BlockGenerator {
    /// Create a generator over a schema table.
    #[must_use]
    pub fn new(schemas: SchemaTable) -> Self {
        Self { schemas }
    }

    /// Map arguments onto element attributes.
    ///
    /// Keyword arguments come first in source order. Each positional token is
    /// then checked against the block's boolean flags, then its class tokens,
    /// then assigned to the next positional default. Setting an attribute that
    /// already exists replaces its value in place.
    #[must_use]
    pub fn attributes(&self, name: &str, args: &BlockArgs) -> Vec<(String, String)> {
        let mut attrs: Vec<(String, String)> = Vec::with_capacity(args.keywords.len() + args.positional.len());
        for (key, value) in &args.keywords {
            set(&mut attrs, key, value.clone());
        }

        let Some(schema) = self.schemas.get(name) else {
            if !args.positional.is_empty() {
                tracing::debug!(block = name, dropped = ?args.positional, "No schema for block, dropping positional args");
            }
            return attrs;
        };

        let mut classes = Vec::new();
        let mut slot = 0;
        for token in &args.positional {
            if schema.is_boolean(token) {
                set(&mut attrs, token, "true".to_owned());
            } else if schema.is_class(token) {
                classes.push(token.as_str());
            } else if let Some(attr) = schema.positional.get(slot) {
                set(&mut attrs, attr, token.clone());
                slot += 1;
            } else {
                tracing::debug!(block = name, token = %token, "Dropping unmatched positional arg");
            }
        }

        if !classes.is_empty() {
            let joined = classes.join(" ");
            let class = match attrs.iter().find(|(k, _)| k == "class") {
                Some((_, existing)) if !existing.is_empty() => format!("{existing} {joined}"),
                _ => joined,
            };
            set(&mut attrs, "class", class);
        }

        attrs
    }

    /// Render `<name attrs...>{body_html}</name>`.
    ///
    /// `body_html` is the already compiled block body.
    #[must_use]
    pub fn generate(&self, name: &str, args: &BlockArgs, body_html: &str) -> String {
        let attrs = self.attributes(name, args);
        tracing::debug!(block = name, ?attrs, "Generated block");

        let mut html = String::with_capacity(name.len() * 2 + body_html.len() + 32);
        html.push('<');
        html.push_str(name);
        for (key, value) in &attrs {
            html.push(' ');
            html.push_str(key);
            html.push_str("=\"");
            escape_attr(value, &mut html);
            html.push('"');
        }
        html.push('>');
        html.push_str(body_html);
        html.push_str("</");
        html.push_str(name);
        html.push('>');
        html
    }
}

fn set(attrs: &mut Vec<(String, String)>, key: &str, value: String) {
    if let Some(slot) = attrs.iter_mut().find(|(k, _)| k == key) {
        slot.1 = value;
    } else {
        attrs.push((key.to_owned(), value));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::blocks::BlockSchema;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_image_positional_boolean_and_class() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("wc:Mona_Lisa.jpg sticky col2 contain");

        assert_eq!(
            generator.attributes("ve-image", &args),
            pairs(&[
                ("src", "wc:Mona_Lisa.jpg"),
                ("sticky", "true"),
                ("options", "contain"),
                ("class", "col2"),
            ])
        );
    }

    #[test]
    fn test_keywords_come_first_and_pass_through() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("Q42 zoom=5 left");

        assert_eq!(
            generator.attributes("ve-map", &args),
            pairs(&[("zoom", "5"), ("center", "Q42"), ("left", "true")])
        );
    }

    #[test]
    fn test_positional_overrides_keyword_in_place() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("src=a.jpg b.jpg");

        assert_eq!(generator.attributes("ve-image", &args), pairs(&[("src", "b.jpg")]));
    }

    #[test]
    fn test_extra_positional_dropped() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("/style.css /other.css");

        assert_eq!(generator.attributes("ve-style", &args), pairs(&[("href", "/style.css")]));
    }

    #[test]
    fn test_explicit_class_joined() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("class=wide text-left");

        assert_eq!(
            generator.attributes("ve-entities", &args),
            pairs(&[("class", "wide text-left")])
        );
    }

    #[test]
    fn test_unknown_block_keeps_keywords_only() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse("stray key=value");

        assert_eq!(
            generator.attributes("ve-add-hypothesis", &args),
            pairs(&[("key", "value")])
        );
    }

    #[test]
    fn test_added_schema_is_used() {
        let schemas = SchemaTable::builtin().with("ve-plant", BlockSchema::new(&["taxon"], &[], &["sticky"]));
        let generator = BlockGenerator::new(schemas);
        let args = BlockArgs::parse("Q158 sticky");

        assert_eq!(
            generator.generate("ve-plant", &args, "<p>Leaf</p>"),
            r#"<ve-plant taxon="Q158" sticky="true"><p>Leaf</p></ve-plant>"#
        );
    }

    #[test]
    fn test_attribute_values_escaped() {
        let generator = BlockGenerator::default();
        let args = BlockArgs::parse(r#"'Say "hi"' x.jpg"#);

        assert_eq!(
            generator.generate("ve-card", &args, ""),
            r#"<ve-card label="Say &quot;hi&quot;" image="x.jpg"></ve-card>"#
        );
    }
}
