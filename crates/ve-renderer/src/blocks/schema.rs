//! Argument schemas for the known custom block types.

use std::collections::HashMap;

/// How positional arguments of one block type are interpreted.
///
/// A positional token that names a boolean attribute becomes
/// `attr="true"`; a token that names a class argument joins the element's
/// `class`; anything else fills the next free default slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSchema {
    /// Attribute names filled by untyped positional tokens, in order.
    pub positional: Vec<String>,
    /// Tokens that become classes.
    pub classes: Vec<String>,
    /// Tokens that become boolean attributes.
    pub booleans: Vec<String>,
}

impl BlockSchema {
    /// Build a schema from string slices.
    #[must_use]
    pub fn new(positional: &[&str], classes: &[&str], booleans: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect();
        Self {
            positional: owned(positional),
            classes: owned(classes),
            booleans: owned(booleans),
        }
    }

    /// Whether `token` is a boolean attribute of this block type.
    #[must_use]
    pub fn is_boolean(&self, token: &str) -> bool {
        self.booleans.iter().any(|b| b == token)
    }

    /// Whether `token` is a class argument of this block type.
    #[must_use]
    pub fn is_class(&self, token: &str) -> bool {
        self.classes.iter().any(|c| c == token)
    }
}

/// Lookup table from block type (`ve-image`) to its [`BlockSchema`].
///
/// Unknown types render with an empty schema: keywords pass through and
/// positional tokens are dropped.
#[derive(Debug, Clone)]
pub struct SchemaTable {
    schemas: HashMap<String, BlockSchema>,
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaTable {
    /// An empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// The built-in visual essay block types.
    #[must_use]
    pub fn builtin() -> Self {
        const SIDES: &[&str] = &["text-left", "text-right"];
        const GRID: &[&str] = &["text-left", "text-right", "col2", "col3"];

        Self::empty()
            .with("ve-card", BlockSchema::new(&["label", "image", "href", "description"], &[], &[]))
            .with("ve-component", BlockSchema::new(&[], &[], &["sticky"]))
            .with("ve-entities", BlockSchema::new(&[], SIDES, &["sticky"]))
            .with("ve-footer", BlockSchema::new(&[], &[], &["sticky"]))
            .with(
                "ve-header",
                BlockSchema::new(&["label", "background", "subtitle", "options", "position"], &[], &["sticky"]),
            )
            .with(
                "ve-image",
                BlockSchema::new(
                    &["src", "options", "seq", "fit"],
                    GRID,
                    &[
                        "cards",
                        "compare",
                        "curtain",
                        "full",
                        "grid",
                        "left",
                        "right",
                        "sticky",
                        "sync",
                        "zoom-on-scroll",
                    ],
                ),
            )
            .with(
                "ve-map",
                BlockSchema::new(
                    &["center", "zoom", "overlay"],
                    SIDES,
                    &["cards", "full", "left", "right", "sticky", "zoom-on-scroll"],
                ),
            )
            .with(
                "ve-media",
                BlockSchema::new(
                    &["manifest"],
                    GRID,
                    &["cards", "compare", "full", "grid", "left", "right", "sticky"],
                ),
            )
            .with("ve-meta", BlockSchema::new(&["title", "description"], &[], &[]))
            .with("ve-style", BlockSchema::new(&["href"], &[], &[]))
            .with(
                "ve-video",
                BlockSchema::new(&["src", "caption"], SIDES, &["full", "left", "right", "sticky"]),
            )
    }

    /// Add or replace the schema for `name`.
    #[must_use]
    pub fn with(mut self, name: &str, schema: BlockSchema) -> Self {
        self.schemas.insert(name.to_owned(), schema);
        self
    }

    /// Schema for a block type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlockSchema> {
        self.schemas.get(name)
    }

    /// Whether `name` is a known block type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}
