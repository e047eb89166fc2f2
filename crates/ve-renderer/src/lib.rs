//! Markdown compilation for visual essays.
//!
//! [`Compiler`] turns essay markdown into a [`Document`]: custom block
//! directives become `ve-*` elements through the schema-driven
//! [`BlockGenerator`], and headings open nested `<section>` elements.
//!
//! # Example
//!
//! ```
//! use ve_renderer::Compiler;
//!
//! let doc = Compiler::new().compile("# Title\n\n.ve-map Q90 zoom=6\n");
//! let body = doc.body().unwrap();
//! let map = doc.first_named(body, "ve-map").unwrap();
//! assert_eq!(doc.attr(map, "center"), Some("Q90"));
//! ```

mod blocks;
mod compiler;
pub mod dom;
mod outline;

pub use blocks::{BlockArgs, BlockGenerator, BlockSchema, SchemaTable};
pub use compiler::Compiler;
pub use dom::{Document, Element, Node, NodeId};
