//! Custom block directives.
//!
//! A directive such as
//!
//! ```text
//! ::: ve-image wc:Mona_Lisa.jpg sticky caption="La Gioconda"
//!     Body markdown
//! ```
//!
//! is lifted out of the markdown before compilation and rendered as a
//! `<ve-image ...>` element whose attributes come from a per-type
//! [`BlockSchema`].

mod args;
mod fence;
mod generator;
mod preprocessor;
mod schema;

pub use args::BlockArgs;
pub use generator::BlockGenerator;
pub(crate) use preprocessor::{extract, placeholder};
pub use schema::{BlockSchema, SchemaTable};
