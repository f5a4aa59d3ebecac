//! Delimited catalog I/O.
//!
//! - [`CatalogReader`] streams [`ProductRecord`]s from the input catalog.
//! - [`CatalogWriter`] rewrites the whole enriched catalog after each product.
//!
//! [`ProductRecord`]: seoforge_shared::ProductRecord

mod reader;
mod writer;

pub use reader::CatalogReader;
pub use writer::{CatalogWriter, OUTPUT_HEADER, write_rows};
