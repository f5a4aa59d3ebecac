//! Backend collaborators that gather material for a product.
//!
//! This crate provides:
//! - [`search`]: web-search client and the [`TextCollector`]
//! - [`snippets`]: visible-text extraction and snippet segmentation
//! - [`images`]: image-search client and the [`ImageResolver`]

pub mod images;
pub mod search;
pub mod snippets;

pub use images::{
    ImageHit, ImageResolver, ImageSearchBackend, ImageSearchRequest, ImageSearchResponse,
    SerpApiClient,
};
pub use search::{SearchBackend, TextCollector, WebSearchClient};
pub use snippets::{MAX_SNIPPET_CHARS, SNIPPET_WORDS, extract_visible_text, segment};
