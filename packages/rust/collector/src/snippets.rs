//! Visible-text extraction and snippet segmentation.
//!
//! A search response is reduced to its visible words, which are then grouped
//! into fixed-size snippets used as generation context.

use scraper::Html;
use seoforge_shared::SnippetSet;

/// Words per snippet.
pub const SNIPPET_WORDS: usize = 5;

/// Snippets must be strictly shorter than this many characters.
pub const MAX_SNIPPET_CHARS: usize = 450;

/// Elements whose text content is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the visible text of an HTML document, in document order.
///
/// Text nodes are joined with a single space so words from adjacent
/// elements never run together.
pub fn extract_visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// Split `text` into consecutive [`SNIPPET_WORDS`]-word snippets.
///
/// Snippets of [`MAX_SNIPPET_CHARS`] characters or more are dropped, as is a
/// trailing group with fewer than [`SNIPPET_WORDS`] words. Source order is
/// kept and duplicates are not removed.
pub fn segment(text: &str) -> SnippetSet {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(SNIPPET_WORDS)
        .filter(|chunk| chunk.len() == SNIPPET_WORDS)
        .map(|chunk| chunk.join(" "))
        .filter(|snippet| snippet.chars().count() < MAX_SNIPPET_CHARS)
        .collect()
}
