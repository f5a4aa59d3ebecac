//! Core domain types for catalog enrichment.

/// Description written when generation failed on every attempt.
pub const DESCRIPTION_PLACEHOLDER: &str = "Insert Description";

/// Short description written when generation failed on every attempt.
pub const SHORT_DESCRIPTION_PLACEHOLDER: &str = "Insert Short Description";

/// Number of characters of the description kept as the short description.
pub const SHORT_DESCRIPTION_LEN: usize = 100;

/// Ordered text fragments gathered for one product.
pub type SnippetSet = Vec<String>;

/// Generated description; `None` when every attempt failed.
pub type DescriptionResult = Option<String>;

/// Image URLs in backend order; may be empty.
pub type ImageResult = Vec<String>;

// ---------------------------------------------------------------------------
// ProductRecord
// ---------------------------------------------------------------------------

/// One product read verbatim from the input catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    /// Product code (SKU).
    pub sku: String,
    /// Product name, also used as the search query.
    pub name: String,
    /// Price, copied through untouched.
    pub price: String,
    /// 1-based line in the input file, for diagnostics.
    pub line: u64,
}

// ---------------------------------------------------------------------------
// OutputRow
// ---------------------------------------------------------------------------

/// One enriched catalog row, built once per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub sku: String,
    pub name: String,
    /// Always `true`; there is no way to emit an unpublished product.
    pub published: bool,
    pub description: DescriptionResult,
    pub price: String,
    pub images: ImageResult,
}

impl OutputRow {
    /// Build the output row for `record` from the collaborator results.
    pub fn new(record: &ProductRecord, description: DescriptionResult, images: ImageResult) -> Self {
        Self {
            sku: record.sku.clone(),
            name: record.name.clone(),
            published: true,
            description,
            price: record.price.clone(),
            images,
        }
    }

    /// Description text, or the placeholder when generation failed.
    pub fn description_text(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or(DESCRIPTION_PLACEHOLDER)
    }

    /// First [`SHORT_DESCRIPTION_LEN`] characters of the description, or the
    /// short placeholder when generation failed.
    pub fn short_description(&self) -> String {
        match &self.description {
            Some(text) => text.chars().take(SHORT_DESCRIPTION_LEN).collect(),
            None => SHORT_DESCRIPTION_PLACEHOLDER.to_string(),
        }
    }

    /// Whether the placeholder will be written for this row.
    pub fn uses_placeholder(&self) -> bool {
        self.description.is_none()
    }
}
