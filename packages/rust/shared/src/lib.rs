//! Shared types, error model, and configuration for seoforge.
//!
//! This crate is the foundation depended on by all other seoforge crates.
//! It provides:
//! - [`SeoforgeError`]: the unified error type
//! - Domain types ([`ProductRecord`], [`OutputRow`], [`SnippetSet`])
//! - Configuration ([`AppConfig`], config loading, credential resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, GenerationConfig, ImagesConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, SeoforgeError};
pub use types::{
    DESCRIPTION_PLACEHOLDER, DescriptionResult, ImageResult, OutputRow, ProductRecord,
    SHORT_DESCRIPTION_LEN, SHORT_DESCRIPTION_PLACEHOLDER, SnippetSet,
};
