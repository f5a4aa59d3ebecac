//! Core enrichment logic for seoforge.
//!
//! Ties the text collector, the description generator and the image resolver
//! to the catalog writer in a sequential per-product pipeline.

pub mod completion;
pub mod enrichment;
pub mod pipeline;
pub mod retry;

pub use completion::{CompletionBackend, CompletionParams, OpenAiCompletionClient};
pub use enrichment::{DescriptionGenerator, build_prompt};
pub use pipeline::{
    HttpPipeline, Pipeline, ProductStage, ProgressReporter, RunSummary, SilentProgress,
    run_catalog,
};
pub use retry::{Exhausted, RetryPolicy, retry_with_policy};
