//! End-to-end enrichment pipeline: input catalog → snippets → description →
//! images → output catalog.
//!
//! Products are processed strictly one at a time, in input order. Backend
//! failures degrade a product's fields but never stop the run; the output
//! catalog is rewritten after every product so a crash loses at most the
//! product in flight.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use seoforge_catalog::{CatalogReader, CatalogWriter};
use seoforge_collector::{
    ImageResolver, ImageSearchBackend, SearchBackend, SerpApiClient, TextCollector,
    WebSearchClient,
};
use seoforge_shared::{AppConfig, ImageResult, OutputRow, ProductRecord, Result, resolve_api_key};

use crate::completion::{CompletionBackend, OpenAiCompletionClient};
use crate::enrichment::DescriptionGenerator;

// ---------------------------------------------------------------------------
// Product lifecycle
// ---------------------------------------------------------------------------

/// Where a product is in its trip through the pipeline.
///
/// There is no failure state: every well-formed product ends `Persisted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStage {
    Pending,
    TextCollected,
    DescriptionAttempted,
    ImageResolved,
    Persisted,
}

impl ProductStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::TextCollected => "text_collected",
            Self::DescriptionAttempted => "description_attempted",
            Self::ImageResolved => "image_resolved",
            Self::Persisted => "persisted",
        }
    }
}

impl std::fmt::Display for ProductStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Products written to the output catalog.
    pub processed: usize,
    /// Products with a generated description.
    pub descriptions_generated: usize,
    /// Products written with the description placeholder.
    pub placeholders: usize,
    /// Products with at least one image.
    pub with_images: usize,
    /// Output catalog location.
    pub output_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a product enters the pipeline. `index` is 0-based.
    fn product_started(&self, index: usize, record: &ProductRecord);
    /// Called on every stage transition of the current product.
    fn stage(&self, record: &ProductRecord, stage: ProductStage);
    /// Called after the output catalog has been rewritten with this row.
    fn product_persisted(&self, index: usize, row: &OutputRow);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn product_started(&self, _index: usize, _record: &ProductRecord) {}
    fn stage(&self, _record: &ProductRecord, _stage: ProductStage) {}
    fn product_persisted(&self, _index: usize, _row: &OutputRow) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Sequential orchestrator over the three collaborators and the writer.
pub struct Pipeline<S, G, I> {
    collector: TextCollector<S>,
    generator: DescriptionGenerator<G>,
    /// `None` when image resolution is disabled.
    images: Option<ImageResolver<I>>,
    num_images: usize,
    writer: CatalogWriter,
}

/// The pipeline wired to the real HTTP backends.
pub type HttpPipeline = Pipeline<WebSearchClient, OpenAiCompletionClient, SerpApiClient>;

impl HttpPipeline {
    /// Build the HTTP-backed pipeline from config.
    ///
    /// Fails if a required credential is missing or a backend URL is invalid.
    /// The image-search credential is only required when images are enabled.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let generation_key = resolve_api_key(
            config.generation.api_key.as_deref(),
            &config.generation.api_key_env,
            "Generation",
        )?;

        let images = if config.images.enabled {
            let images_key = resolve_api_key(
                config.images.api_key.as_deref(),
                &config.images.api_key_env,
                "Image search",
            )?;
            let client = SerpApiClient::new(&config.images, images_key)?;
            Some(ImageResolver::new(client, config.images.start_index))
        } else {
            None
        };

        let collector = TextCollector::new(WebSearchClient::new(&config.search)?);
        let completion = OpenAiCompletionClient::new(&config.generation, &generation_key)?;
        let generator = DescriptionGenerator::from_config(completion, &config.generation);
        let writer = CatalogWriter::new(&config.catalog.output_path);

        Ok(Pipeline::new(
            collector,
            generator,
            images,
            config.images.num_results,
            writer,
        ))
    }
}

impl<S, G, I> Pipeline<S, G, I>
where
    S: SearchBackend,
    G: CompletionBackend,
    I: ImageSearchBackend,
{
    pub fn new(
        collector: TextCollector<S>,
        generator: DescriptionGenerator<G>,
        images: Option<ImageResolver<I>>,
        num_images: usize,
        writer: CatalogWriter,
    ) -> Self {
        Self {
            collector,
            generator,
            images,
            num_images,
            writer,
        }
    }

    /// Run every record through the pipeline, rewriting the output after each.
    ///
    /// A record error (e.g. a malformed row) or a failed write aborts the run;
    /// the output then holds every product persisted before it.
    #[instrument(skip_all, fields(output = %self.writer.path().display()))]
    pub async fn run<R>(&self, records: R, progress: &dyn ProgressReporter) -> Result<RunSummary>
    where
        R: IntoIterator<Item = Result<ProductRecord>>,
    {
        let start = Instant::now();
        let mut accumulator: Vec<OutputRow> = Vec::new();

        info!(images_enabled = self.images.is_some(), "starting enrichment run");

        for (index, record) in records.into_iter().enumerate() {
            let record = record.inspect_err(|e| {
                error!(index, error = %e, "aborting run on unreadable input row");
            })?;

            progress.product_started(index, &record);
            let row = self.process(&record, progress).await;
            if row.uses_placeholder() {
                warn!(sku = %record.sku, name = %record.name, "no description, writing placeholder");
            }

            accumulator.push(row);
            self.writer.persist(&accumulator)?;

            self.transition(&record, ProductStage::Persisted, progress);
            if let Some(row) = accumulator.last() {
                progress.product_persisted(index, row);
            }
            info!(
                index,
                sku = %record.sku,
                name = %record.name,
                rows = accumulator.len(),
                "product persisted"
            );
        }

        let placeholders = accumulator.iter().filter(|r| r.uses_placeholder()).count();
        let summary = RunSummary {
            processed: accumulator.len(),
            descriptions_generated: accumulator.len() - placeholders,
            placeholders,
            with_images: accumulator.iter().filter(|r| !r.images.is_empty()).count(),
            output_path: self.writer.path().to_path_buf(),
            elapsed: start.elapsed(),
        };

        progress.done(&summary);

        info!(
            processed = summary.processed,
            descriptions = summary.descriptions_generated,
            placeholders = summary.placeholders,
            with_images = summary.with_images,
            elapsed_ms = summary.elapsed.as_millis(),
            "enrichment run complete"
        );

        Ok(summary)
    }

    /// Drive one product through text collection, generation and images.
    #[instrument(skip_all, fields(sku = %record.sku, name = %record.name))]
    async fn process(&self, record: &ProductRecord, progress: &dyn ProgressReporter) -> OutputRow {
        self.transition(record, ProductStage::Pending, progress);

        let snippets = self.collector.collect(&record.name).await;
        if snippets.is_empty() {
            warn!("no usable text found, generating from the product name alone");
        }
        self.transition(record, ProductStage::TextCollected, progress);

        let description = self.generator.generate(&record.name, &snippets).await;
        self.transition(record, ProductStage::DescriptionAttempted, progress);

        let images = match &self.images {
            Some(resolver) => resolver.resolve(&record.name, self.num_images).await,
            None => ImageResult::new(),
        };
        self.transition(record, ProductStage::ImageResolved, progress);

        OutputRow::new(record, description, images)
    }

    fn transition(&self, record: &ProductRecord, stage: ProductStage, progress: &dyn ProgressReporter) {
        debug!(%stage, "stage reached");
        progress.stage(record, stage);
    }
}

/// Open the configured input catalog and run the HTTP pipeline over it.
///
/// Setup problems (credentials, URLs, unreadable input) fail before any
/// product is processed.
pub async fn run_catalog(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let pipeline = HttpPipeline::from_config(config)?;
    let input = config.input_path()?;
    let records = CatalogReader::open(&input)?;

    info!(input = %input.display(), "input catalog opened");
    pipeline.run(records, progress).await
}
