//! Image-search client (SerpApi Google Images) and the image resolver.
//!
//! Responses are decoded into types whose every field is optional: a query
//! with no images is an ordinary outcome, not an error.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use seoforge_shared::{ImageResult, ImagesConfig, Result, SeoforgeError};

/// Parameters of one image search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSearchRequest {
    pub query: String,
    /// Result offset.
    pub start: u32,
    /// Number of results requested.
    pub num: usize,
}

/// Decoded image-search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSearchResponse {
    #[serde(default)]
    pub images_results: Option<Vec<ImageHit>>,
    /// Backend-reported problem, e.g. no results for the query.
    #[serde(default)]
    pub error: Option<String>,
}

/// One image result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageHit {
    /// Full-size image URL.
    #[serde(default)]
    pub original: Option<String>,
}

impl ImageSearchResponse {
    /// Up to `limit` original-image URLs, in backend order.
    pub fn original_urls(&self, limit: usize) -> ImageResult {
        self.images_results
            .iter()
            .flatten()
            .filter_map(|hit| hit.original.clone())
            .filter(|url| !url.trim().is_empty())
            .take(limit)
            .collect()
    }
}

/// A backend that answers image searches.
pub trait ImageSearchBackend {
    fn search_images(
        &self,
        request: &ImageSearchRequest,
    ) -> impl Future<Output = Result<ImageSearchResponse>> + Send;
}

// ---------------------------------------------------------------------------
// SerpApiClient
// ---------------------------------------------------------------------------

/// SerpApi client issuing Google Images searches (`engine=google`, `tbm=isch`).
pub struct SerpApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl SerpApiClient {
    /// Create a client from the `[images]` config section and a resolved key.
    pub fn new(config: &ImagesConfig, api_key: String) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SeoforgeError::config(format!("invalid images base_url '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeoforgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn request_url(&self, request: &ImageSearchRequest) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", "google")
            .append_pair("q", &request.query)
            .append_pair("tbm", "isch")
            .append_pair("start", &request.start.to_string())
            .append_pair("num", &request.num.to_string())
            .append_pair("api_key", &self.api_key);
        url
    }
}

impl ImageSearchBackend for SerpApiClient {
    async fn search_images(&self, request: &ImageSearchRequest) -> Result<ImageSearchResponse> {
        let url = self.request_url(request);
        // The URL carries the API key; log the query only.
        debug!(query = %request.query, num = request.num, "searching images");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SeoforgeError::Network(format!("image search: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoforgeError::Network(format!("image search: HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| {
            SeoforgeError::Network(format!(
                "image search: body read failed: {}",
                e.without_url()
            ))
        })?;

        serde_json::from_str(&body)
            .map_err(|e| SeoforgeError::parse(format!("invalid image search response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// ImageResolver
// ---------------------------------------------------------------------------

/// Resolves a product query to representative image URLs.
pub struct ImageResolver<B> {
    backend: B,
    start_index: u32,
}

impl<B: ImageSearchBackend> ImageResolver<B> {
    pub fn new(backend: B, start_index: u32) -> Self {
        Self {
            backend,
            start_index,
        }
    }

    /// Return at most `num_results` image URLs for `query`. Never fails.
    #[instrument(skip_all, fields(query = %query, num_results = num_results))]
    pub async fn resolve(&self, query: &str, num_results: usize) -> ImageResult {
        if num_results == 0 {
            return ImageResult::new();
        }

        let request = ImageSearchRequest {
            query: query.to_string(),
            start: self.start_index,
            num: num_results,
        };

        let response = match self.backend.search_images(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "image search failed, continuing without images");
                return ImageResult::new();
            }
        };

        let urls = response.original_urls(num_results);
        if urls.is_empty() {
            info!(
                backend_error = response.error.as_deref().unwrap_or("none"),
                "no images found for query"
            );
        } else {
            debug!(images = urls.len(), "images resolved");
        }
        urls
    }
}
