//! Web-search client and the text collector built on it.
//!
//! The collector never fails: a search that cannot be completed degrades to
//! an empty [`SnippetSet`] and a warning.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use seoforge_shared::{Result, SearchConfig, SeoforgeError, SnippetSet};

use crate::snippets::{extract_visible_text, segment};

/// A backend that returns a text/HTML document for a query.
pub trait SearchBackend {
    /// Fetch the raw response body for `query`.
    fn search(&self, query: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// WebSearchClient
// ---------------------------------------------------------------------------

/// HTTP search client: `GET {base_url}?q={query}`.
pub struct WebSearchClient {
    client: Client,
    base_url: Url,
}

impl WebSearchClient {
    /// Create a client from the `[search]` config section.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SeoforgeError::config(format!("invalid search base_url '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeoforgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }
}

impl SearchBackend for WebSearchClient {
    async fn search(&self, query: &str) -> Result<String> {
        let url = self.search_url(query);
        debug!(%url, "searching");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SeoforgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoforgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SeoforgeError::Network(format!("{url}: body read failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// TextCollector
// ---------------------------------------------------------------------------

/// Turns a query into candidate snippets for description generation.
pub struct TextCollector<B> {
    backend: B,
}

impl<B: SearchBackend> TextCollector<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Collect snippets for `query`. Never fails; errors yield an empty set.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn collect(&self, query: &str) -> SnippetSet {
        if query.trim().is_empty() {
            warn!("empty search query, skipping text collection");
            return SnippetSet::new();
        }

        match self.backend.search(query).await {
            Ok(body) => {
                let snippets = segment(&extract_visible_text(&body));
                debug!(snippets = snippets.len(), "text collected");
                snippets
            }
            Err(e) => {
                warn!(error = %e, "text search failed, continuing without snippets");
                SnippetSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingBackend {
        calls: AtomicU32,
        body: Result<String>,
    }

    impl SearchBackend for CountingBackend {
        async fn search(&self, _query: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.body {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(SeoforgeError::Network(e.to_string())),
            }
        }
    }

    fn search_config(base_url: &str) -> SearchConfig {
        SearchConfig {
            base_url: base_url.to_string(),
            user_agent: "Mozilla/5.0".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn search_url_encodes_query() {
        let client = WebSearchClient::new(&search_config("https://duckduckgo.com/search")).unwrap();
        let url = client.search_url("Acme Lamp & Shade");
        assert_eq!(
            url.as_str(),
            "https://duckduckgo.com/search?q=Acme+Lamp+%26+Shade"
        );
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = WebSearchClient::new(&search_config("not a url"));
        assert!(matches!(result, Err(SeoforgeError::Config { .. })));
    }

    #[tokio::test]
    async fn empty_query_makes_no_call() {
        let backend = CountingBackend {
            calls: AtomicU32::new(0),
            body: Ok("<p>one two three four five</p>".into()),
        };
        let collector = TextCollector::new(backend);
        assert!(collector.collect("   ").await.is_empty());
        assert_eq!(collector.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failure_yields_empty_set() {
        let backend = CountingBackend {
            calls: AtomicU32::new(0),
            body: Err(SeoforgeError::Network("connection reset".into())),
        };
        let collector = TextCollector::new(backend);
        assert!(collector.collect("Widget").await.is_empty());
        assert_eq!(collector.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn collects_from_mock_server() {
        let server = wiremock::MockServer::start().await;

        let page = r#"<html><body>
            <p>Solid oak widget with brass fittings</p>
            <p>ships worldwide in two days</p>
        </body></html>"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/search"))
            .and(wiremock::matchers::query_param("q", "Oak Widget"))
            .and(wiremock::matchers::header("user-agent", "Mozilla/5.0"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebSearchClient::new(&search_config(&format!("{}/search", server.uri()))).unwrap();
        let snippets = TextCollector::new(client).collect("Oak Widget").await;

        assert_eq!(
            snippets,
            vec!["Solid oak widget with brass", "fittings ships worldwide in two"]
        );
    }

    #[tokio::test]
    async fn non_success_status_yields_empty_set() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/search"))
            .respond_with(
                wiremock::ResponseTemplate::new(503).set_body_string("<p>one two three four five</p>"),
            )
            .mount(&server)
            .await;

        let client = WebSearchClient::new(&search_config(&format!("{}/search", server.uri()))).unwrap();
        let snippets = TextCollector::new(client).collect("Widget").await;
        assert!(snippets.is_empty());
    }
}
