//! Generative-text backend: an OpenAI-compatible completions client.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use seoforge_shared::{GenerationConfig, Result, SeoforgeError};

/// Fixed sampling parameters sent with every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&GenerationConfig> for CompletionParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A backend that completes a prompt into text.
pub trait CompletionBackend {
    /// Return the raw generated text, or an error on any backend failure.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    n: u32,
    stop: Option<Vec<String>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// OpenAiCompletionClient
// ---------------------------------------------------------------------------

/// Client for `POST {base_url}/completions`.
pub struct OpenAiCompletionClient {
    client: Client,
    endpoint: Url,
    params: CompletionParams,
}

impl OpenAiCompletionClient {
    /// Create a client from the `[generation]` config section and a resolved key.
    pub fn new(config: &GenerationConfig, api_key: &str) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/completions")).map_err(|e| {
            SeoforgeError::config(format!(
                "invalid generation base_url '{}': {e}",
                config.base_url
            ))
        })?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        let mut auth = HeaderValue::from_str(&auth)
            .map_err(|_| SeoforgeError::config("generation API key is not a valid header value"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SeoforgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            params: CompletionParams::from(config),
        })
    }
}

impl CompletionBackend for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = CompletionRequest {
            model: &self.params.model,
            prompt,
            max_tokens: self.params.max_tokens,
            n: 1,
            stop: None,
            temperature: self.params.temperature,
        };

        debug!(model = %self.params.model, prompt_len = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| SeoforgeError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            let excerpt: String = text.chars().take(200).collect();
            return Err(SeoforgeError::Generation(format!(
                "backend returned {status}: {excerpt}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| SeoforgeError::Generation(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.text)
            .ok_or_else(|| SeoforgeError::Generation("response contained no completion".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> GenerationConfig {
        GenerationConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn request_serializes_backend_contract() {
        let body = CompletionRequest {
            model: "gpt-3.5-turbo-instruct",
            prompt: "hello",
            max_tokens: 600,
            n: 1,
            stop: None,
            temperature: 0.2,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 600);
        assert_eq!(json["n"], 1);
        assert!(json["stop"].is_null());
        assert_eq!(json["model"], "gpt-3.5-turbo-instruct");
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = OpenAiCompletionClient::new(&config("::nope::"), "key");
        assert!(matches!(result, Err(SeoforgeError::Config { .. })));
    }

    #[tokio::test]
    async fn completes_against_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/completions"))
            .and(wiremock::matchers::header("authorization", "Bearer test-key"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo-instruct",
                "max_tokens": 600,
                "n": 1,
                "prompt": "Describe the widget",
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": "\n\nA fine widget.", "index": 0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiCompletionClient::new(&config(&format!("{}/v1/", server.uri())), "test-key")
                .unwrap();
        let text = client.complete("Describe the widget").await.unwrap();
        assert_eq!(text, "\n\nA fine widget.");
    }

    #[tokio::test]
    async fn error_status_is_generation_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/v1/completions"))
            .respond_with(
                wiremock::ResponseTemplate::new(429).set_body_string("rate limit exceeded"),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiCompletionClient::new(&config(&format!("{}/v1", server.uri())), "k").unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limit exceeded"));
    }

    #[tokio::test]
    async fn empty_choices_is_generation_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/v1/completions"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiCompletionClient::new(&config(&format!("{}/v1", server.uri())), "k").unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert!(matches!(err, SeoforgeError::Generation(_)));
    }
}
