//! Product description generation.
//!
//! Builds a single prompt from the product name and its snippets, then asks
//! the completion backend for a description under a bounded retry policy.
//! Exhausting every attempt yields an absent description, never an error.

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use seoforge_shared::{DescriptionResult, GenerationConfig};

use crate::completion::CompletionBackend;
use crate::retry::{RetryPolicy, retry_with_policy};

/// Search engine the snippets come from; the model must not mention it.
const SOURCE_ENGINE: &str = "DuckDuckGo";

/// Markup/script noise that leaks into scraped text.
const SOURCE_MARKUP: &str = "JavaScript";

/// Build the generation instruction for one product.
///
/// Snippets are embedded as a JSON array so their boundaries survive.
pub fn build_prompt(product_name: &str, snippets: &[String], language: &str) -> String {
    let context = serde_json::to_string(snippets).unwrap_or_else(|_| "[]".into());
    format!(
        "Create a detailed SEO description in {language} for the product {product_name} \
         based on the following information: {context}. \
         Do not use commas (,). \
         Do not mention {SOURCE_ENGINE} or {SOURCE_MARKUP}. \
         Reply with the product description only."
    )
}

/// Generates marketing descriptions through a [`CompletionBackend`].
pub struct DescriptionGenerator<B> {
    backend: B,
    language: String,
    policy: RetryPolicy,
}

impl<B: CompletionBackend> DescriptionGenerator<B> {
    pub fn new(backend: B, language: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            language: language.into(),
            policy,
        }
    }

    /// Build a generator from the `[generation]` config section.
    pub fn from_config(backend: B, config: &GenerationConfig) -> Self {
        let policy = RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        );
        Self::new(backend, config.language.clone(), policy)
    }

    /// Generate a description for `product_name`.
    ///
    /// Returns the trimmed text of the first successful attempt, or `None`
    /// once every attempt has failed.
    #[instrument(skip_all, fields(product = %product_name, snippets = snippets.len()))]
    pub async fn generate(&self, product_name: &str, snippets: &[String]) -> DescriptionResult {
        let prompt = build_prompt(product_name, snippets, &self.language);
        let prompt = prompt.as_str();
        let max_attempts = self.policy.max_attempts;

        let outcome = retry_with_policy(&self.policy, |attempt| {
            async move {
                let result = self.backend.complete(prompt).await;
                if let Err(e) = &result {
                    warn!(
                        product = %product_name,
                        attempt,
                        max_attempts,
                        error = %e,
                        "description generation attempt failed"
                    );
                }
                result
            }
        })
        .await;

        match outcome {
            Ok(text) => {
                info!(product = %product_name, "description generated");
                Some(text.trim().to_string())
            }
            Err(exhausted) => {
                error!(
                    product = %product_name,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "description generation failed on every attempt, placeholder will be used"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use seoforge_shared::{Result, SeoforgeError};

    use crate::completion::OpenAiCompletionClient;

    /// Replays scripted responses and records every prompt it receives.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SeoforgeError::Generation("script exhausted".into())))
        }
    }

    fn failure() -> Result<String> {
        Err(SeoforgeError::Generation("backend returned 503".into()))
    }

    fn generator(backend: ScriptedBackend) -> DescriptionGenerator<ScriptedBackend> {
        DescriptionGenerator::new(backend, "Italian", RetryPolicy::default())
    }

    #[test]
    fn prompt_embeds_name_language_and_snippets() {
        let snippets = vec!["solid oak frame with".to_string(), "brass fittings".to_string()];
        let prompt = build_prompt("Oak Widget", &snippets, "Italian");
        assert!(prompt.contains("in Italian for the product Oak Widget"));
        assert!(prompt.contains(r#"["solid oak frame with","brass fittings"]"#));
        assert!(prompt.contains("Do not use commas"));
        assert!(prompt.contains("DuckDuckGo"));
        assert!(prompt.contains("JavaScript"));
    }

    #[test]
    fn prompt_with_no_snippets() {
        let prompt = build_prompt("Widget", &[], "English");
        assert!(prompt.contains("information: []."));
    }

    #[tokio::test]
    async fn success_on_second_attempt_is_verbatim() {
        let backend = ScriptedBackend::new(vec![
            failure(),
            Ok("Elegant widget for every desk".into()),
            Ok("never requested".into()),
        ]);
        let generator = generator(backend);

        let description = generator.generate("Widget", &[]).await;
        assert_eq!(description.as_deref(), Some("Elegant widget for every desk"));
        assert_eq!(generator.backend.calls(), 2);
    }

    #[tokio::test]
    async fn three_failures_yield_absent() {
        let backend = ScriptedBackend::new(vec![failure(), failure(), failure()]);
        let generator = generator(backend);

        assert_eq!(generator.generate("Widget", &[]).await, None);
        assert_eq!(generator.backend.calls(), 3);
    }

    #[tokio::test]
    async fn text_is_trimmed() {
        let backend = ScriptedBackend::new(vec![Ok("\n\n  Lampada elegante  \n".into())]);
        let generator = generator(backend);

        assert_eq!(
            generator.generate("Lamp", &[]).await.as_deref(),
            Some("Lampada elegante")
        );
    }

    #[tokio::test]
    async fn every_attempt_sends_the_same_prompt() {
        let backend = ScriptedBackend::new(vec![failure(), failure(), failure()]);
        let generator = generator(backend);
        generator
            .generate("Widget", &["one two three four five".to_string()])
            .await;

        let prompts = generator.backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p == &prompts[0]));
    }

    #[tokio::test]
    async fn config_controls_attempt_count() {
        let config = GenerationConfig {
            max_attempts: 5,
            ..GenerationConfig::default()
        };
        let backend = ScriptedBackend::new(vec![failure(), failure(), failure(), failure(), failure()]);
        let generator = DescriptionGenerator::from_config(backend, &config);

        assert_eq!(generator.generate("Widget", &[]).await, None);
        assert_eq!(generator.backend.calls(), 5);
    }

    #[tokio::test]
    async fn recovers_after_transient_http_failure() {
        let server = wiremock::MockServer::start().await;

        // First request fails, later ones succeed
        wiremock::Mock::given(wiremock::matchers::path("/v1/completions"))
            .respond_with(wiremock::ResponseTemplate::new(500).set_body_string("overloaded"))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::path("/v1/completions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": " Elegant widget for every desk\n"}]
            })))
            .with_priority(2)
            .expect(1)
            .mount(&server)
            .await;

        let config = GenerationConfig {
            base_url: format!("{}/v1", server.uri()),
            timeout_secs: 5,
            ..GenerationConfig::default()
        };
        let client = OpenAiCompletionClient::new(&config, "test-key").unwrap();
        let generator = DescriptionGenerator::from_config(client, &config);

        let description = generator.generate("Widget", &[]).await;
        assert_eq!(description.as_deref(), Some("Elegant widget for every desk"));
    }
}
