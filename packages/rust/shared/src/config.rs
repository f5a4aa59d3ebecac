//! Application configuration for seoforge.
//!
//! User config lives at `~/.seoforge/seoforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeoforgeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seoforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".seoforge";

/// Shown instead of credentials by [`AppConfig::redacted`].
const REDACTED: &str = "<redacted>";

// ---------------------------------------------------------------------------
// Config structs (matching seoforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output catalog locations.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Generative-text backend settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Web-search backend settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Image-search backend settings.
    #[serde(default)]
    pub images: ImagesConfig,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Input catalog (CSV, no header: code, name, price, ...).
    #[serde(default)]
    pub input_path: Option<String>,

    /// Output catalog, rewritten after every product.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "output.csv".into()
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Inline API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of the env var holding the API key.
    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible completions API.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Language the description is written in.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Total attempts per product before falling back to the placeholder.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between failed attempts.
    #[serde(default)]
    pub retry_delay_ms: u64,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_generation_key_env(),
            base_url: default_generation_base_url(),
            model: default_model(),
            language: default_language(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: 0,
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_generation_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_generation_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo-instruct".into()
}
fn default_language() -> String {
    "Italian".into()
}
fn default_max_tokens() -> u32 {
    600
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_attempts() -> u32 {
    3
}
fn default_generation_timeout() -> u64 {
    60
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint; the query is sent as `?q=`.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_search_base_url() -> String {
    "https://duckduckgo.com/search".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_http_timeout() -> u64 {
    30
}

/// `[images]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Whether image resolution runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Inline API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of the env var holding the API key.
    #[serde(default = "default_images_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_images_base_url")]
    pub base_url: String,

    /// Image URLs kept per product.
    #[serde(default = "default_num_results")]
    pub num_results: usize,

    /// Result offset passed to the backend.
    #[serde(default = "default_start_index")]
    pub start_index: u32,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_key_env: default_images_key_env(),
            base_url: default_images_base_url(),
            num_results: default_num_results(),
            start_index: default_start_index(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_images_key_env() -> String {
    "SERPAPI_API_KEY".into()
}
fn default_images_base_url() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_num_results() -> usize {
    1
}
fn default_start_index() -> u32 {
    1
}

impl AppConfig {
    /// Copy of this config with inline credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.generation.api_key.is_some() {
            config.generation.api_key = Some(REDACTED.into());
        }
        if config.images.api_key.is_some() {
            config.images.api_key = Some(REDACTED.into());
        }
        config
    }

    /// Input catalog path, required before a run can start.
    pub fn input_path(&self) -> Result<PathBuf> {
        match self.catalog.input_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => Err(SeoforgeError::config(
                "no input catalog configured. Set [catalog].input_path or pass --input",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.seoforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SeoforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.seoforge/seoforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SeoforgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SeoforgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeoforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SeoforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeoforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve a credential: the inline value if non-empty, else the named env var.
pub fn resolve_api_key(inline: Option<&str>, env_var: &str, service: &str) -> Result<String> {
    if let Some(key) = inline.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(SeoforgeError::config(format!(
            "{service} API key not found. Set the {env_var} environment variable \
             or `api_key` in the config file."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_path"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn defaults_match_backend_contract() {
        let config: AppConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(config.generation.max_tokens, 600);
        assert_eq!(config.generation.max_attempts, 3);
        assert!((config.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.generation.language, "Italian");
        assert_eq!(config.images.num_results, 1);
        assert_eq!(config.images.start_index, 1);
        assert!(config.images.enabled);
        assert_eq!(config.catalog.output_path, "output.csv");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let toml_str = r#"
[catalog]
input_path = "products.csv"

[images]
enabled = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.input_path().unwrap(), PathBuf::from("products.csv"));
        assert!(!config.images.enabled);
        assert_eq!(config.images.api_key_env, "SERPAPI_API_KEY");
        assert_eq!(config.search.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn missing_input_path_is_config_error() {
        let config = AppConfig::default();
        let err = config.input_path().unwrap_err();
        assert!(err.to_string().contains("input_path"));
    }

    #[test]
    fn redacted_hides_inline_keys() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("sk-secret".into());
        let shown = toml::to_string_pretty(&config.redacted()).expect("serialize");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn inline_key_wins_over_env() {
        let key = resolve_api_key(Some(" inline-key "), "SF_TEST_UNUSED_ENV_98765", "OpenAI")
            .expect("inline key");
        assert_eq!(key, "inline-key");
    }

    #[test]
    fn api_key_missing_is_reported() {
        // Use a unique env var name to avoid interfering with other tests
        let result = resolve_api_key(None, "SF_TEST_NONEXISTENT_KEY_12345", "SerpApi");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("SerpApi API key not found"));
        assert!(err.contains("SF_TEST_NONEXISTENT_KEY_12345"));
    }
}
