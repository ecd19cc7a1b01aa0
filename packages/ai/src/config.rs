//! Query parser configuration.
//!
//! Built once at startup (typically via [`QueryParserConfig::from_env`])
//! and handed to [`QueryParser::new`](crate::QueryParser::new); nothing in
//! this crate reads the environment on its own.

use std::time::Duration;

/// Model tried first when `HF_MODEL` is not set.
pub const DEFAULT_PRIMARY_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Models tried, in order, after the primary model.
pub const SECONDARY_MODELS: &[&str] = &[
    "HuggingFaceH4/zephyr-7b-beta",
    "mistralai/Mistral-7B-Instruct-v0.3",
];

/// Hugging Face serverless inference endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Per-attempt timeout when `HF_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the free-text query parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParserConfig {
    /// Inference API token. `None` disables every model attempt.
    pub api_token: Option<String>,
    /// Model tried first.
    pub primary_model: String,
    /// Models tried after the primary, in order.
    pub secondary_models: Vec<String>,
    /// Inference API base URL.
    pub base_url: String,
    /// Timeout applied to each model attempt.
    pub timeout: Duration,
}

impl Default for QueryParserConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            secondary_models: SECONDARY_MODELS.iter().map(ToString::to_string).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl QueryParserConfig {
    /// Reads the configuration from environment variables.
    ///
    /// * `HF_API_KEY`: inference token (empty counts as unset)
    /// * `HF_MODEL`: primary model ID
    /// * `HF_BASE_URL`: inference API base URL
    /// * `HF_TIMEOUT_SECS`: per-attempt timeout in seconds
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_token = std::env::var("HF_API_KEY")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if api_token.is_none() {
            log::info!("HF_API_KEY not set; free-text queries use the rule-based parser");
        }

        Self {
            api_token,
            primary_model: std::env::var("HF_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.primary_model),
            secondary_models: defaults.secondary_models,
            base_url: std::env::var("HF_BASE_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("HF_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }

    /// Returns the models to try, primary first, without duplicates.
    #[must_use]
    pub fn candidate_models(&self) -> Vec<String> {
        let mut models: Vec<String> = Vec::with_capacity(1 + self.secondary_models.len());
        for model in std::iter::once(&self.primary_model).chain(&self.secondary_models) {
            if !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_start_with_primary() {
        let config = QueryParserConfig {
            primary_model: "my/model".to_string(),
            ..QueryParserConfig::default()
        };
        assert_eq!(
            config.candidate_models(),
            [
                "my/model",
                "HuggingFaceH4/zephyr-7b-beta",
                "mistralai/Mistral-7B-Instruct-v0.3",
            ]
        );
    }

    #[test]
    fn candidates_skip_duplicate_primary() {
        let config = QueryParserConfig {
            primary_model: "HuggingFaceH4/zephyr-7b-beta".to_string(),
            ..QueryParserConfig::default()
        };
        assert_eq!(config.candidate_models().len(), 2);
        assert_eq!(config.candidate_models()[0], "HuggingFaceH4/zephyr-7b-beta");
    }

    #[test]
    fn default_has_no_token() {
        assert!(QueryParserConfig::default().api_token.is_none());
    }
}
