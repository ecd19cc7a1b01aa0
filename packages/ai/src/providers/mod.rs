//! Text-generation provider abstraction and implementations.
//!
//! The query parser only needs "prompt in, text out", so providers expose
//! a single completion call parameterized by model ID.

pub mod huggingface;

use std::sync::Arc;

use crate::{AiError, QueryParserConfig};

/// Trait for hosted text-generation providers.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion of `prompt` with `model`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails, times out, or the
    /// provider answers with an error.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError>;
}

/// Creates a provider from `config`.
///
/// Returns `Ok(None)` when no API token is configured.
///
/// # Errors
///
/// Returns [`AiError`] if the HTTP client cannot be built.
pub fn create_generator(
    config: &QueryParserConfig,
) -> Result<Option<Arc<dyn TextGenerator>>, AiError> {
    let Some(token) = config.api_token.clone() else {
        return Ok(None);
    };

    let provider =
        huggingface::HuggingFaceProvider::new(token, config.base_url.clone(), config.timeout)?;
    log::info!(
        "Text generation via {} (timeout {}s)",
        config.base_url,
        config.timeout.as_secs()
    );
    Ok(Some(Arc::new(provider)))
}
