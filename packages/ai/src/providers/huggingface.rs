//! Hugging Face serverless inference provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::AiError;

/// Maximum number of tokens generated per reply.
const MAX_NEW_TOKENS: u32 = 200;

/// Hugging Face inference API provider.
pub struct HuggingFaceProvider {
    api_token: String,
    base_url: String,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    /// Creates a new provider with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the HTTP client cannot be built.
    pub fn new(api_token: String, base_url: String, timeout: Duration) -> Result<Self, AiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_token,
            base_url,
            client,
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url.trim_end_matches('/'))
    }
}

/// Inference request body.
#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
#[allow(clippy::struct_field_names)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f64,
    top_p: f64,
    repetition_penalty: f64,
    return_full_text: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: MAX_NEW_TOKENS,
            temperature: 0.1,
            top_p: 0.9,
            repetition_penalty: 1.05,
            return_full_text: false,
        }
    }
}

/// Inference response body. Models answer either with a list of
/// generations, a single generation, or an error object.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
    Error { error: String },
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

impl GenerationResponse {
    fn into_text(self) -> Result<String, AiError> {
        match self {
            Self::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| AiError::Provider {
                    message: "empty generation list".to_string(),
                }),
            Self::Single(generation) => Ok(generation.generated_text),
            Self::Error { error } => Err(AiError::Provider { message: error }),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for HuggingFaceProvider {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AiError> {
        let request = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters::default(),
        };

        let resp = self
            .client
            .post(self.model_url(model))
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GenerationResponse>(&body) {
                Ok(GenerationResponse::Error { error }) => error,
                _ => format!("HTTP {status}: {body}"),
            };
            return Err(AiError::Provider { message });
        }

        serde_json::from_str::<GenerationResponse>(&body)?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<String, AiError> {
        serde_json::from_str::<GenerationResponse>(body)?.into_text()
    }

    #[test]
    fn reads_batch_and_single_generations() {
        assert_eq!(
            parse(r#"[{"generated_text":"{\"filters\":[]}"}]"#).unwrap(),
            r#"{"filters":[]}"#
        );
        assert_eq!(parse(r#"{"generated_text":"hello"}"#).unwrap(), "hello");
    }

    #[test]
    fn error_object_becomes_provider_error() {
        let err = parse(r#"{"error":"Model is currently loading"}"#).unwrap_err();
        assert!(matches!(err, AiError::Provider { message } if message.contains("loading")));
    }

    #[test]
    fn empty_batch_is_an_error() {
        assert!(matches!(parse("[]"), Err(AiError::Provider { .. })));
    }

    #[test]
    fn request_carries_generation_parameters() {
        let request = GenerationRequest {
            inputs: "prompt",
            parameters: GenerationParameters::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "prompt");
        assert_eq!(json["parameters"]["max_new_tokens"], 200);
        assert_eq!(json["parameters"]["return_full_text"], false);
    }

    #[test]
    fn model_url_joins_cleanly() {
        let provider = HuggingFaceProvider::new(
            "token".to_string(),
            "https://example.test/".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            provider.model_url("org/model"),
            "https://example.test/models/org/model"
        );
    }
}
