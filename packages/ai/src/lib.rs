#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text building query parsing.
//!
//! Turns queries such as "highlight buildings over 100 feet" into
//! [`FilterSpec`](city3d_filter_models::FilterSpec) lists. Configured
//! text-generation models are tried one after another with a fixed
//! few-shot prompt; the first reply containing a `filters` JSON object
//! wins. When no model is configured, or every model fails, a
//! deterministic rule-based extractor produces the filters instead.

pub mod config;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod providers;

use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use config::QueryParserConfig;
pub use parser::{ParseOutcome, QueryParser};

/// Errors that can occur while talking to a text-generation provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },
}

/// Why a single model attempt produced no filters.
///
/// Rendered into the provenance note as `fallback_error:<kind>` when every
/// model fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AttemptFailure {
    /// The provider did not answer within the configured timeout.
    Timeout,
    /// The request could not be sent or the response not read.
    Transport,
    /// The provider answered with an error.
    Provider,
    /// The reply contained no `{...}` block.
    NoJson,
    /// The `{...}` block was not a valid `filters` object.
    ParseError,
}

impl From<&AiError> for AttemptFailure {
    fn from(error: &AiError) -> Self {
        match error {
            AiError::Http(e) if e.is_timeout() => Self::Timeout,
            AiError::Http(_) => Self::Transport,
            AiError::Json(_) => Self::ParseError,
            AiError::Provider { .. } => Self::Provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_render_snake_case() {
        assert_eq!(AttemptFailure::NoJson.to_string(), "no_json");
        assert_eq!(AttemptFailure::ParseError.as_ref(), "parse_error");
        assert_eq!(AttemptFailure::Timeout.to_string(), "timeout");
    }

    #[test]
    fn provider_errors_map_to_provider_failure() {
        let error = AiError::Provider {
            message: "model is loading".to_string(),
        };
        assert_eq!(AttemptFailure::from(&error), AttemptFailure::Provider);
    }
}
