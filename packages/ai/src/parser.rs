//! Ordered model attempts with a rule-based fallback.

use std::sync::{Arc, LazyLock};

use city3d_filter_models::FilterSpec;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    AiError, AttemptFailure, QueryParserConfig, fallback, prompt,
    providers::{self, TextGenerator},
};

/// Note used when the rule-based extractor ran because no model is configured.
pub const FALLBACK_NOTE: &str = "fallback";

/// Greedy span from the first `{` to the last `}`.
static JSON_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap_or_else(|_| unreachable!()));

/// Filters produced for a query, plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    /// Extracted filters, possibly empty.
    pub filters: Vec<FilterSpec>,
    /// `"fallback"`, `"model:<name>"`, or `"fallback_error:<kind>"`.
    pub note: String,
}

/// One way of turning a query into filters.
#[async_trait::async_trait]
pub trait FilterStrategy: Send + Sync {
    /// Name reported in the provenance note on success.
    fn name(&self) -> &str;

    /// Attempts to extract filters from `query`.
    ///
    /// # Errors
    ///
    /// Returns the kind of failure so the caller can move on to the next
    /// strategy.
    async fn attempt(&self, query: &str) -> Result<Vec<FilterSpec>, AttemptFailure>;
}

/// Prompts a single hosted model.
pub struct ModelStrategy {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl ModelStrategy {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, model: String) -> Self {
        Self { generator, model }
    }
}

#[async_trait::async_trait]
impl FilterStrategy for ModelStrategy {
    fn name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, query: &str) -> Result<Vec<FilterSpec>, AttemptFailure> {
        let text = self
            .generator
            .generate(&prompt::build_prompt(query), &self.model)
            .await
            .map_err(|e| {
                log::warn!("Model {} failed: {e}", self.model);
                AttemptFailure::from(&e)
            })?;

        parse_model_response(&text).inspect_err(|kind| {
            log::warn!("Model {} reply unusable ({kind}): {text}", self.model);
        })
    }
}

#[derive(Deserialize)]
struct ModelReply {
    filters: Vec<FilterSpec>,
}

/// Extracts the `filters` array from a model reply.
///
/// # Errors
///
/// * [`AttemptFailure::NoJson`] if the reply has no `{...}` block
/// * [`AttemptFailure::ParseError`] if the block is not a `filters` object
pub fn parse_model_response(text: &str) -> Result<Vec<FilterSpec>, AttemptFailure> {
    let block = JSON_BLOCK_RE.find(text).ok_or(AttemptFailure::NoJson)?;
    let reply: ModelReply =
        serde_json::from_str(block.as_str()).map_err(|_| AttemptFailure::ParseError)?;
    Ok(reply
        .filters
        .into_iter()
        .map(FilterSpec::with_numeric_value)
        .collect())
}

/// Translates free-text queries into filters.
pub struct QueryParser {
    strategies: Vec<Box<dyn FilterStrategy>>,
}

impl QueryParser {
    /// Creates a parser from `config`. Without an API token the parser
    /// only uses the rule-based extractor.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the provider cannot be constructed.
    pub fn new(config: &QueryParserConfig) -> Result<Self, AiError> {
        let generator = providers::create_generator(config)?;
        Ok(Self::with_generator(generator, &config.candidate_models()))
    }

    /// Creates a parser that tries `models`, in order, on `generator`.
    #[must_use]
    pub fn with_generator(generator: Option<Arc<dyn TextGenerator>>, models: &[String]) -> Self {
        let strategies = generator
            .map(|generator| {
                models
                    .iter()
                    .map(|model| {
                        Box::new(ModelStrategy::new(Arc::clone(&generator), model.clone()))
                            as Box<dyn FilterStrategy>
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self::with_strategies(strategies)
    }

    /// Creates a parser from an explicit strategy list.
    #[must_use]
    pub const fn with_strategies(strategies: Vec<Box<dyn FilterStrategy>>) -> Self {
        Self { strategies }
    }

    /// Returns `true` if at least one model will be tried.
    #[must_use]
    pub fn has_models(&self) -> bool {
        !self.strategies.is_empty()
    }

    /// Parses `query`. Never fails: the rule-based extractor is the last
    /// resort.
    pub async fn parse(&self, query: &str) -> ParseOutcome {
        if self.strategies.is_empty() {
            return ParseOutcome {
                filters: fallback::extract_filters(query),
                note: FALLBACK_NOTE.to_string(),
            };
        }

        let mut last_failure = AttemptFailure::Provider;
        for strategy in &self.strategies {
            match strategy.attempt(query).await {
                Ok(filters) => {
                    log::debug!("{} produced {} filters", strategy.name(), filters.len());
                    return ParseOutcome {
                        filters,
                        note: format!("model:{}", strategy.name()),
                    };
                }
                Err(kind) => last_failure = kind,
            }
        }

        log::info!("All models failed (last: {last_failure}); using rule-based parser");
        ParseOutcome {
            filters: fallback::extract_filters(query),
            note: format!("fallback_error:{last_failure}"),
        }
    }
}
