//! Deterministic rule-based filter extraction.
//!
//! Used when no model is configured or every model attempt fails. The
//! rules are applied in a fixed order and always produce a (possibly
//! empty) filter list:
//!
//! 1. a "money hint" decides whether a bare number may be a dollar amount
//! 2. one comparison operator is inferred for all numeric filters
//! 3. height (feet, converted to meters, else meters)
//! 4. levels
//! 5. zoning code (always `=`)
//! 6. assessed value (only with a money hint)
//! 7. use keywords

use std::sync::LazyLock;

use city3d_filter_models::{FilterAttribute, FilterOperator, FilterSpec};
use regex::Regex;

const FEET_TO_METERS: f64 = 0.3048;

/// Words that mark a number as a monetary amount.
const MONEY_WORDS: &[&str] = &[
    "dollar",
    "dollars",
    "value",
    "assess",
    "assessed",
    "assessment",
    "valuation",
    "price",
    "worth",
    "cost",
];

static FEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:ft|feet)\b").unwrap_or_else(|_| unreachable!())
});

static METERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:m|meter|meters)\b").unwrap_or_else(|_| unreachable!())
});

static LEVELS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:levels?|storeys?|stories?)\b").unwrap_or_else(|_| unreachable!())
});

/// Short hyphenated district codes such as `RC-G` or `C-COR`.
static ZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{1,3}-[A-Z]{1,3})\b").unwrap_or_else(|_| unreachable!())
});

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\s*([\d,]+(?:\.\d+)?)\b").unwrap_or_else(|_| unreachable!())
});

/// Extracts filters from `query` using keyword and pattern rules.
#[must_use]
pub fn extract_filters(query: &str) -> Vec<FilterSpec> {
    let lower = query.to_lowercase();
    let money_hint = has_money_hint(query, &lower);
    let op = infer_operator(&lower);

    let mut filters = Vec::new();

    if let Some(feet) = first_number(&FEET_RE, &lower) {
        let meters = round_to_cents(feet * FEET_TO_METERS);
        filters.push(FilterSpec::new(FilterAttribute::HeightM, op, meters));
    } else if let Some(meters) = first_number(&METERS_RE, &lower) {
        filters.push(FilterSpec::new(FilterAttribute::HeightM, op, meters));
    }

    if let Some(levels) = first_number(&LEVELS_RE, &lower) {
        filters.push(FilterSpec::new(FilterAttribute::Levels, op, levels));
    }

    if let Some(zone) = ZONE_RE.captures(query).and_then(|c| c.get(1)) {
        filters.push(FilterSpec::new(
            FilterAttribute::Zoning,
            FilterOperator::Eq,
            zone.as_str(),
        ));
    }

    if let Some(amount) = money_hint.then(|| first_amount(&lower)).flatten() {
        filters.push(FilterSpec::new(FilterAttribute::AssessedValue, op, amount));
    }

    for use_class in ["commercial", "residential"] {
        if lower.contains(use_class) {
            filters.push(FilterSpec::new(
                FilterAttribute::Use,
                FilterOperator::Eq,
                use_class,
            ));
        }
    }

    filters
}

fn has_money_hint(query: &str, lower: &str) -> bool {
    query.contains('$') || MONEY_WORDS.iter().any(|w| lower.contains(w))
}

/// Infers the shared numeric operator. Later rules override earlier ones.
fn infer_operator(lower: &str) -> FilterOperator {
    let mut op = FilterOperator::Gt;
    if ["less than", "under", "below", "<"]
        .iter()
        .any(|w| lower.contains(w))
    {
        op = FilterOperator::Lt;
    }
    if lower.contains("at least") || lower.contains(">=") {
        op = FilterOperator::Gte;
    }
    if lower.contains("at most") || lower.contains("<=") {
        op = FilterOperator::Lte;
    }
    if lower.contains(" equal") || lower.contains("exact") || lower.contains(" = ") {
        op = FilterOperator::Eq;
    }
    op
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// First number-like run in `text`, with thousands separators removed.
fn first_amount(text: &str) -> Option<f64> {
    let digits = MONEY_RE.captures(text)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}

/// Rounds the exact binary value to two decimals, ties to even.
fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
