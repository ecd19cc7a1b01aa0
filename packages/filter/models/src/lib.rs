#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured filter predicates over enriched buildings.
//!
//! A [`FilterSpec`] is a plain `attribute / operator / value` record. The
//! same shape is accepted from API clients, produced by the free-text query
//! parser, and persisted verbatim as part of a saved project.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Building attribute a filter can target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterAttribute {
    /// Building height in meters.
    HeightM,
    /// Number of levels.
    Levels,
    /// Zoning district label.
    Zoning,
    /// Assessed property value.
    AssessedValue,
    /// Building use class.
    Use,
    /// Street address.
    Address,
}

impl FilterAttribute {
    /// Returns `true` for attributes compared as numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::HeightM | Self::Levels | Self::AssessedValue)
    }
}

/// Comparison operator of a filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FilterOperator {
    /// Strictly greater than.
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    Gt,
    /// Strictly less than.
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    Lt,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    #[strum(serialize = ">=")]
    Gte,
    /// Less than or equal.
    #[serde(rename = "<=")]
    #[strum(serialize = "<=")]
    Lte,
    /// Equality (tolerant for numbers, case-insensitive for text).
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Eq,
    /// Case-insensitive substring match.
    #[serde(rename = "contains")]
    #[strum(serialize = "contains")]
    Contains,
    /// Case-insensitive membership in a list.
    #[serde(rename = "in")]
    #[strum(serialize = "in")]
    In,
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A number. Integers are widened to `f64`.
    Number(f64),
    /// A string.
    Text(String),
    /// A list of scalars, only meaningful for [`FilterOperator::In`].
    List(Vec<Self>),
}

impl FilterValue {
    /// Coerces the value to a float.
    ///
    /// Strings are parsed after trimming; lists never coerce.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::List(_) => None,
        }
    }

    /// Renders a scalar value as text. Lists have no scalar rendering.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::List(_) => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            Self::Number(_) | Self::Text(_) => None,
        }
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A single `attribute operator value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Targeted building attribute.
    pub attribute: FilterAttribute,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Comparison value.
    pub value: FilterValue,
}

impl FilterSpec {
    /// Creates a new filter.
    #[must_use]
    pub fn new(
        attribute: FilterAttribute,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            attribute,
            operator,
            value: value.into(),
        }
    }

    /// Converts numeric-looking text values to numbers for numeric
    /// attributes, leaving everything else untouched.
    #[must_use]
    pub fn with_numeric_value(mut self) -> Self {
        if !self.attribute.is_numeric() || !matches!(self.value, FilterValue::Text(_)) {
            return self;
        }
        if let Some(n) = self.value.as_f64() {
            self.value = FilterValue::Number(n);
        }
        self
    }
}
