//! Transaction filtering
//!
//! Criteria arrive as raw query strings. Anything that does not parse is
//! treated as "no constraint" rather than an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::types::TransactionType;
use crate::validation::{parse_amount, parse_date};

/// Type criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl std::str::FromStr for TypeFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(TypeFilter::All),
            other => other.parse().map(TypeFilter::Only),
        }
    }
}

/// Observation presence criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservationFilter {
    #[default]
    All,
    With,
    Without,
}

impl std::str::FromStr for ObservationFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(ObservationFilter::All),
            "with" => Ok(ObservationFilter::With),
            "without" => Ok(ObservationFilter::Without),
            _ => Err(format!("Invalid observation filter: {}", s)),
        }
    }
}

/// Filter criteria as submitted by the transactions page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub search: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub min_amount: String,
    #[serde(default)]
    pub max_amount: String,
}

impl FilterParams {
    /// Non-empty parameters, for rebuilding links that keep the filter
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("search", self.search.as_str()),
            ("type", self.kind.as_str()),
            ("observations", self.observations.as_str()),
            ("start_date", self.start_date.as_str()),
            ("end_date", self.end_date.as_str()),
            ("min_amount", self.min_amount.as_str()),
            ("max_amount", self.max_amount.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect()
    }
}

/// Parsed filter criteria; all active predicates must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Lowercased search text
    pub text: Option<String>,
    pub kind: TypeFilter,
    pub observations: ObservationFilter,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl From<&FilterParams> for TransactionFilter {
    fn from(params: &FilterParams) -> Self {
        let text = params.search.trim().to_lowercase();
        Self {
            text: (!text.is_empty()).then_some(text),
            kind: params.kind.parse().unwrap_or_default(),
            observations: params.observations.parse().unwrap_or_default(),
            start: parse_date(&params.start_date),
            end: parse_date(&params.end_date),
            min_amount: parse_amount(&params.min_amount),
            max_amount: parse_amount(&params.max_amount),
        }
    }
}

impl TransactionFilter {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// Whether a transaction satisfies every active criterion
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(ref text) = self.text {
            let hit = t.description.to_lowercase().contains(text)
                || t.category.as_str().contains(text.as_str())
                || t.category.label().to_lowercase().contains(text)
                || t
                    .observations
                    .as_deref()
                    .map(|o| o.to_lowercase().contains(text))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }

        if let TypeFilter::Only(kind) = self.kind {
            if t.kind != kind {
                return false;
            }
        }

        match self.observations {
            ObservationFilter::All => {}
            ObservationFilter::With if !t.has_observations() => return false,
            ObservationFilter::Without if t.has_observations() => return false,
            _ => {}
        }

        if self.start.map(|s| t.date < s).unwrap_or(false) {
            return false;
        }
        if self.end.map(|e| t.date > e).unwrap_or(false) {
            return false;
        }
        if self.min_amount.map(|m| t.amount < m).unwrap_or(false) {
            return false;
        }
        if self.max_amount.map(|m| t.amount > m).unwrap_or(false) {
            return false;
        }

        true
    }

    /// Matching transactions in input order
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.matches(t)).collect()
    }
}
