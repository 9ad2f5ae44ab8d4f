//! Core data models for the ledger

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::format::month_name;
use super::types::{Category, TransactionType};

/// A single dated income or expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    pub description: String,
    /// Always positive, the sign comes from `kind`
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Created by fixed-expense materialization
    #[serde(default)]
    pub is_fixed: bool,
    /// Fixed expense that generated this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_expense_id: Option<String>,
}

impl Transaction {
    /// Amount with sign applied: positive for income, negative for expense
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Observations present and not blank
    pub fn has_observations(&self) -> bool {
        self.observations
            .as_deref()
            .map(|o| !o.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// Recurring monthly expense template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    /// Expense categories only
    pub category: Category,
    /// Day of month, 1..=31
    pub day_of_month: u32,
}

/// Year and month, written as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The given day in this month, if the month has it
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Human name, e.g. "Maio de 2024"
    pub fn display_name(&self) -> String {
        format!("{} de {}", month_name(self.month), self.year)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let year: i32 = year.parse().map_err(|_| format!("Invalid year in month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key: {}", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Record that a fixed expense already produced its transaction for a month
///
/// Kept even when the generated transaction is later deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMonth {
    pub fixed_expense_id: String,
    pub month: MonthKey,
}

/// Archived closing of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub id: String,
    pub month_key: MonthKey,
    pub month_name: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    /// Expense category with the largest total, absent when nothing was spent
    #[serde(default)]
    pub top_category: Option<Category>,
    pub archived_at: DateTime<Utc>,
}

/// Sum that clamps at the `Decimal` bounds instead of overflowing
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Totals over a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_balance: Decimal,
}

impl BalanceSummary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Self::default();
        for t in transactions {
            match t.kind {
                TransactionType::Income => {
                    summary.total_income = summary.total_income.saturating_add(t.amount)
                }
                TransactionType::Expense => {
                    summary.total_expense = summary.total_expense.saturating_add(t.amount)
                }
            }
        }
        summary.total_balance = summary.total_income.saturating_sub(summary.total_expense);
        summary
    }
}
