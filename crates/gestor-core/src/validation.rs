//! Form validation for transactions, fixed expenses and the monthly goal
//!
//! Forms arrive as raw strings. Validation either yields a typed draft or a
//! set of field-scoped messages; nothing is mutated on failure.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{FixedExpense, Transaction};
use crate::types::{Category, TransactionType};

pub const DESCRIPTION_MIN: usize = 3;
pub const DESCRIPTION_MAX: usize = 50;
pub const FIXED_DESCRIPTION_MAX: usize = 40;
pub const OBSERVATIONS_MAX: usize = 200;

/// Largest accepted transaction amount: 99 999 999.99
pub fn amount_max() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Validation messages keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; the first message per field wins
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Drop the message for a field once the user edits it
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Parse a user-typed amount
///
/// Accepts `1234.56`, `1234,56` and `1.234,56`. Returns `None` for anything
/// that is not a number.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    Decimal::from_str(&normalized).ok()
}

/// Parse `YYYY-MM-DD`
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

fn check_description(errors: &mut FormErrors, description: &str, max: usize) {
    let len = description.chars().count();
    if len == 0 {
        errors.insert("description", "A descrição é obrigatória");
    } else if len < DESCRIPTION_MIN {
        errors.insert("description", "A descrição deve ter pelo menos 3 caracteres");
    } else if len > max {
        errors.insert(
            "description",
            &format!("A descrição deve ter no máximo {} caracteres", max),
        );
    }
}

/// Raw transaction form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub observations: String,
}

/// A validated transaction without an id
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category: Category,
    pub date: NaiveDate,
    pub observations: Option<String>,
}

impl TransactionDraft {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            date: self.date,
            observations: self.observations,
            is_fixed: false,
            fixed_expense_id: None,
        }
    }
}

impl From<&Transaction> for TransactionForm {
    fn from(t: &Transaction) -> Self {
        Self {
            description: t.description.clone(),
            amount: crate::format::format_plain(t.amount),
            kind: t.kind.as_str().to_string(),
            category: t.category.as_str().to_string(),
            date: t.date.format("%Y-%m-%d").to_string(),
            observations: t.observations.clone().unwrap_or_default(),
        }
    }
}

impl TransactionForm {
    /// Validate against `today`: the date may not lie in the future
    pub fn validate(&self, today: NaiveDate) -> Result<TransactionDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let description = self.description.trim().to_string();
        check_description(&mut errors, &description, DESCRIPTION_MAX);

        let amount = match parse_amount(&self.amount) {
            None => {
                errors.insert("amount", "Informe um valor válido");
                None
            }
            Some(a) if a <= Decimal::ZERO => {
                errors.insert("amount", "O valor deve ser maior que zero");
                None
            }
            Some(a) if a > amount_max() => {
                errors.insert("amount", "O valor excede o limite permitido");
                None
            }
            Some(a) => Some(a.round_dp(2)),
        };

        let kind = match self.kind.parse::<TransactionType>() {
            Ok(k) => Some(k),
            Err(_) => {
                errors.insert("type", "Selecione o tipo");
                None
            }
        };

        let category = if self.category.trim().is_empty() {
            errors.insert("category", "Selecione uma categoria");
            None
        } else {
            match (self.category.parse::<Category>(), kind) {
                (Ok(c), Some(k)) if c.allows(k) => Some(c),
                (Ok(_), None) => None,
                _ => {
                    errors.insert("category", "Categoria inválida para este tipo");
                    None
                }
            }
        };

        let date = if self.date.trim().is_empty() {
            errors.insert("date", "A data é obrigatória");
            None
        } else {
            match parse_date(&self.date) {
                None => {
                    errors.insert("date", "Data inválida");
                    None
                }
                Some(d) if d > today => {
                    errors.insert("date", "A data não pode estar no futuro");
                    None
                }
                Some(d) => Some(d),
            }
        };

        let observations = self.observations.trim();
        if observations.chars().count() > OBSERVATIONS_MAX {
            errors.insert(
                "observations",
                &format!("As observações devem ter no máximo {} caracteres", OBSERVATIONS_MAX),
            );
        }

        match (amount, kind, category, date) {
            (Some(amount), Some(kind), Some(category), Some(date)) if errors.is_empty() => {
                Ok(TransactionDraft {
                    description,
                    amount,
                    kind,
                    category,
                    date,
                    observations: (!observations.is_empty()).then(|| observations.to_string()),
                })
            }
            _ => Err(errors),
        }
    }

    /// Quick-add variant: the date must be within `days_back` days of today
    pub fn validate_quick(
        &self,
        today: NaiveDate,
        days_back: u32,
    ) -> Result<TransactionDraft, FormErrors> {
        let draft = self.validate(today)?;
        let earliest = today - Duration::days(i64::from(days_back));
        if draft.date < earliest {
            let mut errors = FormErrors::new();
            errors.insert("date", "O lançamento rápido aceita apenas hoje ou ontem");
            return Err(errors);
        }
        Ok(draft)
    }
}

/// Raw fixed-expense form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub day_of_month: String,
}

/// A validated fixed expense without an id
#[derive(Debug, Clone, PartialEq)]
pub struct FixedExpenseDraft {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub day_of_month: u32,
}

impl FixedExpenseDraft {
    pub fn into_fixed_expense(self, id: String) -> FixedExpense {
        FixedExpense {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            day_of_month: self.day_of_month,
        }
    }
}

impl From<&FixedExpense> for FixedExpenseForm {
    fn from(e: &FixedExpense) -> Self {
        Self {
            description: e.description.clone(),
            amount: crate::format::format_plain(e.amount),
            category: e.category.as_str().to_string(),
            day_of_month: e.day_of_month.to_string(),
        }
    }
}

impl FixedExpenseForm {
    pub fn validate(&self) -> Result<FixedExpenseDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let description = self.description.trim().to_string();
        check_description(&mut errors, &description, FIXED_DESCRIPTION_MAX);

        let amount = match parse_amount(&self.amount) {
            Some(a) if a > amount_max() => {
                errors.insert("amount", "O valor excede o limite permitido");
                None
            }
            Some(a) if a > Decimal::ZERO => Some(a.round_dp(2)),
            Some(_) => {
                errors.insert("amount", "O valor deve ser maior que zero");
                None
            }
            None => {
                errors.insert("amount", "Informe um valor válido");
                None
            }
        };

        let category = match self.category.parse::<Category>() {
            Ok(c) if c.allows(TransactionType::Expense) => Some(c),
            _ if self.category.trim().is_empty() => {
                errors.insert("category", "Selecione uma categoria");
                None
            }
            _ => {
                errors.insert("category", "Gastos fixos aceitam apenas categorias de despesa");
                None
            }
        };

        let day = match self.day_of_month.trim().parse::<u32>() {
            Ok(d) if (1..=31).contains(&d) => Some(d),
            _ => {
                errors.insert("day_of_month", "O dia deve estar entre 1 e 31");
                None
            }
        };

        match (amount, category, day) {
            (Some(amount), Some(category), Some(day_of_month)) => {
                errors.into_result(|| FixedExpenseDraft {
                    description,
                    amount,
                    category,
                    day_of_month,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Parse the monthly goal: a non-negative number
pub fn parse_goal(input: &str) -> Result<Decimal, FormErrors> {
    let mut errors = FormErrors::new();
    match parse_amount(input) {
        Some(goal) if goal >= Decimal::ZERO => Ok(goal.round_dp(2)),
        _ => {
            errors.insert("goal", "Informe uma meta válida (zero ou maior)");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn valid_form() -> TransactionForm {
        TransactionForm {
            description: "Mercado".to_string(),
            amount: "150,75".to_string(),
            kind: "expense".to_string(),
            category: "food".to_string(),
            date: "2024-05-09".to_string(),
            observations: "  ".to_string(),
        }
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("1234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_valid_transaction() {
        let draft = valid_form().validate(today()).unwrap();
        assert_eq!(draft.amount, Decimal::new(15075, 2));
        assert_eq!(draft.category, Category::Food);
        assert_eq!(draft.observations, None);
    }

    #[test]
    fn test_description_bounds() {
        let mut form = valid_form();
        form.description = "ab".to_string();
        let errors = form.validate(today()).unwrap_err();
        assert!(errors.get("description").is_some());

        form.description = "a".repeat(51);
        assert!(form.validate(today()).unwrap_err().get("description").is_some());

        form.description = "a".repeat(50);
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_amount_bounds() {
        let mut form = valid_form();
        form.amount = "0".to_string();
        assert!(form.validate(today()).unwrap_err().get("amount").is_some());

        form.amount = "100000000".to_string();
        assert!(form.validate(today()).unwrap_err().get("amount").is_some());

        form.amount = "99999999.99".to_string();
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_future_date_rejected() {
        let mut form = valid_form();
        form.date = "2024-05-11".to_string();
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("date").is_some());

        form.date = "2024-05-10".to_string();
        assert!(form.validate(today()).is_ok());
    }

    #[test]
    fn test_category_must_match_type() {
        let mut form = valid_form();
        form.category = "salary".to_string();
        assert!(form.validate(today()).unwrap_err().get("category").is_some());

        form.category = String::new();
        assert!(form.validate(today()).unwrap_err().get("category").is_some());
    }

    #[test]
    fn test_observations_limit() {
        let mut form = valid_form();
        form.observations = "x".repeat(201);
        assert!(form.validate(today()).unwrap_err().get("observations").is_some());
    }

    #[test]
    fn test_errors_collected_per_field() {
        let form = TransactionForm::default();
        let errors = form.validate(today()).unwrap_err();
        for field in ["description", "amount", "type", "category", "date"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn test_clear_field_error() {
        let mut errors = TransactionForm::default().validate(today()).unwrap_err();
        let before = errors.len();
        errors.clear("amount");
        assert_eq!(errors.len(), before - 1);
        assert!(errors.get("amount").is_none());
    }

    #[test]
    fn test_quick_add_only_today_or_yesterday() {
        let mut form = valid_form();
        assert!(form.validate_quick(today(), 1).is_ok());

        form.date = "2024-05-08".to_string();
        let errors = form.validate_quick(today(), 1).unwrap_err();
        assert!(errors.get("date").is_some());
    }

    #[test]
    fn test_fixed_expense_form() {
        let form = FixedExpenseForm {
            description: "Aluguel".to_string(),
            amount: "1500".to_string(),
            category: "housing".to_string(),
            day_of_month: "5".to_string(),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.day_of_month, 5);

        let bad = FixedExpenseForm {
            description: "Al".to_string(),
            amount: "-1".to_string(),
            category: "salary".to_string(),
            day_of_month: "32".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_fixed_description_limit_is_40() {
        let form = FixedExpenseForm {
            description: "a".repeat(41),
            amount: "10".to_string(),
            category: "bills".to_string(),
            day_of_month: "1".to_string(),
        };
        assert!(form.validate().unwrap_err().get("description").is_some());
    }

    #[test]
    fn test_fixed_amount_limit() {
        let mut form = FixedExpenseForm {
            description: "Aluguel".to_string(),
            amount: "50000000000000000000000000000".to_string(),
            category: "housing".to_string(),
            day_of_month: "5".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("amount"), Some("O valor excede o limite permitido"));

        form.amount = "99999999,99".to_string();
        assert_eq!(form.validate().unwrap().amount, amount_max());
    }

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("2500").unwrap(), Decimal::from(2500));
        assert_eq!(parse_goal("0").unwrap(), Decimal::ZERO);
        assert!(parse_goal("-5").is_err());
        assert!(parse_goal("muito").is_err());
    }

    #[test]
    fn test_form_round_trip_from_transaction() {
        let draft = valid_form().validate(today()).unwrap();
        let t = draft.clone().into_transaction("id-1".to_string());
        let form = TransactionForm::from(&t);
        assert_eq!(form.validate(today()).unwrap(), draft);
    }
}
