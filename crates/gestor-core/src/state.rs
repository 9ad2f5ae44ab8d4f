//! Ledger state and the reducer that changes it
//!
//! `LedgerState` is a plain value. Every change is an `Action`; applying one
//! yields a new state or an error, leaving the original untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{
    BalanceSummary, FixedExpense, GeneratedMonth, MonthKey, MonthlyReport, Transaction,
};
use crate::reports::build_monthly_report;
use crate::types::TransactionType;
use crate::validation::{amount_max, FormErrors};

/// Everything that is persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Active (not yet closed) transactions
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
    /// Archived monthly closings
    #[serde(default)]
    pub history: Vec<MonthlyReport>,
    #[serde(default)]
    pub monthly_goal: Decimal,
    /// Months each fixed expense has already been materialized for
    #[serde(default)]
    pub generated: Vec<GeneratedMonth>,
}

/// A requested change to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddTransaction(Transaction),
    /// Transactions generated by fixed-expense materialization
    AddGenerated(Vec<Transaction>),
    UpdateTransaction(Transaction),
    DeleteTransaction { id: String },
    AddFixedExpense(FixedExpense),
    UpdateFixedExpense(FixedExpense),
    DeleteFixedExpense { id: String },
    CloseMonth {
        month: MonthKey,
        report_id: String,
        archived_at: DateTime<Utc>,
    },
    DeleteReport { id: String },
    SetGoal(Decimal),
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddTransaction(_) => "add_transaction",
            Action::AddGenerated(_) => "add_generated",
            Action::UpdateTransaction(_) => "update_transaction",
            Action::DeleteTransaction { .. } => "delete_transaction",
            Action::AddFixedExpense(_) => "add_fixed_expense",
            Action::UpdateFixedExpense(_) => "update_fixed_expense",
            Action::DeleteFixedExpense { .. } => "delete_fixed_expense",
            Action::CloseMonth { .. } => "close_month",
            Action::DeleteReport { .. } => "delete_report",
            Action::SetGoal(_) => "set_goal",
        }
    }
}

fn check_transaction(t: &Transaction) -> CoreResult<()> {
    let mut errors = FormErrors::new();
    if t.amount <= Decimal::ZERO {
        errors.insert("amount", "O valor deve ser maior que zero");
    }
    if !t.category.allows(t.kind) {
        errors.insert("category", "Categoria inválida para este tipo");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

fn check_fixed_expense(e: &FixedExpense) -> CoreResult<()> {
    let mut errors = FormErrors::new();
    if e.amount <= Decimal::ZERO {
        errors.insert("amount", "O valor deve ser maior que zero");
    } else if e.amount > amount_max() {
        errors.insert("amount", "O valor excede o limite permitido");
    }
    if !e.category.allows(TransactionType::Expense) {
        errors.insert("category", "Gastos fixos aceitam apenas categorias de despesa");
    }
    if !(1..=31).contains(&e.day_of_month) {
        errors.insert("day_of_month", "O dia deve estar entre 1 e 31");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

impl LedgerState {
    /// Transactions may not be dated in a month that already has a closing
    fn check_open_month(&self, t: &Transaction) -> CoreResult<()> {
        let month = t.month_key();
        if self.history.iter().any(|r| r.month_key == month) {
            return Err(CoreError::MonthAlreadyClosed {
                month: month.to_string(),
            });
        }
        Ok(())
    }

    /// Apply an action, producing the next state
    pub fn apply(&self, action: Action) -> CoreResult<LedgerState> {
        let mut next = self.clone();
        match action {
            Action::AddTransaction(t) => {
                check_transaction(&t)?;
                next.check_open_month(&t)?;
                if next.transaction(&t.id).is_some() {
                    return Err(CoreError::DuplicateEntry { entry: t.id });
                }
                next.transactions.push(t);
            }
            Action::AddGenerated(generated) => {
                for t in generated {
                    check_transaction(&t)?;
                    if next.transaction(&t.id).is_some() {
                        return Err(CoreError::DuplicateEntry { entry: t.id });
                    }
                    if let Some(fixed_id) = &t.fixed_expense_id {
                        next.generated.push(GeneratedMonth {
                            fixed_expense_id: fixed_id.clone(),
                            month: t.month_key(),
                        });
                    }
                    next.transactions.push(t);
                }
            }
            Action::UpdateTransaction(t) => {
                check_transaction(&t)?;
                next.check_open_month(&t)?;
                let slot = next
                    .transactions
                    .iter_mut()
                    .find(|x| x.id == t.id)
                    .ok_or_else(|| CoreError::TransactionNotFound { id: t.id.clone() })?;
                *slot = t;
            }
            Action::DeleteTransaction { id } => {
                let before = next.transactions.len();
                next.transactions.retain(|t| t.id != id);
                if next.transactions.len() == before {
                    return Err(CoreError::TransactionNotFound { id });
                }
            }
            Action::AddFixedExpense(e) => {
                check_fixed_expense(&e)?;
                if next.fixed_expense(&e.id).is_some() {
                    return Err(CoreError::DuplicateEntry { entry: e.id });
                }
                next.fixed_expenses.push(e);
            }
            Action::UpdateFixedExpense(e) => {
                check_fixed_expense(&e)?;
                let slot = next
                    .fixed_expenses
                    .iter_mut()
                    .find(|x| x.id == e.id)
                    .ok_or_else(|| CoreError::FixedExpenseNotFound { id: e.id.clone() })?;
                *slot = e;
            }
            Action::DeleteFixedExpense { id } => {
                // Generated transactions stay
                let before = next.fixed_expenses.len();
                next.fixed_expenses.retain(|e| e.id != id);
                if next.fixed_expenses.len() == before {
                    return Err(CoreError::FixedExpenseNotFound { id });
                }
                next.generated.retain(|g| g.fixed_expense_id != id);
            }
            Action::CloseMonth {
                month,
                report_id,
                archived_at,
            } => {
                if next.history.iter().any(|r| r.month_key == month) {
                    return Err(CoreError::MonthAlreadyClosed {
                        month: month.to_string(),
                    });
                }
                let in_month: Vec<&Transaction> = self
                    .transactions
                    .iter()
                    .filter(|t| month.contains(t.date))
                    .collect();
                if in_month.is_empty() {
                    return Err(CoreError::NothingToClose {
                        month: month.to_string(),
                    });
                }
                let report = build_monthly_report(report_id, month, &in_month, archived_at);
                next.transactions.retain(|t| !month.contains(t.date));
                next.history.push(report);
            }
            Action::DeleteReport { id } => {
                let before = next.history.len();
                next.history.retain(|r| r.id != id);
                if next.history.len() == before {
                    return Err(CoreError::ReportNotFound { id });
                }
            }
            Action::SetGoal(goal) => {
                if goal < Decimal::ZERO {
                    let mut errors = FormErrors::new();
                    errors.insert("goal", "Informe uma meta válida (zero ou maior)");
                    return Err(errors.into());
                }
                next.monthly_goal = goal;
            }
        }
        Ok(next)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn fixed_expense(&self, id: &str) -> Option<&FixedExpense> {
        self.fixed_expenses.iter().find(|e| e.id == id)
    }

    pub fn report(&self, id: &str) -> Option<&MonthlyReport> {
        self.history.iter().find(|r| r.id == id)
    }

    /// Totals over the active transactions
    pub fn summary(&self) -> BalanceSummary {
        BalanceSummary::from_transactions(&self.transactions)
    }

    /// Months that have active transactions and no closing yet, newest first
    pub fn closable_months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = self
            .transactions
            .iter()
            .map(|t| t.month_key())
            .filter(|m| !self.history.iter().any(|r| r.month_key == *m))
            .collect();
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::NaiveDate;

    fn tx(
        id: &str,
        kind: TransactionType,
        amount: i64,
        category: Category,
        month: u32,
        day: u32,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: format!("tx {}", id),
            amount: Decimal::from(amount),
            kind,
            category,
            date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            observations: None,
            is_fixed: false,
            fixed_expense_id: None,
        }
    }

    fn add(
        id: &str,
        kind: TransactionType,
        amount: i64,
        category: Category,
        month: u32,
        day: u32,
    ) -> Action {
        Action::AddTransaction(tx(id, kind, amount, category, month, day))
    }

    fn fixed(id: &str) -> FixedExpense {
        FixedExpense {
            id: id.to_string(),
            description: "Aluguel".to_string(),
            amount: Decimal::from(1500),
            category: Category::Housing,
            day_of_month: 5,
        }
    }

    fn close(month: u32) -> Action {
        Action::CloseMonth {
            month: MonthKey::new(2024, month).unwrap(),
            report_id: format!("r-{}", month),
            archived_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_update_delete_transaction() {
        let state = LedgerState::default();
        let state = state
            .apply(add("1", TransactionType::Expense, 50, Category::Food, 5, 1))
            .unwrap();
        assert_eq!(state.transactions.len(), 1);

        let mut edited = state.transactions[0].clone();
        edited.amount = Decimal::from(75);
        let state = state.apply(Action::UpdateTransaction(edited)).unwrap();
        assert_eq!(state.transaction("1").unwrap().amount, Decimal::from(75));

        let state = state.apply(Action::DeleteTransaction { id: "1".into() }).unwrap();
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_failed_action_leaves_state_untouched() {
        let state = LedgerState::default()
            .apply(add("1", TransactionType::Expense, 50, Category::Food, 5, 1))
            .unwrap();
        let snapshot = state.clone();

        let err = state
            .apply(add("1", TransactionType::Expense, 10, Category::Food, 5, 2))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));

        let err = state.apply(Action::DeleteTransaction { id: "nope".into() }).unwrap_err();
        assert!(matches!(err, CoreError::TransactionNotFound { .. }));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_rejects_invalid_records() {
        let state = LedgerState::default();
        let err = state
            .apply(add("1", TransactionType::Income, 50, Category::Food, 5, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = state
            .apply(add("1", TransactionType::Expense, 0, Category::Food, 5, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let mut bad = fixed("f");
        bad.day_of_month = 0;
        assert!(state.apply(Action::AddFixedExpense(bad)).is_err());
    }

    #[test]
    fn test_delete_fixed_keeps_generated_transactions() {
        let mut generated = tx("g", TransactionType::Expense, 1500, Category::Housing, 5, 5);
        generated.is_fixed = true;
        generated.fixed_expense_id = Some("f".into());

        let state = LedgerState::default()
            .apply(Action::AddFixedExpense(fixed("f")))
            .unwrap()
            .apply(Action::AddGenerated(vec![generated]))
            .unwrap()
            .apply(Action::DeleteFixedExpense { id: "f".into() })
            .unwrap();
        assert!(state.fixed_expenses.is_empty());
        assert_eq!(state.transactions.len(), 1);
        assert!(state.generated.is_empty());
    }

    #[test]
    fn test_generated_record_outlives_transaction() {
        let mut generated = tx("g", TransactionType::Expense, 1500, Category::Housing, 5, 5);
        generated.is_fixed = true;
        generated.fixed_expense_id = Some("f".into());

        let state = LedgerState::default()
            .apply(Action::AddFixedExpense(fixed("f")))
            .unwrap()
            .apply(Action::AddGenerated(vec![generated]))
            .unwrap()
            .apply(Action::DeleteTransaction { id: "g".into() })
            .unwrap();
        assert!(state.transactions.is_empty());
        assert_eq!(
            state.generated,
            vec![GeneratedMonth {
                fixed_expense_id: "f".to_string(),
                month: MonthKey::new(2024, 5).unwrap(),
            }]
        );
    }

    #[test]
    fn test_rejects_transactions_in_closed_month() {
        let state = LedgerState::default()
            .apply(add("1", TransactionType::Expense, 50, Category::Food, 5, 1))
            .unwrap()
            .apply(add("2", TransactionType::Expense, 20, Category::Food, 6, 1))
            .unwrap()
            .apply(close(5))
            .unwrap();

        let err = state
            .apply(add("3", TransactionType::Expense, 10, Category::Food, 5, 20))
            .unwrap_err();
        assert!(matches!(err, CoreError::MonthAlreadyClosed { ref month } if month == "2024-05"));

        let mut moved = state.transaction("2").unwrap().clone();
        moved.date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let err = state.apply(Action::UpdateTransaction(moved)).unwrap_err();
        assert!(matches!(err, CoreError::MonthAlreadyClosed { .. }));
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_rejects_fixed_expense_above_limit() {
        let mut huge = fixed("f");
        huge.amount = amount_max() + Decimal::ONE;
        let err = LedgerState::default()
            .apply(Action::AddFixedExpense(huge))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_close_month_archives_and_removes() {
        let state = LedgerState::default()
            .apply(add("1", TransactionType::Income, 1000, Category::Salary, 5, 1))
            .unwrap()
            .apply(add("2", TransactionType::Expense, 300, Category::Food, 5, 2))
            .unwrap()
            .apply(add("3", TransactionType::Expense, 200, Category::Transport, 5, 3))
            .unwrap()
            .apply(add("4", TransactionType::Expense, 40, Category::Food, 6, 1))
            .unwrap();
        assert_eq!(
            state.closable_months(),
            vec![MonthKey::new(2024, 6).unwrap(), MonthKey::new(2024, 5).unwrap()]
        );

        let closed = state.apply(close(5)).unwrap();
        assert_eq!(closed.history.len(), 1);
        let report = &closed.history[0];
        assert_eq!(report.total_income, Decimal::from(1000));
        assert_eq!(report.total_expense, Decimal::from(500));
        assert_eq!(report.balance, Decimal::from(500));
        assert_eq!(report.top_category, Some(Category::Food));
        assert_eq!(closed.transactions.len(), 1);
        assert_eq!(closed.transactions[0].id, "4");
        assert_eq!(closed.closable_months(), vec![MonthKey::new(2024, 6).unwrap()]);

        let err = closed.apply(close(5)).unwrap_err();
        assert!(matches!(err, CoreError::MonthAlreadyClosed { .. }));

        let err = closed.apply(close(7)).unwrap_err();
        assert!(matches!(err, CoreError::NothingToClose { .. }));
    }

    #[test]
    fn test_delete_report() {
        let state = LedgerState::default()
            .apply(add("1", TransactionType::Income, 10, Category::Salary, 5, 1))
            .unwrap()
            .apply(close(5))
            .unwrap();
        let state = state.apply(Action::DeleteReport { id: "r-5".into() }).unwrap();
        assert!(state.history.is_empty());
        assert!(state.apply(Action::DeleteReport { id: "r-5".into() }).is_err());
    }

    #[test]
    fn test_set_goal() {
        let state = LedgerState::default().apply(Action::SetGoal(Decimal::from(2000))).unwrap();
        assert_eq!(state.monthly_goal, Decimal::from(2000));
        assert!(state.apply(Action::SetGoal(Decimal::from(-1))).is_err());
    }

    #[test]
    fn test_state_json_round_trip() {
        let state = LedgerState::default()
            .apply(Action::AddFixedExpense(fixed("f")))
            .unwrap()
            .apply(add("1", TransactionType::Income, 10, Category::Salary, 5, 1))
            .unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: LedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        let empty: LedgerState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, LedgerState::default());
    }
}
