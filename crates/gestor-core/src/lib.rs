//! Core ledger processing and business logic

pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod recurring;
pub mod reports;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;
pub mod virtual_list;

use chrono::{NaiveDate, Utc};
use gestor_config::Config;
use gestor_utils::generate_id;
use std::sync::Arc;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use models::{
    BalanceSummary, FixedExpense, GeneratedMonth, MonthKey, MonthlyReport, Transaction,
};
pub use state::{Action, LedgerState};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use types::{Category, CategoryPalette, TransactionType};

use error::DefaultErrorLogger;
use filter::{FilterParams, TransactionFilter};
use recurring::UpcomingExpense;
use reports::{AnnualSummary, Dashboard, HistoryQuery, HistoryView};
use validation::{FixedExpenseForm, TransactionForm};

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Side effects of a successful change worth telling the user about
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Spending just crossed the monthly goal
    pub goal_alert: bool,
    /// Fixed-expense transactions generated as part of the change
    pub generated: usize,
}

/// Main ledger structure
///
/// Owns the current state and the store it is persisted to. A change is
/// saved first and only then becomes the current state.
pub struct Ledger {
    config: Config,
    palette: CategoryPalette,
    store: Arc<dyn LedgerStore>,
    state: LedgerState,
    logger: Box<dyn ErrorLogger>,
}

impl Ledger {
    /// Create an empty ledger; call `load` to read saved state
    pub fn new(config: Config, palette: CategoryPalette, store: Arc<dyn LedgerStore>) -> Self {
        let state = LedgerState {
            monthly_goal: config.ledger.monthly_goal,
            ..LedgerState::default()
        };
        Self {
            config,
            palette,
            store,
            state,
            logger: Box::new(DefaultErrorLogger),
        }
    }

    /// Replace the error logger
    pub fn with_logger(mut self, logger: Box<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Read saved state and bring fixed expenses up to date
    pub async fn load(&mut self, today: NaiveDate) -> CoreResult<DispatchOutcome> {
        match self.store.load().await {
            Ok(Some(state)) => {
                log::info!(
                    "Ledger loaded from {}: {} transactions, {} fixed expenses, {} closings",
                    self.store.describe(),
                    state.transactions.len(),
                    state.fixed_expenses.len(),
                    state.history.len()
                );
                self.state = state;
            }
            Ok(None) => {
                log::info!(
                    "No ledger at {}, starting empty",
                    self.store.describe()
                );
            }
            Err(e) => {
                self.logger.log_error(
                    &e,
                    &ErrorContext::new("load".to_string())
                        .with_data("store", serde_json::json!(self.store.describe())),
                );
                return Err(e);
            }
        }
        self.materialize(today).await
    }

    /// Generate transactions owed by fixed expenses this month
    pub async fn materialize(&mut self, today: NaiveDate) -> CoreResult<DispatchOutcome> {
        if !self.config.ledger.materialize_fixed {
            return Ok(DispatchOutcome::default());
        }
        let generated = recurring::materialize(
            &self.state.fixed_expenses,
            &self.state.generated,
            &self.state.transactions,
            &self.state.history,
            today,
            generate_id,
        );
        if generated.is_empty() {
            return Ok(DispatchOutcome::default());
        }
        let count = generated.len();
        let mut outcome = self.dispatch(Action::AddGenerated(generated)).await?;
        log::info!("Materialized {} fixed-expense transactions", count);
        outcome.generated = count;
        Ok(outcome)
    }

    /// Apply an action, persist the result, then make it current
    pub async fn dispatch(&mut self, action: Action) -> CoreResult<DispatchOutcome> {
        let name = action.name();
        let next = match self.state.apply(action) {
            Ok(next) => next,
            Err(e) => {
                self.logger
                    .log_error(&e, &ErrorContext::new(name.to_string()));
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&next).await {
            self.logger.log_error(
                &e,
                &ErrorContext::new(name.to_string())
                    .with_data("store", serde_json::json!(self.store.describe())),
            );
            return Err(e);
        }

        let before = self.state.summary().total_expense;
        let after = next.summary().total_expense;
        let goal_alert = reports::goal_crossed(before, after, next.monthly_goal);
        self.state = next;
        log::info!("Applied {}", name);

        Ok(DispatchOutcome {
            goal_alert,
            generated: 0,
        })
    }

    // ==================== Mutations ====================

    /// Validate a form and add it as a new transaction
    ///
    /// `quick` restricts the date to the quick-add window.
    pub async fn create_transaction(
        &mut self,
        form: &TransactionForm,
        today: NaiveDate,
        quick: bool,
    ) -> CoreResult<(Transaction, DispatchOutcome)> {
        let draft = if quick {
            form.validate_quick(today, self.config.ledger.quick_add_days)?
        } else {
            form.validate(today)?
        };
        let transaction = draft.into_transaction(generate_id());
        let outcome = self
            .dispatch(Action::AddTransaction(transaction.clone()))
            .await?;
        Ok((transaction, outcome))
    }

    /// Replace a transaction with the validated form contents
    pub async fn update_transaction(
        &mut self,
        id: &str,
        form: &TransactionForm,
        today: NaiveDate,
    ) -> CoreResult<(Transaction, DispatchOutcome)> {
        let existing = self
            .state
            .transaction(id)
            .cloned()
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })?;
        let draft = form.validate(today)?;
        let mut transaction = draft.into_transaction(existing.id);
        transaction.is_fixed = existing.is_fixed;
        transaction.fixed_expense_id = existing.fixed_expense_id;
        let outcome = self
            .dispatch(Action::UpdateTransaction(transaction.clone()))
            .await?;
        Ok((transaction, outcome))
    }

    pub async fn delete_transaction(&mut self, id: &str) -> CoreResult<DispatchOutcome> {
        self.dispatch(Action::DeleteTransaction { id: id.to_string() })
            .await
    }

    /// Add a fixed expense and generate its transaction if already due
    pub async fn create_fixed_expense(
        &mut self,
        form: &FixedExpenseForm,
        today: NaiveDate,
    ) -> CoreResult<(FixedExpense, DispatchOutcome)> {
        let expense = form.validate()?.into_fixed_expense(generate_id());
        let mut outcome = self
            .dispatch(Action::AddFixedExpense(expense.clone()))
            .await?;
        outcome = merge(outcome, self.materialize(today).await?);
        Ok((expense, outcome))
    }

    pub async fn update_fixed_expense(
        &mut self,
        id: &str,
        form: &FixedExpenseForm,
        today: NaiveDate,
    ) -> CoreResult<(FixedExpense, DispatchOutcome)> {
        if self.state.fixed_expense(id).is_none() {
            return Err(CoreError::FixedExpenseNotFound { id: id.to_string() });
        }
        let expense = form.validate()?.into_fixed_expense(id.to_string());
        let mut outcome = self
            .dispatch(Action::UpdateFixedExpense(expense.clone()))
            .await?;
        outcome = merge(outcome, self.materialize(today).await?);
        Ok((expense, outcome))
    }

    pub async fn delete_fixed_expense(&mut self, id: &str) -> CoreResult<DispatchOutcome> {
        self.dispatch(Action::DeleteFixedExpense { id: id.to_string() })
            .await
    }

    /// Archive a month's transactions into a closing
    pub async fn close_month(&mut self, month: MonthKey) -> CoreResult<MonthlyReport> {
        let report_id = generate_id();
        self.dispatch(Action::CloseMonth {
            month,
            report_id: report_id.clone(),
            archived_at: Utc::now(),
        })
        .await?;
        self.state
            .report(&report_id)
            .cloned()
            .ok_or_else(|| CoreError::InternalError {
                message: format!("closing {} missing after dispatch", report_id),
            })
    }

    pub async fn delete_report(&mut self, id: &str) -> CoreResult<DispatchOutcome> {
        self.dispatch(Action::DeleteReport { id: id.to_string() })
            .await
    }

    pub async fn set_goal(&mut self, input: &str) -> CoreResult<DispatchOutcome> {
        let goal = validation::parse_goal(input)?;
        self.dispatch(Action::SetGoal(goal)).await
    }

    // ==================== Views ====================

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    pub fn store_location(&self) -> String {
        self.store.describe()
    }

    pub fn summary(&self) -> BalanceSummary {
        self.state.summary()
    }

    /// Active transactions matching the filter, newest first
    pub fn filtered_transactions(&self, params: &FilterParams) -> Vec<Transaction> {
        let filter = TransactionFilter::from(params);
        reports::newest_first(&self.state.transactions)
            .into_iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn dashboard(&self) -> Dashboard {
        reports::dashboard(
            &self.state.transactions,
            &self.state.fixed_expenses,
            self.state.monthly_goal,
            self.config.list.recent_count,
            &self.palette,
        )
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<UpcomingExpense> {
        recurring::upcoming(
            &self.state.fixed_expenses,
            today,
            self.config.list.upcoming_preview,
        )
    }

    pub fn history(&self, query: &HistoryQuery, today: NaiveDate) -> HistoryView {
        reports::history_view(
            &self.state.history,
            &self.state.fixed_expenses,
            query,
            today,
            self.config.list.history_page_size,
            self.config.list.upcoming_preview,
        )
    }

    pub fn annual(&self, year: i32) -> AnnualSummary {
        reports::annual_summary(&self.state.history, year)
    }

    pub fn available_years(&self, today: NaiveDate) -> Vec<i32> {
        reports::available_years(&self.state.history, today)
    }
}

fn merge(a: DispatchOutcome, b: DispatchOutcome) -> DispatchOutcome {
    DispatchOutcome {
        goal_alert: a.goal_alert || b.goal_alert,
        generated: a.generated + b.generated,
    }
}
