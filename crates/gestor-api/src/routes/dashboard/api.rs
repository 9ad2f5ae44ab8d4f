//! Dashboard API endpoints - JSON summaries and quick add

use super::page::render_quick_form;
use crate::components::{changed_response, outcome_toasts};
use crate::error::PageError;
use crate::routes::transactions::page::blank_form;
use crate::AppState;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use gestor_core::reports::{goal_progress, Dashboard, GoalProgress};
use gestor_core::validation::{FormErrors, TransactionForm};
use gestor_core::BalanceSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: BalanceSummary,
    pub transaction_count: usize,
    pub goal: Option<GoalProgress>,
}

/// Get balance summary and goal progress (JSON API)
pub async fn api_summary(state: axum::extract::State<AppState>) -> Json<SummaryResponse> {
    let ledger = state.ledger.read().await;
    let summary = ledger.summary();
    Json(SummaryResponse {
        summary,
        transaction_count: ledger.state().transactions.len(),
        goal: goal_progress(summary.total_expense, ledger.state().monthly_goal),
    })
}

/// Get every dashboard aggregate (JSON API)
pub async fn api_dashboard(state: axum::extract::State<AppState>) -> Json<Dashboard> {
    let ledger = state.ledger.read().await;
    Json(ledger.dashboard())
}

/// HTMX: Quick add restricted to recent dates
pub async fn htmx_quick_add(
    state: axum::extract::State<AppState>,
    Form(form): Form<TransactionForm>,
) -> Result<Response, PageError> {
    let today = gestor_core::today();
    let days_back = state.config.ledger.quick_add_days;
    let mut ledger = state.ledger.write().await;
    match ledger.create_transaction(&form, today, true).await {
        Ok((transaction, outcome)) => {
            let html = format!(
                "{}{}",
                render_quick_form(&blank_form(today), &FormErrors::new(), today, days_back),
                outcome_toasts(
                    &format!("Transação \"{}\" adicionada", transaction.description),
                    &outcome
                )
            );
            Ok(changed_response(html))
        }
        Err(e) => match e.into_form_errors() {
            Ok(errors) => {
                Ok(Html(render_quick_form(&form, &errors, today, days_back)).into_response())
            }
            Err(e) => Err(e.into()),
        },
    }
}
