//! Fixed expense endpoints - JSON API and form posts

use super::page::render_fixed_form;
use crate::components::{changed_response, outcome_toasts};
use crate::error::PageError;
use crate::routes::transactions::page::FormAction;
use crate::AppState;
use axum::extract::Path;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use gestor_core::recurring::UpcomingExpense;
use gestor_core::validation::{FixedExpenseForm, FormErrors};
use gestor_core::{CoreError, FixedExpense};

/// Get all fixed expenses (JSON API)
pub async fn api_fixed(state: axum::extract::State<AppState>) -> Json<Vec<FixedExpense>> {
    let ledger = state.ledger.read().await;
    Json(ledger.state().fixed_expenses.clone())
}

/// Get the next due fixed expenses (JSON API)
pub async fn api_upcoming(state: axum::extract::State<AppState>) -> Json<Vec<UpcomingExpense>> {
    let ledger = state.ledger.read().await;
    Json(ledger.upcoming(gestor_core::today()))
}

fn blank_fixed_form() -> String {
    render_fixed_form(
        &FixedExpenseForm::default(),
        &FormErrors::new(),
        FormAction::Create,
    )
}

/// HTMX: Store a new fixed expense
pub async fn htmx_fixed_store(
    state: axum::extract::State<AppState>,
    Form(form): Form<FixedExpenseForm>,
) -> Result<Response, PageError> {
    let mut ledger = state.ledger.write().await;
    match ledger.create_fixed_expense(&form, gestor_core::today()).await {
        Ok((expense, outcome)) => {
            let html = format!(
                "{}{}",
                blank_fixed_form(),
                outcome_toasts(
                    &format!("Gasto fixo \"{}\" cadastrado", expense.description),
                    &outcome
                )
            );
            Ok(changed_response(html))
        }
        Err(CoreError::ValidationError { errors }) => {
            Ok(Html(render_fixed_form(&form, &errors, FormAction::Create)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// HTMX: Save an edited fixed expense
pub async fn htmx_fixed_update(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    Form(form): Form<FixedExpenseForm>,
) -> Result<Response, PageError> {
    let id = path.0;
    let mut ledger = state.ledger.write().await;
    match ledger
        .update_fixed_expense(&id, &form, gestor_core::today())
        .await
    {
        Ok((expense, outcome)) => {
            let html = format!(
                "{}{}",
                blank_fixed_form(),
                outcome_toasts(
                    &format!("Gasto fixo \"{}\" atualizado", expense.description),
                    &outcome
                )
            );
            Ok(changed_response(html))
        }
        Err(CoreError::ValidationError { errors }) => {
            Ok(Html(render_fixed_form(&form, &errors, FormAction::Edit(&id))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// HTMX: Delete a fixed expense; transactions it already generated stay
pub async fn htmx_fixed_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Response, PageError> {
    let mut ledger = state.ledger.write().await;
    let outcome = ledger.delete_fixed_expense(&path.0).await?;
    Ok(changed_response(outcome_toasts("Gasto fixo excluído", &outcome)))
}
