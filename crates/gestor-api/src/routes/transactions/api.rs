//! Transactions API endpoints - JSON API, form posts and CSV download
//!
//! Endpoints:
//! - api_transactions: Filtered transactions (JSON)
//! - api_transaction_detail: Single transaction (JSON)
//! - api_transaction_create / api_transaction_delete: JSON mutations
//! - htmx_transaction_store / htmx_transaction_update: Form posts
//! - htmx_transaction_delete: Delete from a list row
//! - export_transactions_csv: Download the filtered list

use super::page::{blank_form, render_transaction_form, FormAction};
use crate::components::{changed_response, outcome_toasts};
use crate::error::{ApiError, PageError};
use crate::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use gestor_core::filter::FilterParams;
use gestor_core::validation::{FormErrors, TransactionForm};
use gestor_core::{CoreError, Transaction};
use gestor_export::{csv_filename, transactions_csv};

/// Get transactions matching the filter, newest first (JSON API)
pub async fn api_transactions(
    state: axum::extract::State<AppState>,
    params: Query<FilterParams>,
) -> Json<Vec<Transaction>> {
    let ledger = state.ledger.read().await;
    Json(ledger.filtered_transactions(&params))
}

/// Get single transaction detail (JSON API)
pub async fn api_transaction_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let ledger = state.ledger.read().await;
    let id = path.0;
    ledger
        .state()
        .transaction(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::Core(CoreError::TransactionNotFound { id }))
}

/// Create a transaction from a JSON form (JSON API)
pub async fn api_transaction_create(
    state: axum::extract::State<AppState>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let mut ledger = state.ledger.write().await;
    let (transaction, _) = ledger
        .create_transaction(&form, gestor_core::today(), false)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn api_transaction_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut ledger = state.ledger.write().await;
    ledger.delete_transaction(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// HTMX: Store a new transaction
///
/// Validation failures re-render the form with field errors; success
/// returns a blank form and refreshes the list.
pub async fn htmx_transaction_store(
    state: axum::extract::State<AppState>,
    Form(form): Form<TransactionForm>,
) -> Result<Response, PageError> {
    let today = gestor_core::today();
    let mut ledger = state.ledger.write().await;
    match ledger.create_transaction(&form, today, false).await {
        Ok((transaction, outcome)) => {
            let html = format!(
                "{}{}",
                render_transaction_form(
                    &blank_form(today),
                    &FormErrors::new(),
                    FormAction::Create,
                    today,
                ),
                outcome_toasts(
                    &format!("Transação \"{}\" adicionada", transaction.description),
                    &outcome
                )
            );
            Ok(changed_response(html))
        }
        Err(e) => match e.into_form_errors() {
            Ok(errors) => Ok(Html(render_transaction_form(
                &form,
                &errors,
                FormAction::Create,
                today,
            ))
            .into_response()),
            Err(e) => Err(e.into()),
        },
    }
}

/// HTMX: Save an edited transaction
pub async fn htmx_transaction_update(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    Form(form): Form<TransactionForm>,
) -> Result<Response, PageError> {
    let today = gestor_core::today();
    let id = path.0;
    let mut ledger = state.ledger.write().await;
    match ledger.update_transaction(&id, &form, today).await {
        Ok((transaction, outcome)) => {
            let html = format!(
                "{}{}",
                render_transaction_form(
                    &blank_form(today),
                    &FormErrors::new(),
                    FormAction::Create,
                    today,
                ),
                outcome_toasts(
                    &format!("Transação \"{}\" atualizada", transaction.description),
                    &outcome
                )
            );
            Ok(changed_response(html))
        }
        Err(e) => match e.into_form_errors() {
            Ok(errors) => Ok(Html(render_transaction_form(
                &form,
                &errors,
                FormAction::Edit(&id),
                today,
            ))
            .into_response()),
            Err(e) => Err(e.into()),
        },
    }
}

/// HTMX: Delete a transaction; the list refreshes on the trigger
pub async fn htmx_transaction_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Response, PageError> {
    let mut ledger = state.ledger.write().await;
    let outcome = ledger.delete_transaction(&path.0).await?;
    Ok(changed_response(outcome_toasts("Transação excluída", &outcome)))
}

/// Download the filtered transactions as CSV
///
/// The document is rendered in memory before the response starts.
pub async fn export_transactions_csv(
    state: axum::extract::State<AppState>,
    params: Query<FilterParams>,
) -> Result<Response, PageError> {
    let transactions = {
        let ledger = state.ledger.read().await;
        ledger.filtered_transactions(&params)
    };
    let bytes = transactions_csv(&transactions)?;
    log::info!("Exported {} transactions to CSV", transactions.len());

    let disposition = format!(
        "attachment; filename=\"{}\"",
        csv_filename(gestor_core::today())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
