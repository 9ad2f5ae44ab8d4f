//! History endpoints - JSON API, closing actions and PDF download

use super::page::HistoryParams;
use crate::components::{changed_response, toast};
use crate::error::{ApiError, PageError};
use crate::AppState;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use gestor_core::reports::{filter_reports, HistoryView};
use gestor_core::MonthKey;
use gestor_export::{annual_report_pdf, pdf_filename};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CloseMonthForm {
    #[serde(default)]
    pub month: String,
}

/// Get the history view for a year and category (JSON API)
pub async fn api_history(
    state: axum::extract::State<AppState>,
    params: Query<HistoryParams>,
) -> Json<HistoryView> {
    let ledger = state.ledger.read().await;
    Json(ledger.history(&params.query(), gestor_core::today()))
}

/// HTMX: Close a month, archiving its transactions
pub async fn htmx_close_month(
    state: axum::extract::State<AppState>,
    Form(form): Form<CloseMonthForm>,
) -> Result<Response, PageError> {
    let month: MonthKey = form
        .month
        .parse()
        .map_err(|_| ApiError::bad_request("Selecione um mês válido para fechar"))?;
    let mut ledger = state.ledger.write().await;
    let report = ledger.close_month(month).await?;
    Ok(changed_response(toast(
        &format!("{} fechado e arquivado", report.month_name),
        true,
    )))
}

/// HTMX: Delete a closing
pub async fn htmx_report_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Response, PageError> {
    let mut ledger = state.ledger.write().await;
    ledger.delete_report(&path.0).await?;
    Ok(changed_response(toast("Fechamento excluído", true)))
}

/// Download a year's closings as PDF
///
/// The path segment is `{year}.pdf`; an optional `category` query keeps
/// the same selection as the history page.
pub async fn export_history_pdf(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    params: Query<HistoryParams>,
) -> Result<Response, PageError> {
    let year: i32 = path
        .0
        .strip_suffix(".pdf")
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| ApiError::not_found(format!("report {}", path.0)))?;

    let bytes = {
        let ledger = state.ledger.read().await;
        let reports = filter_reports(&ledger.state().history, year, params.category());
        annual_report_pdf(
            year,
            &reports,
            &state.config.currency,
            chrono::Local::now().naive_local(),
        )?
    };
    log::info!("Exported {} closings to PDF", year);

    let disposition = format!("attachment; filename=\"{}\"", pdf_filename(year));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
