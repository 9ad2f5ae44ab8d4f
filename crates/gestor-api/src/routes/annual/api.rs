//! Annual summary JSON API

use super::page::AnnualParams;
use crate::AppState;
use axum::extract::Query;
use axum::Json;
use gestor_core::reports::AnnualSummary;

/// Get the rollup for a year, defaulting to the newest with closings
pub async fn api_annual(
    state: axum::extract::State<AppState>,
    params: Query<AnnualParams>,
) -> Json<AnnualSummary> {
    let ledger = state.ledger.read().await;
    let years = ledger.available_years(gestor_core::today());
    Json(ledger.annual(params.resolve(&years)))
}
