//! Insights endpoint - Advice generation

use super::page::render_advice;
use crate::AppState;
use axum::response::Html;

/// HTMX: Ask the advisor about the open transactions
///
/// The ledger lock is released before the provider call so other
/// requests are not held up by a slow response.
pub async fn htmx_generate_insights(state: axum::extract::State<AppState>) -> Html<String> {
    let transactions = {
        let ledger = state.ledger.read().await;
        ledger.state().transactions.clone()
    };
    let advice = state.advisor.advise(&transactions).await;
    Html(render_advice(&advice))
}
