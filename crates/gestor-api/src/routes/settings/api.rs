//! Settings endpoints - Redacted configuration and monthly goal

use super::page::render_goal_form;
use crate::components::{changed_response, outcome_toasts};
use crate::error::PageError;
use crate::AppState;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use gestor_config::{AdvisorConfig, CurrencyConfig, LedgerConfig, ListConfig};
use gestor_core::format::format_plain;
use gestor_core::validation::FormErrors;
use gestor_core::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub auth_enabled: bool,
}

/// Configuration as exposed over the API, without credentials
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub server: ServerSettings,
    pub store: String,
    pub monthly_goal: Decimal,
    pub ledger: LedgerConfig,
    pub list: ListConfig,
    pub currency: CurrencyConfig,
    pub advisor: AdvisorConfig,
}

/// Get the running configuration (JSON API)
pub async fn api_settings(state: axum::extract::State<AppState>) -> Json<SettingsResponse> {
    let ledger = state.ledger.read().await;
    let config = &state.config;
    Json(SettingsResponse {
        server: ServerSettings {
            host: config.server.host.clone(),
            port: config.server.port,
            auth_enabled: config.server.auth.is_some(),
        },
        store: ledger.store_location(),
        monthly_goal: ledger.state().monthly_goal,
        ledger: config.ledger.clone(),
        list: config.list.clone(),
        currency: config.currency.clone(),
        advisor: config.advisor.clone(),
    })
}

/// HTMX: Save the monthly goal
pub async fn htmx_set_goal(
    state: axum::extract::State<AppState>,
    Form(form): Form<GoalForm>,
) -> Result<Response, PageError> {
    let currency = &state.config.currency;
    let mut ledger = state.ledger.write().await;
    match ledger.set_goal(&form.goal).await {
        Ok(outcome) => {
            let goal = ledger.state().monthly_goal;
            let value = if goal > Decimal::ZERO {
                format_plain(goal)
            } else {
                String::new()
            };
            let message = if goal > Decimal::ZERO {
                "Meta mensal atualizada"
            } else {
                "Meta mensal removida"
            };
            let html = format!(
                "{}{}",
                render_goal_form(&value, goal, &FormErrors::new(), currency),
                outcome_toasts(message, &outcome)
            );
            Ok(changed_response(html))
        }
        Err(CoreError::ValidationError { errors }) => {
            let goal = ledger.state().monthly_goal;
            Ok(Html(render_goal_form(&form.goal, goal, &errors, currency)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
