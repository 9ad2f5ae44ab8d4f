//! HTTP server with HTMX pages and a JSON API
//!
//! Routes are organized into modules:
//! - routes::dashboard: Summary cards, charts, quick add
//! - routes::transactions: Filterable list, forms, CSV export
//! - routes::fixed: Recurring expenses
//! - routes::history: Monthly closings and PDF export
//! - routes::annual: Year rollup
//! - routes::insights: Spending advice
//! - routes::settings: Configuration and goal

pub mod components;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use gestor_advisor::Advisor;
use gestor_config::Config;
use gestor_core::Ledger;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::validate_request::ValidateRequestHeaderLayer;

pub use error::{ApiError, PageError};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub config: Config,
    pub advisor: Arc<Advisor>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::annual::{api_annual, page_annual};
    use routes::dashboard::{
        api_dashboard, api_summary, htmx_dashboard_panels, htmx_quick_add, page_dashboard,
    };
    use routes::fixed::{
        api_fixed, api_upcoming, htmx_fixed_create_form, htmx_fixed_delete, htmx_fixed_edit_form,
        htmx_fixed_list, htmx_fixed_store, htmx_fixed_update, page_fixed,
    };
    use routes::history::{
        api_history, export_history_pdf, htmx_close_month, htmx_history_content,
        htmx_report_delete, page_history,
    };
    use routes::insights::{htmx_generate_insights, page_insights};
    use routes::settings::{api_settings, htmx_set_goal, page_settings};
    use routes::transactions::{
        api_transaction_create, api_transaction_delete, api_transaction_detail, api_transactions,
        export_transactions_csv, htmx_category_options, htmx_transaction_create_form,
        htmx_transaction_delete, htmx_transaction_edit_form, htmx_transaction_store,
        htmx_transaction_update, htmx_transactions_list, htmx_transactions_rows,
        page_transactions,
    };

    let auth = state.config.server.auth.clone();

    let router = Router::new()
        // API endpoints
        .route("/api/summary", get(api_summary))
        .route("/api/dashboard", get(api_dashboard))
        .route(
            "/api/transactions",
            get(api_transactions).post(api_transaction_create),
        )
        .route(
            "/api/transactions/:id",
            get(api_transaction_detail).delete(api_transaction_delete),
        )
        .route("/api/fixed", get(api_fixed))
        .route("/api/upcoming", get(api_upcoming))
        .route("/api/history", get(api_history))
        .route("/api/annual", get(api_annual))
        .route("/api/settings", get(api_settings))
        // Pages
        .route("/", get(page_dashboard))
        .route("/transactions", get(page_transactions).post(htmx_transaction_store))
        .route("/fixed", get(page_fixed).post(htmx_fixed_store))
        .route("/history", get(page_history))
        .route("/annual", get(page_annual))
        .route("/insights", get(page_insights))
        .route("/settings", get(page_settings))
        // HTMX partials and form posts
        .route("/dashboard/panels", get(htmx_dashboard_panels))
        .route("/dashboard/quick", post(htmx_quick_add))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/rows", get(htmx_transactions_rows))
        .route("/transactions/new", get(htmx_transaction_create_form))
        .route("/transactions/categories", get(htmx_category_options))
        .route("/transactions/:id/edit", get(htmx_transaction_edit_form))
        .route(
            "/transactions/:id",
            post(htmx_transaction_update).delete(htmx_transaction_delete),
        )
        .route("/fixed/list", get(htmx_fixed_list))
        .route("/fixed/new", get(htmx_fixed_create_form))
        .route("/fixed/:id/edit", get(htmx_fixed_edit_form))
        .route("/fixed/:id", post(htmx_fixed_update).delete(htmx_fixed_delete))
        .route("/history/content", get(htmx_history_content))
        .route("/history/close", post(htmx_close_month))
        .route("/history/:id", axum::routing::delete(htmx_report_delete))
        .route("/insights/generate", post(htmx_generate_insights))
        .route("/settings/goal", post(htmx_set_goal))
        // Downloads
        .route("/export/transactions.csv", get(export_transactions_csv))
        .route("/export/history/:file", get(export_history_pdf));

    let router = match auth {
        Some(auth) => {
            log::info!("Basic authentication enabled for user {}", auth.username);
            router.layer(ValidateRequestHeaderLayer::basic(
                &auth.username,
                &auth.password,
            ))
        }
        None => router,
    };

    // Health stays reachable without credentials
    router
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Family Gestor</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
        .toast {{ animation: fade 5s forwards; }}
        @keyframes fade {{ 0%, 85% {{ opacity: 1; }} 100% {{ opacity: 0; }} }}
    </style>
    <script>
        function clearFieldError(input) {{
            var id = input.dataset.error;
            var el = id ? document.getElementById(id) : null;
            if (el) {{ el.remove(); }}
            input.classList.remove('border-red-500');
        }}
        document.addEventListener('htmx:beforeSwap', function(evt) {{
            if (evt.detail.xhr.status >= 400 && evt.detail.xhr.getResponseHeader('hx-retarget')) {{
                evt.detail.shouldSwap = true;
                evt.detail.isError = false;
            }}
        }});
        function virtualScroll(el) {{
            clearTimeout(el._gestorTimer);
            el._gestorTimer = setTimeout(function() {{
                var form = document.getElementById('tx-filters');
                var params = form ? new URLSearchParams(new FormData(form)) : new URLSearchParams();
                params.set('scroll', Math.round(el.scrollTop));
                params.set('viewport', el.clientHeight);
                htmx.ajax('GET', '/transactions/rows?' + params.toString(), {{ target: '#tx-rows', swap: 'innerHTML' }});
            }}, 40);
        }}
    </script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id="toasts" class="fixed bottom-4 right-4 space-y-2 z-50"></div>
</body>
</html>"#,
        title, content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Dashboard", "dashboard"),
        ("/transactions", "Transações", "transactions"),
        ("/fixed", "Gastos Fixos", "fixed"),
        ("/history", "Histórico", "history"),
        ("/annual", "Resumo Anual", "annual"),
        ("/insights", "Insights AI", "insights"),
        ("/settings", "Configurações", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Family Gestor</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        let icon = match *id {
            "dashboard" => "📊",
            "transactions" => "📋",
            "fixed" => "📌",
            "history" => "🗂️",
            "annual" => "📈",
            "insights" => "✨",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &axum::http::HeaderMap,
    title: &str,
    current_path: &str,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        format!(
            r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#,
            inner_content
        )
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Family Gestor on http://{}", addr);
    log::info!("Pages: / /transactions /fixed /history /annual /insights /settings");
    log::info!("JSON API under /api/*");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
