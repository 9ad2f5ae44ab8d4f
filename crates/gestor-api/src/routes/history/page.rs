//! History page rendering - Closings, filters and close-month form

use crate::components::{
    bar_chart, balance_class, category_badge, empty_state, money, query_string, LEDGER_CHANGED,
};
use crate::routes::dashboard::page::upcoming_list;
use crate::AppState;
use axum::extract::Query;
use axum::response::Html;
use gestor_config::CurrencyConfig;
use gestor_core::format::format_date;
use gestor_core::reports::{ChartDataPoint, HistoryQuery, HistoryView};
use gestor_core::{Category, CategoryPalette, MonthKey, MonthlyReport};
use gestor_utils::escape_html;
use serde::Deserialize;

/// History selection as it arrives from the filter form
///
/// Values are kept as text so an empty select does not fail extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub year: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
}

impl HistoryParams {
    pub fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.trim().parse().ok())
    }

    pub fn category(&self) -> Option<Category> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    pub fn query(&self) -> HistoryQuery {
        HistoryQuery {
            year: self.year(),
            category: self.category(),
            page: self
                .page
                .as_deref()
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(1),
        }
    }
}

fn render_filters(view: &HistoryView) -> String {
    let years: String = view
        .years
        .iter()
        .map(|y| {
            format!(
                "<option value='{}' {}>{}</option>",
                y,
                if *y == view.year { "selected" } else { "" },
                y
            )
        })
        .collect();
    let mut categories = format!(
        "<option value='' {}>Todas as categorias</option>",
        if view.category.is_none() { "selected" } else { "" }
    );
    for c in &view.categories {
        categories.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            c.as_str(),
            if view.category == Some(*c) { "selected" } else { "" },
            c.label()
        ));
    }
    format!(
        r#"<form id='history-filters' hx-get='/history/content' hx-target='#history-content' hx-trigger='change' class='flex flex-wrap gap-3 mb-4'>
            <select name='year' class='px-3 py-2 border rounded-lg'>{}</select>
            <select name='category' class='px-3 py-2 border rounded-lg'>{}</select>
        </form>"#,
        years, categories
    )
}

fn render_close_form(closable: &[MonthKey]) -> String {
    if closable.is_empty() {
        return "<p class='text-sm text-gray-500'>Nenhum mês com transações em aberto.</p>"
            .to_string();
    }
    let options: String = closable
        .iter()
        .map(|m| format!("<option value='{}'>{}</option>", m, m.display_name()))
        .collect();
    format!(
        r#"<form hx-post='/history/close' hx-swap='none' hx-confirm='Fechar o mês selecionado? As transações serão arquivadas.' class='flex gap-3'>
            <select name='month' class='flex-1 px-3 py-2 border rounded-lg'>{}</select>
            <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Fechar mês</button>
        </form>"#,
        options
    )
}

fn render_report_row(
    r: &MonthlyReport,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    let top = match r.top_category {
        Some(c) => category_badge(c, palette),
        None => "<span class='text-xs text-gray-400'>Nenhum</span>".to_string(),
    };
    format!(
        r#"<tr class='border-b hover:bg-gray-50'>
            <td class='px-4 py-3 font-medium'>{}</td>
            <td class='px-4 py-3 text-right text-green-600'>{}</td>
            <td class='px-4 py-3 text-right text-red-600'>{}</td>
            <td class='px-4 py-3 text-right font-semibold {}'>{}</td>
            <td class='px-4 py-3'>{}</td>
            <td class='px-4 py-3 text-sm text-gray-500'>{}</td>
            <td class='px-4 py-3 text-right'><button hx-delete='/history/{}' hx-confirm='Excluir o fechamento de {}? As transações arquivadas não voltam.' hx-swap='none' class='text-red-600 hover:underline text-sm'>Excluir</button></td>
        </tr>"#,
        escape_html(&r.month_name),
        money(r.total_income, currency),
        money(r.total_expense, currency),
        balance_class(r.balance),
        money(r.balance, currency),
        top,
        format_date(r.archived_at.with_timezone(&chrono::Local).date_naive()),
        urlencoding::encode(&r.id),
        escape_html(&r.month_name)
    )
}

fn render_pagination(view: &HistoryView) -> String {
    if view.total_pages <= 1 {
        return String::new();
    }
    let year = view.year.to_string();
    let category = view.category.map(|c| c.as_str()).unwrap_or("");
    let link = |page: usize, label: &str, enabled: bool| {
        if enabled {
            let page = page.to_string();
            let qs = query_string(&[
                ("year", year.as_str()),
                ("category", category),
                ("page", page.as_str()),
            ]);
            format!(
                "<button hx-get='/history/content?{}' hx-target='#history-content' class='px-3 py-1 border rounded hover:bg-gray-50'>{}</button>",
                qs, label
            )
        } else {
            format!(
                "<button disabled class='px-3 py-1 border rounded text-gray-300'>{}</button>",
                label
            )
        }
    };
    format!(
        "<div class='flex items-center justify-between mt-4 text-sm'>{}<span>Página {} de {}</span>{}</div>",
        link(view.page.saturating_sub(1), "Anterior", view.page > 1),
        view.page,
        view.total_pages,
        link(view.page + 1, "Próxima", view.page < view.total_pages)
    )
}

fn render_export_button(view: &HistoryView) -> String {
    if view.matching == 0 {
        return "<button disabled class='px-4 py-2 border rounded-lg text-gray-300 cursor-not-allowed'>Exportar PDF</button>".to_string();
    }
    let category = view.category.map(|c| c.as_str()).unwrap_or("");
    let qs = if category.is_empty() {
        String::new()
    } else {
        format!("?{}", query_string(&[("category", category)]))
    };
    format!(
        "<a href='/export/history/{}.pdf{}' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Exportar PDF</a>",
        view.year, qs
    )
}

/// Filters, closings and side panels for the selected year
pub fn render_history_content(
    view: &HistoryView,
    closable: &[MonthKey],
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    let table = if view.reports.is_empty() {
        empty_state("Nenhum fechamento para os filtros selecionados.")
    } else {
        let rows: String = view
            .reports
            .iter()
            .map(|r| render_report_row(r, currency, palette))
            .collect();
        format!(
            r#"<div class='overflow-x-auto'><table class='w-full text-left'>
                <thead><tr class='text-xs uppercase text-gray-500 border-b'>
                    <th class='px-4 py-2'>Mês</th><th class='px-4 py-2 text-right'>Entradas</th><th class='px-4 py-2 text-right'>Saídas</th><th class='px-4 py-2 text-right'>Saldo</th><th class='px-4 py-2'>Principal gasto</th><th class='px-4 py-2'>Fechado em</th><th class='px-4 py-2'></th>
                </tr></thead>
                <tbody>{}</tbody>
            </table></div>{}"#,
            rows,
            render_pagination(view)
        )
    };

    let distribution: Vec<ChartDataPoint> = view
        .fixed
        .distribution
        .iter()
        .map(|c| ChartDataPoint {
            label: c.category.label().to_string(),
            value: c.total,
            color: palette.color(c.category).to_string(),
        })
        .collect();
    let totals = &view.year_totals;

    format!(
        r#"<div class='flex flex-wrap justify-between items-start gap-3'>{}{}</div>
        <div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Entradas em {}</p><p class='text-xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Saídas em {}</p><p class='text-xl font-bold text-red-700'>{}</p></div>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Saldo do ano</p><p class='text-xl font-bold {}'>{}</p></div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='lg:col-span-2 space-y-6'>
                <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Fechar mês</h3>{}</div>
                <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Fechamentos ({})</h3>{}</div>
            </div>
            <div class='space-y-6'>
                <div class='bg-white rounded-xl shadow-sm p-6'><div class='flex justify-between mb-4'><h3 class='text-lg font-semibold'>Gastos fixos</h3><span class='text-sm text-gray-500'>{}</span></div>{}</div>
                <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Próximos vencimentos</h3>{}</div>
            </div>
        </div>"#,
        render_filters(view),
        render_export_button(view),
        view.year,
        money(totals.total_income, currency),
        view.year,
        money(totals.total_expense, currency),
        balance_class(totals.total_balance),
        money(totals.total_balance, currency),
        render_close_form(closable),
        view.matching,
        table,
        money(view.fixed.total, currency),
        bar_chart(&distribution, currency),
        upcoming_list(&view.upcoming, currency)
    )
}

async fn content_for(state: &AppState, params: &HistoryParams) -> String {
    let today = gestor_core::today();
    let ledger = state.ledger.read().await;
    let view = ledger.history(&params.query(), today);
    render_history_content(
        &view,
        &ledger.state().closable_months(),
        &state.config.currency,
        ledger.palette(),
    )
}

pub async fn page_history(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HistoryParams>,
) -> Html<String> {
    let content = content_for(&state, &params).await;
    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Histórico</h2><p class='text-sm text-gray-500'>Meses fechados e arquivados.</p></div>
        <div id='history-content' hx-get='/history/content' hx-include='#history-filters' hx-trigger='{} from:body'>{}</div>"#,
        LEDGER_CHANGED, content
    );
    Html(crate::page_response(&headers, "Histórico", "/history", &inner_content))
}

/// HTMX: History content for the selected filters
pub async fn htmx_history_content(
    state: axum::extract::State<AppState>,
    params: Query<HistoryParams>,
) -> Html<String> {
    Html(content_for(&state, &params).await)
}
