//! Annual summary page rendering

use crate::components::{balance_class, category_badge, money, percent_of};
use crate::AppState;
use axum::extract::Query;
use axum::response::Html;
use gestor_config::CurrencyConfig;
use gestor_core::reports::{AnnualSummary, MonthHighlight};
use gestor_core::CategoryPalette;
use gestor_utils::escape_html;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnualParams {
    pub year: Option<String>,
}

impl AnnualParams {
    /// The requested year when it has closings, else the newest available
    pub fn resolve(&self, years: &[i32]) -> i32 {
        let requested = self.year.as_deref().and_then(|y| y.trim().parse().ok());
        requested
            .filter(|y| years.contains(y))
            .or_else(|| years.first().copied())
            .unwrap_or_else(|| chrono::Datelike::year(&gestor_core::today()))
    }
}

fn highlight_card(
    title: &str,
    highlight: Option<&MonthHighlight>,
    currency: &CurrencyConfig,
) -> String {
    let body = match highlight {
        Some(h) => format!(
            "<p class='text-lg font-bold'>{}</p><p class='text-sm {}'>{}</p>",
            escape_html(&h.month_name),
            balance_class(h.balance),
            money(h.balance, currency)
        ),
        None => "<p class='text-sm text-gray-400'>Sem dados</p>".to_string(),
    };
    format!(
        "<div class='bg-white rounded-xl shadow-sm p-4'><p class='text-sm text-gray-500 mb-1'>{}</p>{}</div>",
        title, body
    )
}

fn signed(amount: Decimal, currency: &CurrencyConfig) -> String {
    format!(
        "<span class='{}'>{}</span>",
        balance_class(amount),
        money(amount, currency)
    )
}

fn month_table(summary: &AnnualSummary, currency: &CurrencyConfig) -> String {
    let max = summary
        .months
        .iter()
        .map(|m| m.income.max(m.expense))
        .max()
        .unwrap_or(Decimal::ZERO);
    let rows: String = summary
        .months
        .iter()
        .map(|m| {
            let (income, expense, balance, cumulative) = if m.closed {
                (
                    money(m.income, currency),
                    money(m.expense, currency),
                    signed(m.balance, currency),
                    signed(m.cumulative, currency),
                )
            } else {
                let dash = "<span class='text-gray-300'>-</span>".to_string();
                (dash.clone(), dash.clone(), dash, money(m.cumulative, currency))
            };
            format!(
                r#"<tr class='border-b'>
                    <td class='px-4 py-2 font-medium'>{}</td>
                    <td class='px-4 py-2 w-1/3'><div class='h-2 bg-green-100 rounded mb-1'><div class='h-2 bg-green-500 rounded' style='width:{:.1}%'></div></div><div class='h-2 bg-red-100 rounded'><div class='h-2 bg-red-500 rounded' style='width:{:.1}%'></div></div></td>
                    <td class='px-4 py-2 text-right text-green-600'>{}</td>
                    <td class='px-4 py-2 text-right text-red-600'>{}</td>
                    <td class='px-4 py-2 text-right font-semibold'>{}</td>
                    <td class='px-4 py-2 text-right text-sm'>{}</td>
                </tr>"#,
                escape_html(&m.label),
                percent_of(m.income, max),
                percent_of(m.expense, max),
                income,
                expense,
                balance,
                cumulative
            )
        })
        .collect();
    format!(
        r#"<div class='overflow-x-auto'><table class='w-full text-left'>
            <thead><tr class='text-xs uppercase text-gray-500 border-b'>
                <th class='px-4 py-2'>Mês</th><th class='px-4 py-2'></th><th class='px-4 py-2 text-right'>Entradas</th><th class='px-4 py-2 text-right'>Saídas</th><th class='px-4 py-2 text-right'>Saldo</th><th class='px-4 py-2 text-right'>Acumulado</th>
            </tr></thead>
            <tbody>{}</tbody>
        </table></div>"#,
        rows
    )
}

fn health_panel(summary: &AnnualSummary) -> String {
    let bar = if summary.balance >= Decimal::ZERO {
        "bg-emerald-400"
    } else {
        "bg-red-400"
    };
    let width = percent_of(summary.savings_rate.abs(), Decimal::ONE_HUNDRED);
    format!(
        r#"<div class='bg-gray-900 rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-bold text-white mb-2'>Tendência de Saúde</h3>
            <p class='text-sm text-gray-400 mb-4'>Com base nos seus {} meses registrados, você teve um aproveitamento de <strong>{}%</strong> da sua renda este ano.</p>
            <div class='flex items-center gap-4'>
                <div class='flex-1 h-3 bg-white/5 rounded-full overflow-hidden'><div class='h-full rounded-full {}' style='width:{:.1}%'></div></div>
                <span class='text-white font-bold text-sm'>{}%</span>
            </div>
        </div>"#,
        summary.closed_months,
        format!("{:.1}", summary.savings_rate).replace('.', ","),
        bar,
        width,
        format!("{:.0}", summary.savings_rate)
    )
}

/// Cards, highlights and the twelve-month table
pub fn render_annual(
    summary: &AnnualSummary,
    years: &[i32],
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    let options: String = years
        .iter()
        .map(|y| {
            format!(
                "<option value='{}' {}>{}</option>",
                y,
                if *y == summary.year { "selected" } else { "" },
                y
            )
        })
        .collect();
    let top = match summary.top_category {
        Some(c) => category_badge(c, palette),
        None => "<p class='text-sm text-gray-500'>Variadas</p>".to_string(),
    };
    let notice = if summary.closed_months == 0 {
        "<div class='bg-yellow-50 border border-yellow-200 text-yellow-800 rounded-lg p-3 mb-6 text-sm'>Nenhum mês fechado neste ano. Feche meses no Histórico para ver o resumo.</div>"
    } else {
        ""
    };

    format!(
        r#"<div class='flex justify-between items-center mb-6'>
            <div><h2 class='text-2xl font-bold'>Resumo Anual</h2><p class='text-sm text-gray-500'>{} mês(es) fechado(s)</p></div>
            <select name='year' hx-get='/annual' hx-target='closest main' hx-swap='outerHTML' hx-push-url='true' class='px-3 py-2 border rounded-lg'>{}</select>
        </div>
        {}
        <div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Entradas</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Saídas</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Saldo</p><p class='text-2xl font-bold {}'>{}</p></div>
        </div>
        <div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
            {}{}
            <div class='bg-white rounded-xl shadow-sm p-4'><p class='text-sm text-gray-500 mb-1'>Categoria mais frequente</p>{}</div>
        </div>
        {}
        <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>"#,
        summary.closed_months,
        options,
        notice,
        money(summary.total_income, currency),
        money(summary.total_expense, currency),
        balance_class(summary.balance),
        money(summary.balance, currency),
        highlight_card("Melhor mês", summary.best_month.as_ref(), currency),
        highlight_card("Pior mês", summary.worst_month.as_ref(), currency),
        top,
        health_panel(summary),
        month_table(summary, currency)
    )
}

pub async fn page_annual(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<AnnualParams>,
) -> Html<String> {
    let ledger = state.ledger.read().await;
    let years = ledger.available_years(gestor_core::today());
    let summary = ledger.annual(params.resolve(&years));
    let inner_content = render_annual(&summary, &years, &state.config.currency, ledger.palette());
    Html(crate::page_response(&headers, "Resumo Anual", "/annual", &inner_content))
}
