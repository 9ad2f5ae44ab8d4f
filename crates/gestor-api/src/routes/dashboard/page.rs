//! Dashboard page rendering

use crate::components::{
    balance_class, bar_chart, category_badge, category_options, empty_state, error_hook,
    field_error, input_class, kind_class, money, LEDGER_CHANGED,
};
use crate::routes::transactions::page::blank_form;
use crate::AppState;
use axum::response::Html;
use chrono::{Duration, NaiveDate};
use gestor_config::CurrencyConfig;
use gestor_core::format::format_date;
use gestor_core::recurring::UpcomingExpense;
use gestor_core::reports::{Dashboard, GoalProgress};
use gestor_core::validation::{FormErrors, TransactionForm};
use gestor_core::{CategoryPalette, TransactionType};
use gestor_utils::escape_html;

fn summary_cards(dashboard: &Dashboard, currency: &CurrencyConfig) -> String {
    let s = &dashboard.summary;
    format!(
        r#"<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Receitas</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Despesas</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Saldo</p><p class='text-2xl font-bold {}'>{}</p></div>
        </div>"#,
        money(s.total_income, currency),
        money(s.total_expense, currency),
        balance_class(s.total_balance),
        money(s.total_balance, currency)
    )
}

fn goal_panel(goal: Option<&GoalProgress>, currency: &CurrencyConfig) -> String {
    let Some(goal) = goal else {
        return r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'><h3 class='text-lg font-semibold mb-2'>Meta de gastos</h3><p class='text-sm text-gray-500'>Nenhuma meta definida. <a href='/settings' class='text-indigo-600 hover:underline'>Definir meta</a></p></div>"#.to_string();
    };
    let (bar, note) = if goal.over {
        (
            "bg-red-500",
            "<p class='text-sm text-red-600 mt-2 font-medium'>Você ultrapassou a meta de gastos!</p>",
        )
    } else {
        ("bg-indigo-500", "")
    };
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <div class='flex justify-between mb-2'><h3 class='text-lg font-semibold'>Meta de gastos</h3><span class='text-sm text-gray-500'>{} de {}</span></div>
            <div class='h-3 bg-gray-100 rounded'><div class='h-3 rounded {}' style='width:{}%'></div></div>
            <p class='text-xs text-gray-500 mt-1'>{}% utilizado</p>
            {}
        </div>"#,
        money(goal.spent, currency),
        money(goal.goal, currency),
        bar,
        goal.percent.round_dp(1),
        goal.percent.round_dp(0),
        note
    )
}

fn recent_list(
    dashboard: &Dashboard,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    if dashboard.recent.is_empty() {
        return empty_state("Nenhuma transação registrada ainda.");
    }
    let rows: Vec<String> = dashboard
        .recent
        .iter()
        .map(|t| {
            format!(
                r#"<div class='flex justify-between items-center py-2 border-b'><div><p class='font-medium'>{}</p><p class='text-xs text-gray-500 flex gap-2'>{} {}</p></div><span class='font-semibold {}'>{}</span></div>"#,
                escape_html(&t.description),
                format_date(t.date),
                category_badge(t.category, palette),
                kind_class(t.kind),
                money(t.signed_amount(), currency)
            )
        })
        .collect();
    format!(
        "{}<a href='/transactions' class='block text-sm text-indigo-600 hover:underline mt-3'>Ver todas</a>",
        rows.join("")
    )
}

pub fn upcoming_list(upcoming: &[UpcomingExpense], currency: &CurrencyConfig) -> String {
    if upcoming.is_empty() {
        return empty_state("Nenhum gasto fixo cadastrado.");
    }
    upcoming
        .iter()
        .map(|u| {
            let color = match u.urgency.as_str() {
                "critical" => "bg-red-100 text-red-700",
                "warning" => "bg-yellow-100 text-yellow-700",
                _ => "bg-gray-100 text-gray-600",
            };
            format!(
                r#"<div class='flex justify-between items-center py-2 border-b'><div><p class='font-medium'>{}</p><p class='text-xs text-gray-500'>{}</p></div><div class='text-right'><p class='font-semibold'>{}</p><span class='text-xs px-2 py-0.5 rounded-full {}'>{}</span></div></div>"#,
                escape_html(&u.expense.description),
                format_date(u.due_date),
                money(u.expense.amount, currency),
                color,
                u.label()
            )
        })
        .collect()
}

/// Everything below the quick-add form; refreshed after each change
pub fn render_panels(
    dashboard: &Dashboard,
    upcoming: &[UpcomingExpense],
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    format!(
        r#"{}{}
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6 mb-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Despesas por categoria</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Fluxo de caixa</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><div class='flex justify-between mb-4'><h3 class='text-lg font-semibold'>Gastos fixos</h3><span class='text-sm text-gray-500'>{}</span></div>{}</div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Últimas transações</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Próximos vencimentos</h3>{}</div>
        </div>"#,
        summary_cards(dashboard, currency),
        goal_panel(dashboard.goal.as_ref(), currency),
        bar_chart(&dashboard.expense_by_category, currency),
        bar_chart(&dashboard.cash_flow, currency),
        money(dashboard.fixed_total, currency),
        bar_chart(&dashboard.fixed_bars, currency),
        recent_list(dashboard, currency, palette),
        upcoming_list(upcoming, currency)
    )
}

/// Compact form; the date is picked among today and the allowed days back
pub fn render_quick_form(
    form: &TransactionForm,
    errors: &FormErrors,
    today: NaiveDate,
    days_back: u32,
) -> String {
    let id = "quick";
    let kind: Option<TransactionType> = form.kind.parse().ok();
    let dates: String = (0..=i64::from(days_back))
        .map(|n| {
            let date = today - Duration::days(n);
            let value = date.format("%Y-%m-%d").to_string();
            let label = match n {
                0 => "Hoje".to_string(),
                1 => "Ontem".to_string(),
                _ => format_date(date),
            };
            format!(
                "<option value='{}' {}>{}</option>",
                value,
                if value == form.date { "selected" } else { "" },
                label
            )
        })
        .collect();
    let kinds: String = [TransactionType::Expense, TransactionType::Income]
        .iter()
        .map(|k| {
            format!(
                "<option value='{}' {}>{}</option>",
                k.as_str(),
                if kind == Some(*k) { "selected" } else { "" },
                k.label()
            )
        })
        .collect();

    format!(
        r#"<form hx-post='/dashboard/quick' hx-target='#quick-panel' hx-swap='innerHTML' class='grid grid-cols-2 md:grid-cols-6 gap-3 items-start'>
            <div class='col-span-2'><input type='text' name='description' value='{}' placeholder='Descrição' maxlength='50' class='{}' {}>{}</div>
            <div><input type='text' inputmode='decimal' name='amount' value='{}' placeholder='Valor' class='{}' {}>{}</div>
            <div><select name='type' class='{}' hx-get='/transactions/categories' hx-target='#{}-category' hx-include='closest form' hx-trigger='change'>{}</select></div>
            <div><select id='{}-category' name='category' class='{}' {}>{}</select>{}</div>
            <div class='flex gap-2'><select name='date' class='{}' {}>{}</select><button type='submit' class='px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>+</button></div>
            <div class='col-span-2 md:col-span-6'>{}</div>
        </form>"#,
        escape_html(&form.description),
        input_class(errors, "description"),
        error_hook(id, "description"),
        field_error(id, errors, "description"),
        escape_html(&form.amount),
        input_class(errors, "amount"),
        error_hook(id, "amount"),
        field_error(id, errors, "amount"),
        input_class(errors, "type"),
        id,
        kinds,
        id,
        input_class(errors, "category"),
        error_hook(id, "category"),
        category_options(kind, &form.category),
        field_error(id, errors, "category"),
        input_class(errors, "date"),
        error_hook(id, "date"),
        dates,
        field_error(id, errors, "date"),
    )
}

pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let today = gestor_core::today();
    let ledger = state.ledger.read().await;
    let panels = render_panels(
        &ledger.dashboard(),
        &ledger.upcoming(today),
        &state.config.currency,
        ledger.palette(),
    );

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-4 mb-6'>
            <h3 class='text-sm font-semibold text-gray-600 mb-3'>Lançamento rápido</h3>
            <div id='quick-panel'>{}</div>
        </div>
        <div id='dashboard-panels' hx-get='/dashboard/panels' hx-trigger='{} from:body'>{}</div>"#,
        render_quick_form(
            &blank_form(today),
            &FormErrors::new(),
            today,
            state.config.ledger.quick_add_days
        ),
        LEDGER_CHANGED,
        panels
    );

    Html(crate::page_response(&headers, "Dashboard", "/", &inner_content))
}

/// HTMX: Cards, charts and lists
pub async fn htmx_dashboard_panels(state: axum::extract::State<AppState>) -> Html<String> {
    let today = gestor_core::today();
    let ledger = state.ledger.read().await;
    Html(render_panels(
        &ledger.dashboard(),
        &ledger.upcoming(today),
        &state.config.currency,
        ledger.palette(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_goal_panel() {
        let currency = CurrencyConfig::default();
        assert!(goal_panel(None, &currency).contains("Definir meta"));

        let over = GoalProgress {
            goal: Decimal::from(100),
            spent: Decimal::from(150),
            percent: Decimal::from(100),
            over: true,
        };
        let html = goal_panel(Some(&over), &currency);
        assert!(html.contains("ultrapassou"));
        assert!(html.contains("R$ 150,00 de R$ 100,00"));
    }

    #[test]
    fn test_quick_form_offers_allowed_days() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let html = render_quick_form(&blank_form(today), &FormErrors::new(), today, 1);
        assert!(html.contains("<option value='2024-05-10' selected>Hoje</option>"));
        assert!(html.contains("<option value='2024-05-09' >Ontem</option>"));
        assert!(!html.contains("2024-05-08"));
    }
}
