//! Transactions page rendering
//!
//! Endpoints:
//! - page_transactions: Filter bar, virtualized list, form panel
//! - htmx_transactions_list: List block for the current filter
//! - htmx_transactions_rows: Visible window of rows while scrolling
//! - htmx_transaction_create_form / htmx_transaction_edit_form: Form panel
//! - htmx_category_options: Category choices for the selected type

use crate::components::{
    category_badge, category_options, empty_state, error_hook, field_error, input_class, money,
    query_string, LEDGER_CHANGED,
};
use crate::error::{ApiError, PageError};
use crate::AppState;
use axum::extract::{Path, Query};
use axum::response::Html;
use chrono::NaiveDate;
use gestor_config::CurrencyConfig;
use gestor_core::filter::{FilterParams, TransactionFilter};
use gestor_core::format::format_date;
use gestor_core::validation::{FormErrors, TransactionForm};
use gestor_core::virtual_list::{compute_window, ListWindow, WindowParams};
use gestor_core::{BalanceSummary, CategoryPalette, Transaction, TransactionType};
use gestor_utils::escape_html;
use serde::Deserialize;
use std::collections::HashMap;

/// Scroll position reported by the list container
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub scroll: Option<u64>,
    pub viewport: Option<u32>,
}

/// Where a transaction form posts to
#[derive(Debug, Clone, Copy)]
pub enum FormAction<'a> {
    Create,
    Edit(&'a str),
}

/// Empty form for a new expense dated today
pub fn blank_form(today: NaiveDate) -> TransactionForm {
    TransactionForm {
        kind: TransactionType::Expense.as_str().to_string(),
        date: today.format("%Y-%m-%d").to_string(),
        ..TransactionForm::default()
    }
}

pub fn render_transaction_form(
    form: &TransactionForm,
    errors: &FormErrors,
    action: FormAction<'_>,
    today: NaiveDate,
) -> String {
    let id = "tx";
    let (title, url, submit) = match action {
        FormAction::Create => ("Nova transação", "/transactions".to_string(), "Adicionar"),
        FormAction::Edit(tx_id) => (
            "Editar transação",
            format!("/transactions/{}", urlencoding::encode(tx_id)),
            "Salvar",
        ),
    };
    let kind: Option<TransactionType> = form.kind.parse().ok();
    let kind_option = |k: TransactionType| {
        format!(
            "<option value='{}' {}>{}</option>",
            k.as_str(),
            if kind == Some(k) { "selected" } else { "" },
            k.label()
        )
    };
    let cancel = match action {
        FormAction::Create => String::new(),
        FormAction::Edit(_) => "<button type='button' hx-get='/transactions/new' hx-target='#tx-form-panel' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancelar</button>".to_string(),
    };

    format!(
        r#"<h3 class='text-lg font-semibold mb-4'>{title}</h3>
        <form id='{id}-form' hx-post='{url}' hx-target='#tx-form-panel' hx-swap='innerHTML' class='space-y-4'>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Descrição</label>
                <input type='text' name='description' value='{description}' maxlength='50' class='{description_class}' {description_hook}>
                {description_error}
            </div>
            <div class='grid grid-cols-2 gap-4'>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Valor</label>
                    <input type='text' inputmode='decimal' name='amount' value='{amount}' placeholder='0,00' class='{amount_class}' {amount_hook}>
                    {amount_error}
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Data</label>
                    <input type='date' name='date' value='{date}' max='{today}' class='{date_class}' {date_hook}>
                    {date_error}
                </div>
            </div>
            <div class='grid grid-cols-2 gap-4'>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Tipo</label>
                    <select name='type' class='{kind_class}' hx-get='/transactions/categories' hx-target='#{id}-category' hx-include='closest form' hx-trigger='change' {kind_hook}>
                        {income_option}{expense_option}
                    </select>
                    {kind_error}
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Categoria</label>
                    <select id='{id}-category' name='category' class='{category_class}' {category_hook}>{categories}</select>
                    {category_error}
                </div>
            </div>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Observações</label>
                <textarea name='observations' maxlength='200' rows='2' class='{observations_class}' {observations_hook}>{observations}</textarea>
                {observations_error}
            </div>
            <div class='flex items-center gap-3'>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{submit}</button>
                {cancel}
            </div>
        </form>"#,
        title = title,
        id = id,
        url = url,
        description = escape_html(&form.description),
        description_class = input_class(errors, "description"),
        description_hook = error_hook(id, "description"),
        description_error = field_error(id, errors, "description"),
        amount = escape_html(&form.amount),
        amount_class = input_class(errors, "amount"),
        amount_hook = error_hook(id, "amount"),
        amount_error = field_error(id, errors, "amount"),
        date = escape_html(&form.date),
        today = today.format("%Y-%m-%d"),
        date_class = input_class(errors, "date"),
        date_hook = error_hook(id, "date"),
        date_error = field_error(id, errors, "date"),
        kind_class = input_class(errors, "type"),
        kind_hook = error_hook(id, "type"),
        income_option = kind_option(TransactionType::Income),
        expense_option = kind_option(TransactionType::Expense),
        kind_error = field_error(id, errors, "type"),
        category_class = input_class(errors, "category"),
        category_hook = error_hook(id, "category"),
        categories = category_options(kind, &form.category),
        category_error = field_error(id, errors, "category"),
        observations = escape_html(&form.observations),
        observations_class = input_class(errors, "observations"),
        observations_hook = error_hook(id, "observations"),
        observations_error = field_error(id, errors, "observations"),
        submit = submit,
        cancel = cancel,
    )
}

/// One list row of fixed height
pub fn render_row(
    t: &Transaction,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
    row_height: u32,
) -> String {
    let fixed = if t.is_fixed {
        "<span class='ml-1 text-xs px-1.5 py-0.5 rounded bg-indigo-50 text-indigo-600'>Fixo</span>"
    } else {
        ""
    };
    let notes = match t.observations.as_deref() {
        Some(obs) if t.has_observations() => format!(
            "<span class='ml-1 cursor-help' title='{}'>📝</span>",
            escape_html(obs)
        ),
        _ => String::new(),
    };
    let id = urlencoding::encode(&t.id);
    format!(
        r#"<div class='flex items-center justify-between px-4 border-b bg-white' style='height:{}px'>
            <div class='min-w-0'>
                <p class='font-medium truncate'>{}{}{}</p>
                <p class='text-xs text-gray-500 flex items-center gap-2'>{} {}</p>
            </div>
            <div class='flex items-center gap-3 flex-shrink-0'>
                <span class='font-semibold {}'>{}</span>
                <button hx-get='/transactions/{}/edit' hx-target='#tx-form-panel' class='text-gray-400 hover:text-indigo-600' title='Editar'>✏️</button>
                <button hx-delete='/transactions/{}' hx-confirm='Excluir esta transação?' hx-swap='none' class='text-gray-400 hover:text-red-600' title='Excluir'>🗑️</button>
            </div>
        </div>"#,
        row_height,
        escape_html(&t.description),
        fixed,
        notes,
        format_date(t.date),
        category_badge(t.category, palette),
        crate::components::kind_class(t.kind),
        money(t.signed_amount(), currency),
        id,
        id
    )
}

/// Spacers plus the rows inside the window
pub fn render_rows(
    transactions: &[Transaction],
    window: &ListWindow,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
    row_height: u32,
) -> String {
    let mut html = String::new();
    if window.padding_top > 0 {
        html.push_str(&format!("<div style='height:{}px'></div>", window.padding_top));
    }
    for t in &transactions[window.start..window.end] {
        html.push_str(&render_row(t, currency, palette, row_height));
    }
    if window.padding_bottom > 0 {
        html.push_str(&format!("<div style='height:{}px'></div>", window.padding_bottom));
    }
    html
}

/// Count, totals, export link and the scroll container
pub fn render_list(
    transactions: &[Transaction],
    params: &FilterParams,
    window_params: &WindowParams,
    window: &ListWindow,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    let filtered = TransactionFilter::from(params).is_active();
    let export_href = format!("/export/transactions.csv?{}", query_string(&params.pairs()));
    let summary = BalanceSummary::from_transactions(transactions);

    let header = format!(
        r#"<div class='flex items-center justify-between mb-2'>
            <p class='text-sm text-gray-500'>{} transação(ões){} · <span class='text-green-600'>{}</span> · <span class='text-red-600'>{}</span></p>
            <a href='{}' class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>Exportar CSV</a>
        </div>"#,
        transactions.len(),
        if filtered { " filtrada(s)" } else { "" },
        money(summary.total_income, currency),
        money(summary.total_expense, currency),
        export_href
    );

    if transactions.is_empty() {
        let message = if filtered {
            "Nenhuma transação encontrada para os filtros atuais."
        } else {
            "Nenhuma transação registrada ainda."
        };
        return format!("{}{}", header, empty_state(message));
    }

    let (style, scroll) = if window.virtualized {
        (
            format!("height:{}px", window_params.viewport_height),
            " onscroll='virtualScroll(this)'",
        )
    } else {
        (format!("max-height:{}px", window_params.viewport_height), "")
    };

    format!(
        r#"{}<div id='tx-scroll' class='overflow-y-auto border rounded-lg' style='{}'{}><div id='tx-rows'>{}</div></div>"#,
        header,
        style,
        scroll,
        render_rows(
            transactions,
            window,
            currency,
            palette,
            window_params.row_height
        )
    )
}

fn render_filters(params: &FilterParams) -> String {
    let selected = |value: &str, current: &str| if value == current { "selected" } else { "" };
    let selected_all = |current: &str| {
        if current.is_empty() || current == "all" {
            "selected"
        } else {
            ""
        }
    };
    format!(
        r#"<form id='tx-filters' hx-get='/transactions/list' hx-target='#tx-list' hx-trigger='input delay:300ms, change' class='bg-white rounded-xl shadow-sm p-4 mb-4 grid grid-cols-2 md:grid-cols-4 gap-3'>
            <input type='search' name='search' value='{}' placeholder='Buscar descrição...' class='col-span-2 px-3 py-2 border rounded-lg'>
            <select name='type' class='px-3 py-2 border rounded-lg'>
                <option value='all' {}>Todos os tipos</option>
                <option value='income' {}>Receitas</option>
                <option value='expense' {}>Despesas</option>
            </select>
            <select name='observations' class='px-3 py-2 border rounded-lg'>
                <option value='all' {}>Com ou sem observações</option>
                <option value='with' {}>Com observações</option>
                <option value='without' {}>Sem observações</option>
            </select>
            <input type='date' name='start_date' value='{}' class='px-3 py-2 border rounded-lg' title='De'>
            <input type='date' name='end_date' value='{}' class='px-3 py-2 border rounded-lg' title='Até'>
            <input type='text' inputmode='decimal' name='min_amount' value='{}' placeholder='Valor mínimo' class='px-3 py-2 border rounded-lg'>
            <input type='text' inputmode='decimal' name='max_amount' value='{}' placeholder='Valor máximo' class='px-3 py-2 border rounded-lg'>
            <a href='/transactions' class='col-span-2 md:col-span-4 text-sm text-indigo-600 hover:underline'>Limpar filtros</a>
        </form>"#,
        escape_html(&params.search),
        selected_all(&params.kind),
        selected("income", &params.kind),
        selected("expense", &params.kind),
        selected_all(&params.observations),
        selected("with", &params.observations),
        selected("without", &params.observations),
        escape_html(&params.start_date),
        escape_html(&params.end_date),
        escape_html(&params.min_amount),
        escape_html(&params.max_amount),
    )
}

/// Filtered list and window for the request
async fn list_for(
    state: &AppState,
    params: &FilterParams,
    window: &WindowQuery,
) -> (Vec<Transaction>, WindowParams, ListWindow, CategoryPalette) {
    let ledger = state.ledger.read().await;
    let transactions = ledger.filtered_transactions(params);
    let window_params = WindowParams::from_config(&state.config.list, window.viewport);
    let list_window = compute_window(
        transactions.len(),
        window.scroll.unwrap_or(0),
        &window_params,
    );
    (transactions, window_params, list_window, ledger.palette().clone())
}

pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<FilterParams>,
) -> Html<String> {
    let today = gestor_core::today();
    let (transactions, window_params, window, palette) =
        list_for(&state, &params, &WindowQuery::default()).await;
    let list = render_list(
        &transactions,
        &params,
        &window_params,
        &window,
        &state.config.currency,
        &palette,
    );

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transações</h2>
            <button hx-get='/transactions/new' hx-target='#tx-form-panel' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Nova transação</button>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='lg:col-span-2'>
                {}
                <div id='tx-list' hx-get='/transactions/list' hx-trigger='{} from:body' hx-include='#tx-filters'>{}</div>
            </div>
            <div id='tx-form-panel' class='bg-white rounded-xl shadow-sm p-6 self-start'>{}</div>
        </div>"#,
        render_filters(&params),
        LEDGER_CHANGED,
        list,
        render_transaction_form(&blank_form(today), &FormErrors::new(), FormAction::Create, today)
    );

    Html(crate::page_response(&headers, "Transações", "/transactions", &inner_content))
}

/// HTMX: List block for the submitted filter
pub async fn htmx_transactions_list(
    state: axum::extract::State<AppState>,
    params: Query<FilterParams>,
    window: Query<WindowQuery>,
) -> Html<String> {
    let (transactions, window_params, list_window, palette) =
        list_for(&state, &params, &window).await;
    Html(render_list(
        &transactions,
        &params,
        &window_params,
        &list_window,
        &state.config.currency,
        &palette,
    ))
}

/// HTMX: Rows for the current scroll position
pub async fn htmx_transactions_rows(
    state: axum::extract::State<AppState>,
    params: Query<FilterParams>,
    window: Query<WindowQuery>,
) -> Html<String> {
    let (transactions, window_params, list_window, palette) =
        list_for(&state, &params, &window).await;
    Html(render_rows(
        &transactions,
        &list_window,
        &state.config.currency,
        &palette,
        window_params.row_height,
    ))
}

pub async fn htmx_transaction_create_form() -> Html<String> {
    let today = gestor_core::today();
    Html(render_transaction_form(
        &blank_form(today),
        &FormErrors::new(),
        FormAction::Create,
        today,
    ))
}

pub async fn htmx_transaction_edit_form(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Html<String>, PageError> {
    let ledger = state.ledger.read().await;
    let id = path.0;
    let transaction = ledger
        .state()
        .transaction(&id)
        .ok_or_else(|| ApiError::not_found(format!("transaction {}", id)))?;
    Ok(Html(render_transaction_form(
        &TransactionForm::from(transaction),
        &FormErrors::new(),
        FormAction::Edit(&transaction.id),
        gestor_core::today(),
    )))
}

/// HTMX: Category `<option>`s for the selected type, keeping a still-valid choice
pub async fn htmx_category_options(params: Query<HashMap<String, String>>) -> Html<String> {
    let kind: Option<TransactionType> = params.get("type").and_then(|k| k.parse().ok());
    let selected = params.get("category").map(String::as_str).unwrap_or("");
    Html(category_options(kind, selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestor_core::Category;
    use rust_decimal::Decimal;

    fn tx(i: usize) -> Transaction {
        Transaction {
            id: format!("t{}", i),
            description: format!("Compra {}", i),
            amount: Decimal::from(10),
            kind: TransactionType::Expense,
            category: Category::Shopping,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            observations: None,
            is_fixed: false,
            fixed_expense_id: None,
        }
    }

    fn params(threshold: usize) -> WindowParams {
        WindowParams {
            row_height: 73,
            viewport_height: 600,
            buffer: 5,
            threshold,
        }
    }

    #[test]
    fn test_small_list_renders_every_row() {
        let txs: Vec<Transaction> = (0..3).map(tx).collect();
        let wp = params(50);
        let window = compute_window(txs.len(), 0, &wp);
        let html = render_list(
            &txs,
            &FilterParams::default(),
            &wp,
            &window,
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
        );
        assert_eq!(html.matches("style='height:73px'").count(), 3);
        assert!(!html.contains("virtualScroll"));
    }

    #[test]
    fn test_large_list_renders_window_with_spacers() {
        let txs: Vec<Transaction> = (0..1000).map(tx).collect();
        let wp = params(50);
        let window = compute_window(txs.len(), 7300, &wp);
        let html = render_rows(
            &txs,
            &window,
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
            wp.row_height,
        );
        assert_eq!(html.matches("style='height:73px'").count(), window.len());
        assert!(window.len() < 30);
        assert!(html.contains(&format!("style='height:{}px'", window.padding_top)));
        assert!(html.contains("Compra 100"));
    }

    #[test]
    fn test_empty_list_messages() {
        let wp = params(50);
        let window = compute_window(0, 0, &wp);
        let html = render_list(
            &[],
            &FilterParams::default(),
            &wp,
            &window,
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
        );
        assert!(html.contains("Nenhuma transação registrada ainda."));

        let filter = FilterParams {
            search: "xyz".to_string(),
            ..FilterParams::default()
        };
        let html = render_list(
            &[],
            &filter,
            &wp,
            &window,
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
        );
        assert!(html.contains("Nenhuma transação encontrada"));
        assert!(html.contains("/export/transactions.csv?search=xyz"));
    }

    #[test]
    fn test_form_shows_errors_and_keeps_values() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut form = blank_form(today);
        form.description = "<Mercado>".to_string();
        let mut errors = FormErrors::new();
        errors.insert("amount", "O valor deve ser maior que zero");
        let html = render_transaction_form(&form, &errors, FormAction::Create, today);
        assert!(html.contains("value='&lt;Mercado&gt;'"));
        assert!(html.contains("id='tx-error-amount'"));
        assert!(html.contains("max='2024-05-10'"));
        assert!(html.contains("<option value='expense' selected>"));
    }
}
