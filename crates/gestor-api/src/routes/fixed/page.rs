//! Fixed expenses page rendering

use crate::components::{
    bar_chart, category_badge, category_options, empty_state, error_hook, field_error,
    input_class, money, LEDGER_CHANGED,
};
use crate::error::{ApiError, PageError};
use crate::routes::transactions::page::FormAction;
use crate::AppState;
use axum::extract::Path;
use axum::response::Html;
use gestor_config::CurrencyConfig;
use gestor_core::format::format_date;
use gestor_core::recurring::{self, UpcomingExpense};
use gestor_core::reports::{fixed_summary, ChartDataPoint};
use gestor_core::validation::{FixedExpenseForm, FormErrors};
use gestor_core::{CategoryPalette, FixedExpense, TransactionType};
use gestor_utils::escape_html;

pub fn render_fixed_form(
    form: &FixedExpenseForm,
    errors: &FormErrors,
    action: FormAction<'_>,
) -> String {
    let id = "fixed";
    let (title, url, submit) = match action {
        FormAction::Create => ("Novo gasto fixo", "/fixed".to_string(), "Adicionar"),
        FormAction::Edit(expense_id) => (
            "Editar gasto fixo",
            format!("/fixed/{}", urlencoding::encode(expense_id)),
            "Salvar",
        ),
    };
    let cancel = match action {
        FormAction::Create => String::new(),
        FormAction::Edit(_) => "<button type='button' hx-get='/fixed/new' hx-target='#fixed-form-panel' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancelar</button>".to_string(),
    };

    format!(
        r#"<h3 class='text-lg font-semibold mb-4'>{title}</h3>
        <form id='{id}-form' hx-post='{url}' hx-target='#fixed-form-panel' hx-swap='innerHTML' class='space-y-4'>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Descrição</label>
                <input type='text' name='description' value='{description}' maxlength='40' class='{description_class}' {description_hook}>
                {description_error}
            </div>
            <div class='grid grid-cols-2 gap-4'>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Valor</label>
                    <input type='text' inputmode='decimal' name='amount' value='{amount}' placeholder='0,00' class='{amount_class}' {amount_hook}>
                    {amount_error}
                </div>
                <div>
                    <label class='block text-sm font-medium text-gray-700 mb-1'>Dia do vencimento</label>
                    <input type='number' name='day_of_month' value='{day}' min='1' max='31' class='{day_class}' {day_hook}>
                    {day_error}
                </div>
            </div>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Categoria</label>
                <select name='category' class='{category_class}' {category_hook}>{categories}</select>
                {category_error}
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
        day = escape_html(&form.day_of_month),
        day_class = input_class(errors, "day_of_month"),
        day_hook = error_hook(id, "day_of_month"),
        day_error = field_error(id, errors, "day_of_month"),
        category_class = input_class(errors, "category"),
        category_hook = error_hook(id, "category"),
        categories = category_options(Some(TransactionType::Expense), &form.category),
        category_error = field_error(id, errors, "category"),
        submit = submit,
        cancel = cancel,
    )
}

fn urgency_class(u: &UpcomingExpense) -> &'static str {
    match u.urgency {
        recurring::Urgency::Critical => "bg-red-100 text-red-700",
        recurring::Urgency::Warning => "bg-yellow-100 text-yellow-700",
        recurring::Urgency::Normal => "bg-gray-100 text-gray-600",
    }
}

fn render_row(u: &UpcomingExpense, currency: &CurrencyConfig, palette: &CategoryPalette) -> String {
    let e = &u.expense;
    let id = urlencoding::encode(&e.id);
    format!(
        r#"<tr class='border-b hover:bg-gray-50'>
            <td class='px-4 py-3 font-medium'>{}</td>
            <td class='px-4 py-3'>{}</td>
            <td class='px-4 py-3 text-sm text-gray-600'>Todo dia {}</td>
            <td class='px-4 py-3 text-sm'>{} <span class='text-xs px-2 py-0.5 rounded-full {}'>{}</span></td>
            <td class='px-4 py-3 text-right font-semibold text-red-600'>{}</td>
            <td class='px-4 py-3 text-right whitespace-nowrap'>
                <button hx-get='/fixed/{}/edit' hx-target='#fixed-form-panel' class='text-indigo-600 hover:underline text-sm'>Editar</button>
                <button hx-delete='/fixed/{}' hx-confirm='Excluir o gasto fixo "{}"?' hx-swap='none' class='text-red-600 hover:underline text-sm ml-2'>Excluir</button>
            </td>
        </tr>"#,
        escape_html(&e.description),
        category_badge(e.category, palette),
        e.day_of_month,
        format_date(u.due_date),
        urgency_class(u),
        u.label(),
        money(e.amount, currency),
        id,
        id,
        escape_html(&e.description)
    )
}

/// Table of every fixed expense ordered by next due date, plus totals
pub fn render_fixed_list(
    expenses: &[FixedExpense],
    today: chrono::NaiveDate,
    currency: &CurrencyConfig,
    palette: &CategoryPalette,
) -> String {
    if expenses.is_empty() {
        return empty_state("Nenhum gasto fixo cadastrado.");
    }
    let projected = recurring::upcoming(expenses, today, expenses.len());
    let rows: String = projected
        .iter()
        .map(|u| render_row(u, currency, palette))
        .collect();

    let summary = fixed_summary(expenses);
    let distribution: Vec<ChartDataPoint> = summary
        .distribution
        .iter()
        .map(|c| ChartDataPoint {
            label: format!("{} ({}%)", c.category.label(), c.percentage.round_dp(1)),
            value: c.total,
            color: palette.color(c.category).to_string(),
        })
        .collect();

    format!(
        r#"<div class='flex justify-between items-center mb-4'>
            <span class='text-sm text-gray-500'>{} gasto(s) fixo(s)</span>
            <span class='text-sm'>Total mensal: <strong class='text-red-600'>{}</strong></span>
        </div>
        <div class='overflow-x-auto'><table class='w-full text-left'>
            <thead><tr class='text-xs uppercase text-gray-500 border-b'>
                <th class='px-4 py-2'>Descrição</th><th class='px-4 py-2'>Categoria</th><th class='px-4 py-2'>Recorrência</th><th class='px-4 py-2'>Próximo vencimento</th><th class='px-4 py-2 text-right'>Valor</th><th class='px-4 py-2'></th>
            </tr></thead>
            <tbody>{}</tbody>
        </table></div>
        <div class='mt-6'><h4 class='text-sm font-semibold text-gray-600 mb-3'>Distribuição por categoria</h4>{}</div>"#,
        expenses.len(),
        money(summary.total, currency),
        rows,
        bar_chart(&distribution, currency)
    )
}

pub async fn page_fixed(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let today = gestor_core::today();
    let ledger = state.ledger.read().await;
    let list = render_fixed_list(
        &ledger.state().fixed_expenses,
        today,
        &state.config.currency,
        ledger.palette(),
    );

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Gastos Fixos</h2><p class='text-sm text-gray-500'>Lançados automaticamente como despesa no dia do vencimento.</p></div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6' id='fixed-form-panel'>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6 lg:col-span-2' id='fixed-list' hx-get='/fixed/list' hx-trigger='{} from:body'>{}</div>
        </div>"#,
        render_fixed_form(&FixedExpenseForm::default(), &FormErrors::new(), FormAction::Create),
        LEDGER_CHANGED,
        list
    );

    Html(crate::page_response(&headers, "Gastos Fixos", "/fixed", &inner_content))
}

/// HTMX: Fixed expense table
pub async fn htmx_fixed_list(state: axum::extract::State<AppState>) -> Html<String> {
    let ledger = state.ledger.read().await;
    Html(render_fixed_list(
        &ledger.state().fixed_expenses,
        gestor_core::today(),
        &state.config.currency,
        ledger.palette(),
    ))
}

/// HTMX: Blank form
pub async fn htmx_fixed_create_form() -> Html<String> {
    Html(render_fixed_form(
        &FixedExpenseForm::default(),
        &FormErrors::new(),
        FormAction::Create,
    ))
}

/// HTMX: Form filled with an existing fixed expense
pub async fn htmx_fixed_edit_form(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Html<String>, PageError> {
    let ledger = state.ledger.read().await;
    let id = path.0;
    let expense = ledger
        .state()
        .fixed_expense(&id)
        .ok_or_else(|| ApiError::not_found(format!("fixed expense {}", id)))?;
    Ok(Html(render_fixed_form(
        &FixedExpenseForm::from(expense),
        &FormErrors::new(),
        FormAction::Edit(&expense.id),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gestor_core::Category;
    use rust_decimal::Decimal;

    fn expense(id: &str, day: u32, amount: i64, category: Category) -> FixedExpense {
        FixedExpense {
            id: id.to_string(),
            description: format!("Conta {}", id),
            amount: Decimal::from(amount),
            category,
            day_of_month: day,
        }
    }

    #[test]
    fn test_list_orders_by_next_due_date() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let expenses = vec![
            expense("a", 5, 100, Category::Housing),
            expense("b", 12, 50, Category::Bills),
        ];
        let html = render_fixed_list(
            &expenses,
            today,
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
        );
        // Day 12 is still ahead this month, day 5 rolls over to June
        let b = html.find("Conta b").unwrap();
        let a = html.find("Conta a").unwrap();
        assert!(b < a);
        assert!(html.contains("Restam 2 d"));
        assert!(html.contains("R$ 150,00"));
    }

    #[test]
    fn test_empty_list() {
        let html = render_fixed_list(
            &[],
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            &CurrencyConfig::default(),
            &CategoryPalette::default(),
        );
        assert!(html.contains("Nenhum gasto fixo"));
    }

    #[test]
    fn test_form_only_offers_expense_categories() {
        let mut errors = FormErrors::new();
        errors.insert("day_of_month", "O dia deve estar entre 1 e 31");
        let form = FixedExpenseForm {
            day_of_month: "40".to_string(),
            ..Default::default()
        };
        let html = render_fixed_form(&form, &errors, FormAction::Create);
        assert!(!html.contains("value='salary'"));
        assert!(html.contains("id='fixed-error-day_of_month'"));
        assert!(html.contains("value='40'"));
    }
}
