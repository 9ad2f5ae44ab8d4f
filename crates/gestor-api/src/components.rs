//! Shared HTML fragments

use axum::http::HeaderValue;
use axum::response::{Html, IntoResponse, Response};
use gestor_config::CurrencyConfig;
use gestor_core::format::format_money;
use gestor_core::reports::ChartDataPoint;
use gestor_core::validation::FormErrors;
use gestor_core::{Category, CategoryPalette, DispatchOutcome, TransactionType};
use gestor_utils::escape_html;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Event fired after any change to the ledger; lists refresh on it
pub const LEDGER_CHANGED: &str = "ledger-changed";

pub fn money(amount: Decimal, currency: &CurrencyConfig) -> String {
    escape_html(&format_money(amount, currency))
}

/// Tailwind text colour for a signed balance
pub fn balance_class(amount: Decimal) -> &'static str {
    if amount < Decimal::ZERO {
        "text-red-600"
    } else {
        "text-green-600"
    }
}

pub fn kind_class(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "text-green-600",
        TransactionType::Expense => "text-red-600",
    }
}

pub fn category_badge(category: Category, palette: &CategoryPalette) -> String {
    format!(
        r#"<span class='inline-flex items-center gap-1 px-2 py-0.5 rounded-full text-xs bg-gray-100'><span class='w-2 h-2 rounded-full' style='background:{}'></span>{}</span>"#,
        palette.color(category),
        category.label()
    )
}

/// `<option>`s for the categories of `kind`, or all categories grouped by type
pub fn category_options(kind: Option<TransactionType>, selected: &str) -> String {
    let option = |c: &Category| {
        format!(
            "<option value='{}' {}>{}</option>",
            c.as_str(),
            if c.as_str() == selected { "selected" } else { "" },
            c.label()
        )
    };
    let mut html = String::from("<option value=''>Selecione...</option>");
    match kind {
        Some(kind) => {
            for c in kind.categories() {
                html.push_str(&option(c));
            }
        }
        None => {
            for kind in [TransactionType::Income, TransactionType::Expense] {
                html.push_str(&format!("<optgroup label='{}'>", kind.label()));
                for c in kind.categories() {
                    html.push_str(&option(c));
                }
                html.push_str("</optgroup>");
            }
        }
    }
    html
}

/// Message under a form field; removed by `clearFieldError` on input
pub fn field_error(form_id: &str, errors: &FormErrors, field: &str) -> String {
    match errors.get(field) {
        Some(message) => format!(
            "<p id='{}-error-{}' class='text-xs text-red-600 mt-1'>{}</p>",
            form_id,
            field,
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// Input classes, red-bordered when the field has an error
pub fn input_class(errors: &FormErrors, field: &str) -> &'static str {
    if errors.get(field).is_some() {
        "w-full px-3 py-2 border border-red-500 rounded-lg focus:ring-2 focus:ring-indigo-500"
    } else {
        "w-full px-3 py-2 border rounded-lg focus:ring-2 focus:ring-indigo-500"
    }
}

/// Attributes wiring an input to its error message
pub fn error_hook(form_id: &str, field: &str) -> String {
    format!(
        "data-error='{}-error-{}' oninput='clearFieldError(this)' onchange='clearFieldError(this)'",
        form_id, field
    )
}

/// Horizontal bars scaled to the largest value
pub fn bar_chart(points: &[ChartDataPoint], currency: &CurrencyConfig) -> String {
    if points.is_empty() {
        return empty_state("Sem dados para exibir.");
    }
    let max = points
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut html = String::from("<div class='space-y-2'>");
    for p in points {
        html.push_str(&format!(
            r#"<div><div class='flex justify-between text-sm mb-1'><span>{}</span><span class='font-medium'>{}</span></div><div class='h-2 bg-gray-100 rounded'><div class='h-2 rounded' style='width:{:.1}%;background:{}'></div></div></div>"#,
            escape_html(&p.label),
            money(p.value, currency),
            percent_of(p.value, max),
            escape_html(&p.color)
        ));
    }
    html.push_str("</div>");
    html
}

/// `value / max` as a percentage for bar widths
pub fn percent_of(value: Decimal, max: Decimal) -> f64 {
    if max <= Decimal::ZERO {
        return 0.0;
    }
    value
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(100)))
        .and_then(|p| p.to_f64())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
}

pub fn empty_state(message: &str) -> String {
    format!(
        "<div class='text-center text-gray-400 py-8'>{}</div>",
        escape_html(message)
    )
}

/// Toast appended out of band to the page's toast container
pub fn toast(message: &str, success: bool) -> String {
    let (colors, icon) = if success {
        ("bg-green-50 border-green-200 text-green-800", "✓")
    } else {
        ("bg-yellow-50 border-yellow-200 text-yellow-800", "⚠")
    };
    format!(
        r#"<div id='toasts' hx-swap-oob='beforeend'><div class='toast border rounded-lg p-3 shadow {}'>{} {}</div></div>"#,
        colors,
        icon,
        escape_html(message)
    )
}

/// Toasts for a successful change, including the goal alert
pub fn outcome_toasts(message: &str, outcome: &DispatchOutcome) -> String {
    let mut html = toast(message, true);
    if outcome.generated > 0 {
        html.push_str(&toast(
            &format!("{} lançamento(s) fixo(s) gerado(s)", outcome.generated),
            true,
        ));
    }
    if outcome.goal_alert {
        html.push_str(&toast("Atenção: você ultrapassou a meta de gastos do mês!", false));
    }
    html
}

/// HTML response that also fires `ledger-changed` on the client
pub fn changed_response(html: String) -> Response {
    let mut response = Html(html).into_response();
    response
        .headers_mut()
        .insert("hx-trigger", HeaderValue::from_static(LEDGER_CHANGED));
    response
}

/// `key=value&...` with values percent-encoded
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_options_for_kind() {
        let html = category_options(Some(TransactionType::Income), "salary");
        assert!(html.contains("<option value='salary' selected>Salário</option>"));
        assert!(!html.contains("value='food'"));

        let html = category_options(None, "");
        assert!(html.contains("value='food'"));
        assert!(html.contains("<optgroup label='Receita'>"));
    }

    #[test]
    fn test_field_error() {
        let mut errors = FormErrors::new();
        errors.insert("amount", "Valor inválido");
        assert_eq!(
            field_error("tx", &errors, "amount"),
            "<p id='tx-error-amount' class='text-xs text-red-600 mt-1'>Valor inválido</p>"
        );
        assert_eq!(field_error("tx", &errors, "date"), "");
        assert!(input_class(&errors, "amount").contains("border-red-500"));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(Decimal::from(50), Decimal::from(200)), 25.0);
        assert_eq!(percent_of(Decimal::from(5), Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_query_string_encodes_values() {
        assert_eq!(
            query_string(&[("search", "café & pão"), ("type", "expense")]),
            "search=caf%C3%A9%20%26%20p%C3%A3o&type=expense"
        );
    }
}
