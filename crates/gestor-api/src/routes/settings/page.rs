//! Settings page rendering

use crate::components::{error_hook, field_error, input_class, money};
use crate::AppState;
use axum::response::Html;
use gestor_config::{Config, CurrencyConfig};
use gestor_core::format::format_plain;
use gestor_core::validation::FormErrors;
use gestor_core::{Category, CategoryPalette};
use gestor_utils::escape_html;
use rust_decimal::Decimal;

/// Monthly goal form; a goal of zero turns the alert off
pub fn render_goal_form(
    value: &str,
    current: Decimal,
    errors: &FormErrors,
    currency: &CurrencyConfig,
) -> String {
    let id = "goal";
    let current_text = if current > Decimal::ZERO {
        format!("Meta atual: <strong>{}</strong>", money(current, currency))
    } else {
        "Nenhuma meta definida.".to_string()
    };
    format!(
        r#"<form hx-post='/settings/goal' hx-target='#goal-panel' hx-swap='innerHTML' class='space-y-3'>
            <p class='text-sm text-gray-600'>{}</p>
            <div class='flex gap-3 items-start'>
                <div class='flex-1'>
                    <input type='text' inputmode='decimal' name='goal' value='{}' placeholder='0,00' class='{}' {}>
                    {}
                </div>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar meta</button>
            </div>
            <p class='text-xs text-gray-400'>Use 0 para desativar o alerta de gastos.</p>
        </form>"#,
        current_text,
        escape_html(value),
        input_class(errors, "goal"),
        error_hook(id, "goal"),
        field_error(id, errors, "goal")
    )
}

fn setting_row(label: &str, value: &str) -> String {
    format!(
        "<div class='flex justify-between py-2 border-b text-sm'><span class='text-gray-500'>{}</span><span class='font-medium'>{}</span></div>",
        label, value
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

/// Read-only view of the running configuration
pub fn render_config(config: &Config, store: &str, palette: &CategoryPalette) -> String {
    let general = [
        setting_row(
            "Servidor",
            &escape_html(&format!("{}:{}", config.server.host, config.server.port)),
        ),
        setting_row("Autenticação", yes_no(config.server.auth.is_some())),
        setting_row("Armazenamento", &escape_html(store)),
        setting_row("Log", &escape_html(&config.logging.level)),
    ]
    .concat();
    let ledger = [
        setting_row(
            "Dias retroativos no lançamento rápido",
            &config.ledger.quick_add_days.to_string(),
        ),
        setting_row(
            "Lançar gastos fixos automaticamente",
            yes_no(config.ledger.materialize_fixed),
        ),
        setting_row(
            "Fechamentos por página",
            &config.list.history_page_size.to_string(),
        ),
        setting_row(
            "Virtualizar listas a partir de",
            &format!("{} itens", config.list.virtualization_threshold),
        ),
        setting_row(
            "Exemplo de moeda",
            &money(Decimal::new(123456, 2), &config.currency),
        ),
    ]
    .concat();
    let advisor = [
        setting_row("Insights ativos", yes_no(config.advisor.enabled)),
        setting_row("Modelo", &escape_html(&config.advisor.model)),
        setting_row("Chave de API (variável)", &escape_html(&config.advisor.api_key_env)),
    ]
    .concat();
    let colors: String = Category::ALL
        .iter()
        .map(|c| {
            format!(
                "<div class='flex items-center gap-2 text-sm'><span class='w-4 h-4 rounded' style='background:{}'></span>{}</div>",
                escape_html(palette.color(*c)),
                c.label()
            )
        })
        .collect();

    format!(
        r#"<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Geral</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Lançamentos</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Insights</h3>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'><h3 class='text-lg font-semibold mb-4'>Cores das categorias</h3><div class='grid grid-cols-2 gap-2'>{}</div></div>
        </div>"#,
        general, ledger, advisor, colors
    )
}

pub async fn page_settings(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let ledger = state.ledger.read().await;
    let goal = ledger.state().monthly_goal;
    let value = if goal > Decimal::ZERO {
        format_plain(goal)
    } else {
        String::new()
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Configurações</h2><p class='text-sm text-gray-500'>Alterações de configuração exigem reiniciar o servidor.</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'><h3 class='text-lg font-semibold mb-4'>Meta mensal de gastos</h3><div id='goal-panel'>{}</div></div>
        {}"#,
        render_goal_form(&value, goal, &FormErrors::new(), &state.config.currency),
        render_config(&state.config, &ledger.store_location(), ledger.palette())
    );
    Html(crate::page_response(&headers, "Configurações", "/settings", &inner_content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_form_states() {
        let currency = CurrencyConfig::default();
        let html = render_goal_form("", Decimal::ZERO, &FormErrors::new(), &currency);
        assert!(html.contains("Nenhuma meta definida"));

        let mut errors = FormErrors::new();
        errors.insert("goal", "Informe uma meta válida (zero ou maior)");
        let html = render_goal_form("-5", Decimal::from(2000), &errors, &currency);
        assert!(html.contains("R$ 2.000,00"));
        assert!(html.contains("id='goal-error-goal'"));
        assert!(html.contains("value='-5'"));
    }

    #[test]
    fn test_config_view_hides_credentials() {
        let mut config = Config::default();
        config.server.auth = Some(gestor_config::AuthConfig {
            username: "familia".to_string(),
            password: "segredo".to_string(),
        });
        let html = render_config(&config, "memory", &CategoryPalette::default());
        assert!(!html.contains("segredo"));
        assert!(html.contains("Autenticação"));
        assert!(html.contains("Salário"));
    }
}
