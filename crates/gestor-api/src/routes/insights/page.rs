//! Insights page rendering

use crate::AppState;
use axum::response::Html;
use gestor_advisor::{Advice, AdviceStatus};
use gestor_utils::escape_html;

/// Render advice text as paragraphs and bullet lists
///
/// Lines starting with `*`, `-` or `•` become list items; `**` markers are
/// dropped. Everything is escaped.
pub fn render_advice_text(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let bullet = ["* ", "- ", "• "]
            .iter()
            .find_map(|marker| line.strip_prefix(marker));
        match bullet {
            Some(item) => {
                if !in_list {
                    html.push_str("<ul class='list-disc pl-6 space-y-2'>");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>", escape_html(&item.replace("**", ""))));
            }
            None => {
                if in_list {
                    html.push_str("</ul>");
                    in_list = false;
                }
                html.push_str(&format!(
                    "<p class='mb-2'>{}</p>",
                    escape_html(&line.replace("**", ""))
                ));
            }
        }
    }
    if in_list {
        html.push_str("</ul>");
    }
    html
}

pub fn render_advice(advice: &Advice) -> String {
    let (panel, title) = match advice.status {
        AdviceStatus::Ready => ("bg-white border-indigo-200", "Análise do seu consultor"),
        AdviceStatus::Busy => ("bg-blue-50 border-blue-200 text-blue-800", "Aguarde"),
        AdviceStatus::Failed | AdviceStatus::EmptyResponse => {
            ("bg-red-50 border-red-200 text-red-800", "Não foi possível analisar")
        }
        AdviceStatus::NoTransactions | AdviceStatus::Disabled => {
            ("bg-yellow-50 border-yellow-200 text-yellow-800", "Atenção")
        }
    };
    format!(
        "<div class='rounded-xl border p-6 {}'><h3 class='font-semibold mb-3'>{}</h3><div class='text-sm leading-relaxed'>{}</div></div>",
        panel,
        title,
        render_advice_text(&advice.text)
    )
}

pub async fn page_insights(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let count = state.ledger.read().await.state().transactions.len();
    let action = if state.advisor.is_enabled() {
        r#"<button hx-post='/insights/generate' hx-target='#insights-result' hx-swap='innerHTML' hx-disabled-elt='this' hx-indicator='#insights-spinner' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-50'>Gerar insights</button>
        <span id='insights-spinner' class='htmx-indicator text-sm text-gray-500 ml-3'>Analisando suas finanças...</span>"#
            .to_string()
    } else {
        format!(
            "<p class='text-sm text-gray-500'>{}</p>",
            escape_html(gestor_advisor::DISABLED_MESSAGE)
        )
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Insights AI</h2><p class='text-sm text-gray-500'>Dicas de economia com base nas suas {} transação(ões) em aberto.</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>{}</div>
        <div id='insights-result'></div>"#,
        count, action
    );
    Html(crate::page_response(&headers, "Insights AI", "/insights", &inner_content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_advice_text_bullets_and_escaping() {
        let html = render_advice_text("Resumo geral\n\n* **Mercado** alto\n- Reduza <lazer>\nFim");
        assert_eq!(
            html,
            "<p class='mb-2'>Resumo geral</p><ul class='list-disc pl-6 space-y-2'><li>Mercado alto</li><li>Reduza &lt;lazer&gt;</li></ul><p class='mb-2'>Fim</p>"
        );
    }

    #[test]
    fn test_render_advice_status_panels() {
        let busy = Advice {
            status: AdviceStatus::Busy,
            text: gestor_advisor::BUSY_MESSAGE.to_string(),
        };
        assert!(render_advice(&busy).contains("Aguarde"));

        let failed = Advice {
            status: AdviceStatus::Failed,
            text: "erro".to_string(),
        };
        assert!(render_advice(&failed).contains("bg-red-50"));
    }
}
