//! Transaction digest and prompt text

use gestor_core::format::format_plain;
use gestor_core::Transaction;

/// One line per transaction, in the order given
pub fn digest<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .map(|t| {
            format!(
                "{}: {} ({}) - R$ {} [Cat: {}]",
                t.date.format("%Y-%m-%d"),
                t.description,
                t.kind.label(),
                format_plain(t.amount),
                t.category.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full prompt embedding the digest
pub fn build_prompt(digest: &str) -> String {
    format!(
        "Como um consultor financeiro especialista, analise as seguintes transações recentes \
         de um usuário e forneça 3 dicas práticas e curtas para melhorar a saúde financeira dele.\n\n\
         Transações:\n{}\n\n\
         Formate sua resposta como um pequeno relatório motivador em Português do Brasil. \
         Use bullet points.",
        digest
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gestor_core::{Category, TransactionType};
    use rust_decimal::Decimal;

    fn tx(
        description: &str,
        amount: Decimal,
        kind: TransactionType,
        category: Category,
    ) -> Transaction {
        Transaction {
            id: description.to_lowercase(),
            description: description.to_string(),
            amount,
            kind,
            category,
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            observations: None,
            is_fixed: false,
            fixed_expense_id: None,
        }
    }

    #[test]
    fn test_digest_lines() {
        let txs = vec![
            tx("Salario", Decimal::from(5000), TransactionType::Income, Category::Salary),
            tx("Mercado", Decimal::new(12345, 2), TransactionType::Expense, Category::Food),
        ];
        let text = digest(&txs);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2024-05-03: Salario (Receita) - R$ 5000.00 [Cat: salary]");
        assert_eq!(lines[1], "2024-05-03: Mercado (Despesa) - R$ 123.45 [Cat: food]");
    }

    #[test]
    fn test_prompt_embeds_digest() {
        let prompt = build_prompt("linha um\nlinha dois");
        assert!(prompt.starts_with("Como um consultor financeiro"));
        assert!(prompt.contains("Transações:\nlinha um\nlinha dois"));
        assert!(prompt.ends_with("Use bullet points."));
    }
}
