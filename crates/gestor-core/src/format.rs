//! Display formatting for money, dates and month names

use chrono::NaiveDate;
use gestor_config::{CurrencyConfig, SymbolPosition};
use gestor_utils::format_number;
use rust_decimal::{Decimal, RoundingStrategy};

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Month name for 1..=12, empty for anything else
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// Three-letter month abbreviation used in chart labels
pub fn month_abbrev(month: u32) -> String {
    month_name(month).chars().take(3).collect()
}

/// Format an amount according to the currency settings, e.g. `R$ 1.234,56`
pub fn format_money(amount: Decimal, currency: &CurrencyConfig) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(currency.decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", currency.decimal_places as usize, rounded);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut number = format_number(&int_part, &currency.thousands_separator);
    if let Some(frac) = frac_part {
        number.push_str(&currency.decimal_separator);
        number.push_str(&frac);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{} {}", sign, currency.symbol, number),
        SymbolPosition::After => format!("{}{} {}", sign, number, currency.symbol),
    }
}

/// Plain two-decimal amount with a dot separator, as used in exports and prompts
pub fn format_plain(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Date as `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Janeiro");
        assert_eq!(month_name(3), "Março");
        assert_eq!(month_name(12), "Dezembro");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
        assert_eq!(month_abbrev(2), "Fev");
    }

    #[test]
    fn test_format_money_default() {
        let currency = CurrencyConfig::default();
        assert_eq!(
            format_money(Decimal::from_str("1234.5").unwrap(), &currency),
            "R$ 1.234,50"
        );
        assert_eq!(format_money(Decimal::ZERO, &currency), "R$ 0,00");
        assert_eq!(
            format_money(Decimal::from_str("-99.999").unwrap(), &currency),
            "-R$ 100,00"
        );
    }

    #[test]
    fn test_format_money_symbol_after() {
        let currency = CurrencyConfig {
            symbol: "€".to_string(),
            thousands_separator: " ".to_string(),
            symbol_position: SymbolPosition::After,
            ..CurrencyConfig::default()
        };
        assert_eq!(
            format_money(Decimal::from_str("1000000").unwrap(), &currency),
            "1 000 000,00 €"
        );
    }

    #[test]
    fn test_format_plain_and_date() {
        assert_eq!(format_plain(Decimal::from_str("10.005").unwrap()), "10.01");
        assert_eq!(format_plain(Decimal::from(7)), "7.00");
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert_eq!(format_date(date), "03/05/2024");
    }
}
