// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Preço bruto = líquido * (1 + taxa/100), arredondado a 2 casas (meio para cima).
pub fn gross_price(price_net: Decimal, tax_rate: Decimal) -> Decimal {
    let factor = Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED;
    (price_net * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formata um valor em EUR no estilo do idioma.
/// "de"/"pt": `1.234,50 €`   "en": `€1,234.50`
pub fn format_eur(amount: Decimal, lang: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let (group_sep, decimal_sep) = match lang {
        "en" => (',', '.'),
        _ => ('.', ','),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    match lang {
        "en" => format!("{sign}€{grouped}{decimal_sep}{frac_part}"),
        _ => format!("{sign}{grouped}{decimal_sep}{frac_part} €"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn gross_of_100_at_19_percent_is_119() {
        let gross = gross_price(d("100"), d("19"));
        assert_eq!(gross, d("119.00"));
        assert_eq!(format_eur(gross, "de"), "119,00 €");
        assert_eq!(format_eur(gross, "en"), "€119.00");
    }

    #[test]
    fn gross_rounds_half_up() {
        // 9.99 * 1.07 = 10.6893
        assert_eq!(gross_price(d("9.99"), d("7")), d("10.69"));
        // 0.05 * 1.10 = 0.055
        assert_eq!(gross_price(d("0.05"), d("10")), d("0.06"));
    }

    #[test]
    fn zero_tax_keeps_net() {
        assert_eq!(gross_price(d("42.5"), Decimal::ZERO), d("42.50"));
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_eur(d("1234567.8"), "de"), "1.234.567,80 €");
        assert_eq!(format_eur(d("1234567.8"), "en"), "€1,234,567.80");
        assert_eq!(format_eur(d("-5"), "de"), "-5,00 €");
    }
}
