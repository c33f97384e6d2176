// Display Formatting - currency and date strings
//
// Mirrors the product locale (es-CO): zero-decimal currency with dot-grouped
// thousands, Spanish month abbreviations. Formatting never fails; an
// unrecognized currency code degrades to "<code> <amount>".

use chrono::{Datelike, NaiveDate};

/// Display symbol for the currency codes the product offers. Anything else
/// falls back to the raw code as a prefix.
fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "COP" | "ARS" | "CLP" => Some("$"),
        "USD" => Some("US$"),
        "EUR" => Some("€"),
        "MXN" => Some("MX$"),
        "BRL" => Some("R$"),
        "PEN" => Some("S/"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Group an unsigned integer with '.' thousands separators (es-CO style).
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Locale-style, zero-decimal currency string: "$ 1.200.000" for known
/// codes, "XYZ 1.500.000" for unrecognized ones. Never fails, never empty.
pub fn format_currency(amount: f64, currency_code: &str) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let grouped = group_thousands(rounded.abs() as u64);
    let sign = if negative { "-" } else { "" };

    match currency_symbol(currency_code) {
        Some(symbol) => format!("{}{} {}", sign, symbol, grouped),
        None => format!("{} {}{}", currency_code, sign, grouped),
    }
}

const MONTH_ABBREV_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// "d MMM yyyy" with Spanish month abbreviations: "5 ene 2025".
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTH_ABBREV_ES[date.month0() as usize],
        date.year()
    )
}

/// Raw amount rendering for export fields: integral amounts without a
/// decimal point, fractional amounts with two decimals.
pub fn amount_field(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_known_codes() {
        assert_eq!(format_currency(1_200_000.0, "COP"), "$ 1.200.000");
        assert_eq!(format_currency(1_500.0, "USD"), "US$ 1.500");
        assert_eq!(format_currency(980.0, "EUR"), "€ 980");
    }

    #[test]
    fn test_format_currency_zero_is_non_empty() {
        assert_eq!(format_currency(0.0, "COP"), "$ 0");
    }

    #[test]
    fn test_format_currency_unrecognized_code_falls_back() {
        // Unknown code degrades to "<code> <amount>", never an error
        assert_eq!(format_currency(1_500_000.0, "XYZ"), "XYZ 1.500.000");
    }

    #[test]
    fn test_format_currency_rounds_to_zero_decimals() {
        assert_eq!(format_currency(999.6, "COP"), "$ 1.000");
        assert_eq!(format_currency(-250_000.0, "COP"), "-$ 250.000");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1.000");
        assert_eq!(group_thousands(5_000_000), "5.000.000");
        assert_eq!(group_thousands(123_456_789), "123.456.789");
    }

    #[test]
    fn test_format_date_spanish_abbrev() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "5 ene 2025");

        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(format_date(date), "24 dic 2025");
    }

    #[test]
    fn test_amount_field() {
        assert_eq!(amount_field(600_000.0), "600000");
        assert_eq!(amount_field(1500.5), "1500.50");
    }
}
