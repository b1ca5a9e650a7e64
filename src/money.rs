//! Normalization and display formatting for monetary values.
//!
//! Amounts arrive either as raw numbers or as currency strings that were
//! round-tripped through a display step. Everything is normalized to a plain
//! `f64` before any arithmetic; formatting back to locale text is a one-way,
//! display-only operation.

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};

/// A monetary amount as it arrives at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MoneyInput {
    Number(f64),
    Text(String),
}

impl From<f64> for MoneyInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MoneyInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parses a heterogeneous amount into its canonical numeric value.
pub fn parse_money(input: &MoneyInput) -> LedgerResult<f64> {
    match input {
        MoneyInput::Number(value) if value.is_finite() => Ok(*value),
        MoneyInput::Number(value) => Err(LedgerError::InvalidAmount(value.to_string())),
        MoneyInput::Text(raw) => parse_money_str(raw),
    }
}

/// Parses formatted currency text. Any character that is not a digit, a dot,
/// or a minus sign is stripped before parsing.
pub fn parse_money_str(raw: &str) -> LedgerResult<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LedgerError::InvalidAmount(raw.to_string()))
}

/// Canonical text form of a parsed amount, reparseable by [`parse_money_str`].
pub fn canonical_string(value: f64) -> String {
    format!("{}", value)
}

/// Locale-aware currency formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Locale {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub precision: u8,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            precision: 2,
        }
    }
}

/// Renders an amount as locale currency text, e.g. `$400,000.00`.
pub fn format_currency(amount: f64, locale: &Locale) -> String {
    let mut body = format!("{:.*}", locale.precision as usize, amount.abs());
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    if let Some(pos) = body.find(locale.decimal_separator) {
        let grouped = group_digits(&body[..pos], locale.grouping_separator);
        body = format!("{}{}", grouped, &body[pos..]);
    } else {
        body = group_digits(&body, locale.grouping_separator);
    }
    if amount < 0.0 {
        format!("-{}{}", locale.symbol, body)
    } else {
        format!("{}{}", locale.symbol, body)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    let mut count = 0;
    for ch in digits.chars().rev() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
        count += 1;
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_numbers() {
        assert_eq!(parse_money(&MoneyInput::Number(400_000.0)).unwrap(), 400_000.0);
    }

    #[test]
    fn parses_formatted_currency_text() {
        assert_eq!(parse_money_str("$400,000.00").unwrap(), 400_000.0);
        assert_eq!(parse_money_str("-$1,250.50").unwrap(), -1_250.5);
    }

    #[test]
    fn rejects_unparseable_text() {
        assert!(matches!(
            parse_money_str("not money"),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_money_str(""),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        assert!(parse_money(&MoneyInput::Number(f64::NAN)).is_err());
        assert!(parse_money(&MoneyInput::Number(f64::INFINITY)).is_err());
    }

    #[test]
    fn parse_is_idempotent_over_canonical_form() {
        for raw in ["$400,000.00", "1250.5", "-99"] {
            let parsed = parse_money_str(raw).unwrap();
            let reparsed = parse_money_str(&canonical_string(parsed)).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    #[test]
    fn formats_with_grouping_and_sign() {
        let locale = Locale::default();
        assert_eq!(format_currency(400_000.0, &locale), "$400,000.00");
        assert_eq!(format_currency(-1_250.5, &locale), "-$1,250.50");
        assert_eq!(format_currency(0.0, &locale), "$0.00");
    }

    #[test]
    fn formatted_output_survives_a_parse_round_trip() {
        let locale = Locale::default();
        let formatted = format_currency(91_000.0, &locale);
        assert_eq!(parse_money_str(&formatted).unwrap(), 91_000.0);
    }
}
