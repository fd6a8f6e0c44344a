//! Money, duration and countdown formatting for terminal output.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("BRL")
    }
}

/// Separators used when rendering numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl LocaleConfig {
    /// Known tags get their separators; anything else falls back to pt-BR.
    pub fn for_tag(tag: &str) -> Self {
        let (decimal_separator, grouping_separator) = match tag {
            "en-US" | "en-GB" | "en" => ('.', ','),
            "fr-FR" | "fr" => (',', ' '),
            _ => (',', '.'),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("pt-BR")
    }
}

pub fn symbol_for(code: &str) -> &str {
    match code {
        "BRL" => "R$",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        other => other,
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let mut body = format!("{:.*}", precision as usize, value);
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    if let Some(pos) = body.find(locale.decimal_separator) {
        let mut int_part = body[..pos].to_string();
        insert_grouping(&mut int_part, locale.grouping_separator);
        body = format!("{}{}", int_part, &body[pos..]);
    } else {
        insert_grouping(&mut body, locale.grouping_separator);
    }
    body
}

fn insert_grouping(int_part: &mut String, separator: char) {
    let mut cleaned = int_part.replace(separator, "");
    if cleaned.starts_with('-') {
        let sign = cleaned.remove(0);
        let grouped = group_digits(&cleaned, separator);
        *int_part = format!("{}{}", sign, grouped);
    } else {
        *int_part = group_digits(&cleaned, separator);
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// `R$ 1.234,56`; negatives render as `-R$ 1.234,56`.
pub fn format_currency(amount: f64, code: &CurrencyCode, locale: &LocaleConfig) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let precision = minor_units_for(code.as_str());
    let body = format_number(locale, amount.abs(), precision);
    let symbol = symbol_for(code.as_str());
    let negative = amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
    if negative {
        format!("-{} {}", symbol, body)
    } else {
        format!("{} {}", symbol, body)
    }
}

pub fn format_brl(amount: f64) -> String {
    format_currency(amount, &CurrencyCode::default(), &LocaleConfig::default())
}

/// Renders work hours: `45min` below one hour, otherwise `2h`, `2h 30m`
/// or `2h 30m 15s`. Seconds and minutes carry, so `60` never shows up.
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0min".into();
    }
    if hours < 1.0 {
        let minutes = (hours * 60.0).round() as u64;
        if minutes < 60 {
            return format!("{}min", minutes);
        }
    }
    let total_seconds = (hours * 3600.0).round() as u64;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    match (m, s) {
        (0, 0) => format!("{}h", h),
        (_, 0) => format!("{}h {}m", h, m),
        _ => format!("{}h {}m {}s", h, m, s),
    }
}

/// Countdown for a waiting item: `Ready to decide!`, `2d 5h left` or
/// `5h 12m left`.
pub fn format_time_left(remaining: Duration) -> String {
    if remaining <= Duration::zero() {
        return "Ready to decide!".into();
    }
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours >= 24 {
        format!("{}d {}h left", hours / 24, hours % 24)
    } else {
        format!("{}h {}m left", hours, minutes)
    }
}

/// `0.10` renders as `10%`, `0.075` as `7,5%`.
pub fn format_rate(locale: &LocaleConfig, rate: f64) -> String {
    let percent = rate * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{}%", percent.round() as i64)
    } else {
        let body = format_number(locale, percent, 2);
        let trimmed = body
            .trim_end_matches('0')
            .trim_end_matches(locale.decimal_separator);
        format!("{}%", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brl_uses_brazilian_separators() {
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(0.5), "R$ 0,50");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-42.1), "-R$ 42,10");
        assert_eq!(format_brl(-0.001), "R$ 0,00");
    }

    #[test]
    fn other_locales_swap_separators() {
        let us = LocaleConfig::for_tag("en-US");
        let usd = CurrencyCode::new("usd");
        assert_eq!(format_currency(9876.5, &usd, &us), "$ 9,876.50");
    }

    #[test]
    fn hours_render_with_carry() {
        assert_eq!(format_hours(0.25), "15min");
        assert_eq!(format_hours(0.9999), "1h");
        assert_eq!(format_hours(2.0), "2h");
        assert_eq!(format_hours(2.5), "2h 30m");
        assert_eq!(format_hours(2.0 + 30.0 / 60.0 + 15.0 / 3600.0), "2h 30m 15s");
        assert_eq!(format_hours(1.0 + 59.999 / 60.0), "2h");
        assert_eq!(format_hours(-3.0), "0min");
    }

    #[test]
    fn time_left_switches_to_days() {
        assert_eq!(format_time_left(Duration::zero()), "Ready to decide!");
        assert_eq!(format_time_left(Duration::minutes(312)), "5h 12m left");
        assert_eq!(format_time_left(Duration::hours(53)), "2d 5h left");
    }

    #[test]
    fn rates_drop_trailing_zeros() {
        let locale = LocaleConfig::default();
        assert_eq!(format_rate(&locale, 0.10), "10%");
        assert_eq!(format_rate(&locale, 0.075), "7,5%");
    }
}
