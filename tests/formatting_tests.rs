use chrono::Duration;
use quanto_custa::currency::{
    format_brl, format_currency, format_hours, format_rate, format_time_left, CurrencyCode,
    LocaleConfig,
};

#[test]
fn brl_amounts() {
    insta::assert_snapshot!(format_brl(1234.56), @"R$ 1.234,56");
    insta::assert_snapshot!(format_brl(3.5), @"R$ 3,50");
    insta::assert_snapshot!(format_brl(-1999.999), @"-R$ 2.000,00");
}

#[test]
fn foreign_currencies_and_locales() {
    let fr = LocaleConfig::for_tag("fr-FR");
    insta::assert_snapshot!(
        format_currency(12345.6, &CurrencyCode::new("EUR"), &fr),
        @"€ 12 345,60"
    );
    let en = LocaleConfig::for_tag("en-US");
    insta::assert_snapshot!(
        format_currency(123456.0, &CurrencyCode::new("JPY"), &en),
        @"JPY 123,456"
    );
}

#[test]
fn work_hours() {
    insta::assert_snapshot!(format_hours(5.0), @"5h");
    insta::assert_snapshot!(format_hours(0.5), @"30min");
    insta::assert_snapshot!(format_hours(12.75), @"12h 45m");
    insta::assert_snapshot!(format_hours(0.0), @"0min");
}

#[test]
fn countdowns() {
    insta::assert_snapshot!(format_time_left(Duration::hours(-2)), @"Ready to decide!");
    insta::assert_snapshot!(format_time_left(Duration::minutes(59)), @"0h 59m left");
    insta::assert_snapshot!(format_time_left(Duration::hours(24 * 7)), @"7d 0h left");
}

#[test]
fn projection_rates() {
    let en = LocaleConfig::for_tag("en-US");
    insta::assert_snapshot!(format_rate(&en, 0.125), @"12.5%");
    insta::assert_snapshot!(format_rate(&LocaleConfig::default(), 0.06), @"6%");
}
