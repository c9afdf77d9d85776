use super::*;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn yen_with_symbol_and_separator() {
    assert_eq!(parse_price("¥1,280"), Some(dec("1280")));
}

#[test]
fn dollars_with_cents() {
    assert_eq!(parse_price("$12.99"), Some(dec("12.99")));
}

#[test]
fn yen_suffix_and_tax_note() {
    assert_eq!(parse_price("1280円（税込）"), Some(dec("1280")));
}

#[test]
fn full_width_digits() {
    assert_eq!(parse_price("１，２８０円"), Some(dec("1280")));
}

#[test]
fn plain_number() {
    assert_eq!(parse_price("2970.00"), Some(dec("2970.00")));
}

#[test]
fn first_amount_wins() {
    assert_eq!(parse_price("¥3,300 → ¥2,640"), Some(dec("3300")));
}

#[test]
fn surrounding_whitespace() {
    assert_eq!(parse_price("  ¥ 980  "), Some(dec("980")));
}

#[test]
fn no_digits_is_none() {
    assert_eq!(parse_price("SOLD OUT"), None);
    assert_eq!(parse_price(""), None);
}
