//! Display helpers for amounts. Deterministic given the amount and currency code.

/// Display symbol for an ISO 4217 code. Unknown codes render as the code plus a space.
#[must_use]
pub fn currency_symbol(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "HKD" => "HK$".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        "CNY" => "CN¥".to_string(),
        "TWD" => "NT$".to_string(),
        other => format!("{other} "),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// Amounts beyond u64 are not meaningful for a personal ledger; the cast saturates.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_magnitude(amount: f64, scale: f64) -> u64 {
    if amount.is_finite() {
        (amount.abs() * scale).round() as u64
    } else {
        0
    }
}

/// Formats `amount` with no decimal places, grouped thousands and the currency symbol,
/// e.g. `HK$1,235` or `-$40`.
#[must_use]
pub fn format_currency(amount: f64, currency: &str) -> String {
    let whole = scaled_magnitude(amount, 1.0);
    let sign = if amount < 0.0 && whole > 0 { "-" } else { "" };
    format!("{sign}{}{}", currency_symbol(currency), group_thousands(whole))
}

/// Formats `amount` with grouped thousands and at most three fraction digits,
/// trailing zeros dropped.
#[must_use]
pub fn format_number(amount: f64) -> String {
    let scaled = scaled_magnitude(amount, 1000.0);
    let (whole, frac) = (scaled / 1000, scaled % 1000);
    let sign = if amount < 0.0 && scaled > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{}", group_thousands(whole))
    } else {
        let frac = format!("{frac:03}");
        format!(
            "{sign}{}.{}",
            group_thousands(whole),
            frac.trim_end_matches('0')
        )
    }
}
