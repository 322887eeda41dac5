use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a base-10 decimal string into a Decimal.
///
/// Accepts:
/// - "4200" -> 4200
/// - "-12.50" -> -12.50
/// - "+3" -> 3
/// - ".5" -> 0.5
/// - "3." -> 3
///
/// Rejects thousands separators, exponents, hex, and anything with more than
/// one decimal point. Surrounding whitespace is ignored.
pub fn parse_number_text(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if !is_plain_decimal(body) {
        return None;
    }

    let body = body.strip_suffix('.').unwrap_or(body);
    let mut normalized = String::with_capacity(body.len() + 2);
    if negative {
        normalized.push('-');
    }
    if body.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(body);

    Decimal::from_str(&normalized)
        .ok()
        .or_else(|| normalized.parse::<f64>().ok().and_then(decimal_from_f64))
}

/// Digits with at most one '.', and at least one digit.
fn is_plain_decimal(body: &str) -> bool {
    let mut digits = 0;
    let mut dots = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Convert f64 to Decimal, preserving the shortest round-trip representation.
///
/// Uses a string round-trip to avoid floating-point artifacts
/// (e.g., 0.0035_f64 becoming 0.00349999...). Non-finite values and values
/// outside Decimal's range yield `None`.
pub fn decimal_from_f64(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}
