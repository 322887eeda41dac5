use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Date-time layouts tried for zone-less values (interpreted as UTC).
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Calendar-date layouts (midnight UTC).
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Day zero of the 1900 date system, accounting for Excel's phantom 1900-02-29.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial Excel accepts (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Render a timestamp in the canonical stored form, e.g. `2024-03-01T00:00:00.000Z`.
///
/// Fixed width, so lexical order of the strings matches chronological order.
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a string only if it is in the canonical form produced by [`format_iso`].
pub fn parse_canonical_iso(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != 24 || !s.ends_with('Z') {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a date or date-time string in one of the accepted layouts.
pub fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    // "2024. 3. 1." style dotted dates
    let dotted = if s.contains(". ") || s.ends_with('.') {
        s.replace(". ", ".").trim_end_matches('.').to_string()
    } else {
        s.to_string()
    };

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&dotted, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Convert an Excel serial day number (1900 date system) to a UTC timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || serial < 0.0 || serial > EXCEL_MAX_SERIAL + 1.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|naive| naive.and_utc())
}
