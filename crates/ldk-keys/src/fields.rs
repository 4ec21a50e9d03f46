//! Numeric, length, date and ship-window normalizers used at trade-save time.
//!
//! A half-filled form must never crash reconciliation, so every normalizer here
//! maps unparseable input to a safe default (0, today, `1-2 Weeks`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical random-length marker.
pub const LENGTH_RANDOM: &str = "RL";

pub const SHIP_PROMPT: &str = "Prompt";
pub const SHIP_STANDARD: &str = "1-2 Weeks";

const PROMPT_WORDS: &[&str] = &["prompt", "immediate", "spot", "now", "asap"];
const LENGTH_MARKS: &[char] = &['\'', '"', '\u{2032}', '\u{2033}'];

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Round to cents. Non-finite values become 0.
pub fn normalize_price_value(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    (v * 100.0).round() / 100.0
}

/// Parse a price such as `"$1,234.567"` and round to 2 decimals; 0 on failure.
pub fn normalize_price(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    parse_leading_f64(&cleaned)
        .map(normalize_price_value)
        .unwrap_or(0.0)
}

/// Parse a volume (MBF) and round to 2 decimals; 0 on failure.
///
/// Unlike prices, currency symbols and thousands separators are not stripped.
pub fn normalize_volume(raw: &str) -> f64 {
    parse_leading_f64(raw)
        .map(normalize_price_value)
        .unwrap_or(0.0)
}

/// Lenient float parse of the longest numeric prefix (`"12.5 mbf"` -> 12.5).
fn parse_leading_f64(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut k = frac_start;
        while k < bytes.len() && bytes[k].is_ascii_digit() {
            k += 1;
        }
        digits += k - frac_start;
        if digits > 0 {
            end = k;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut k = end + 1;
        if k < bytes.len() && (bytes[k] == b'+' || bytes[k] == b'-') {
            k += 1;
        }
        let exp_start = k;
        while k < bytes.len() && bytes[k].is_ascii_digit() {
            k += 1;
        }
        if k > exp_start {
            end = k;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// Normalize a board length.
///
/// Trailing foot/inch marks are stripped, `rl`/`random` become `RL`, and a
/// leading integer is kept on its own (`16'` -> `16`, `12ft` -> `12`). Text
/// that is neither passes through trimmed.
pub fn normalize_length(raw: &str) -> String {
    let s = raw.trim().trim_end_matches(LENGTH_MARKS).trim();
    if s.is_empty() {
        return String::new();
    }
    let lower = s.to_lowercase();
    if lower == "rl" || lower == "random" {
        return LENGTH_RANDOM.to_string();
    }

    let sign_len = usize::from(s.starts_with('-') || s.starts_with('+'));
    let digit_len = s[sign_len..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digit_len == 0 {
        return s.to_string();
    }
    match s[..sign_len + digit_len].parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse the date formats traders actually enter or import.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return Some(d);
    }
    None
}

/// ISO `YYYY-MM-DD`; `today` for missing or unparseable input.
pub fn normalize_date_on(raw: Option<&str>, today: NaiveDate) -> String {
    raw.and_then(parse_trade_date)
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// [`normalize_date_on`] against the current UTC date.
pub fn normalize_date(raw: Option<&str>) -> String {
    normalize_date_on(raw, Utc::now().date_naive())
}

// ---------------------------------------------------------------------------
// Ship window
// ---------------------------------------------------------------------------

pub fn normalize_ship_window(raw: &str) -> &'static str {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return SHIP_STANDARD;
    }
    if PROMPT_WORDS.contains(&s.as_str()) {
        return SHIP_PROMPT;
    }
    // "3 days", "few days" ship prompt; "7 days" is a standard window.
    if s.contains("day") && !s.contains('7') {
        return SHIP_PROMPT;
    }
    SHIP_STANDARD
}
