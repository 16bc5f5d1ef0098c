// Utility helpers for parsing and formatting.
//
// This module centralizes all the "dirty" spreadsheet cell handling so the
// rest of the code can assume clean, typed values. Every coercion here is
// total: bad input turns into a default, never into an error.
use crate::types::FieldValue;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date-only layouts tried in order. The sheets use `05-Jan-24`.
const DATE_FORMATS: [&str; 6] = [
    "%d-%b-%y", "%d-%b-%Y", "%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d %b %Y",
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%b-%y %H:%M",
    "%d/%m/%Y %H:%M",
];

// Largest serial the spreadsheet backend accepts (9999-12-31).
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Rewrite a header the way the dashboard expects it: trimmed, upper-cased,
/// with spaces turned into underscores. Applying it twice is a no-op.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase().replace(' ', "_")
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in sheet exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts scientific notation (`1e3`, `2.5E2`).
/// - Returns `None` for text (`N/A`), `nan`, `inf` and anything else that
///   does not parse to a finite number.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a quantity cell to a non-negative number.
///
/// Missing, unparsable, negative or non-finite values all become `0.0`.
pub fn coerce_quantity(value: Option<&FieldValue>) -> f64 {
    let parsed = match value {
        Some(FieldValue::Number(n)) => Some(*n),
        Some(FieldValue::Text(s)) => parse_f64_safe(Some(s)),
        Some(FieldValue::Date(_)) | None => None,
    };
    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 => n,
        _ => 0.0,
    }
}

/// Coerce an order-count cell; fractional counts are truncated.
pub fn coerce_count(value: Option<&FieldValue>) -> u64 {
    coerce_quantity(value).trunc() as u64
}

/// Best-effort date parse over the layouts the sheets have been seen with.
/// Any time-of-day component is dropped.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Spreadsheet serial day number (days since 1899-12-30) to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DAY {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Coerce a DATE cell. `None` is the "invalid date" sentinel.
pub fn coerce_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(*d),
        FieldValue::Text(s) => parse_date_safe(Some(s)),
        FieldValue::Number(n) => serial_to_date(*n),
    }
}

/// Coerce a label cell (route, status) to a trimmed string.
pub fn coerce_text(value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(s)) => s.trim().to_string(),
        Some(FieldValue::Number(n)) if n.fract() == 0.0 && n.is_finite() => {
            format!("{}", *n as i64)
        }
        Some(FieldValue::Number(n)) => n.to_string(),
        Some(FieldValue::Date(d)) => d.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    let pct = part / whole * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages and metric cards (e.g., `9,855`).
    n.to_formatted_string(&Locale::en)
}

/// Metric-card rendering of a percentage, e.g. `87.5%`.
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Total Orders "), "TOTAL_ORDERS");
        assert_eq!(normalize_key("munchie cookies"), "MUNCHIE_COOKIES");
        assert_eq!(normalize_key("ROUTE"), "ROUTE");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_normalize_key_idempotent() {
        for key in ["  Loading Compliance Status", "bi white ", "DR_CHINGWA", " a  b "] {
            let once = normalize_key(key);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some(" 42 ")), Some(42.0));
        assert_eq!(parse_f64_safe(Some("N/A")), None);
        assert_eq!(parse_f64_safe(Some("nan")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_parse_f64_scientific_notation() {
        assert_eq!(parse_f64_safe(Some("1e3")), Some(1000.0));
        assert_eq!(parse_f64_safe(Some("2.5E2")), Some(250.0));
        assert_eq!(coerce_count(Some(&FieldValue::from("1.2e2"))), 120);
    }

    #[test]
    fn test_coerce_quantity_defaults_to_zero() {
        assert_eq!(coerce_quantity(Some(&FieldValue::from("N/A"))), 0.0);
        assert_eq!(coerce_quantity(Some(&FieldValue::from("-5"))), 0.0);
        assert_eq!(coerce_quantity(Some(&FieldValue::Number(f64::NAN))), 0.0);
        assert_eq!(coerce_quantity(Some(&FieldValue::Date(ymd(2024, 1, 1)))), 0.0);
        assert_eq!(coerce_quantity(None), 0.0);
        assert_eq!(coerce_quantity(Some(&FieldValue::Number(7.5))), 7.5);
        assert_eq!(coerce_quantity(Some(&FieldValue::from("12"))), 12.0);
    }

    #[test]
    fn test_coerce_count_truncates() {
        assert_eq!(coerce_count(Some(&FieldValue::from("12.9"))), 12);
        assert_eq!(coerce_count(Some(&FieldValue::from("oops"))), 0);
    }

    #[test]
    fn test_parse_date_sheet_format() {
        assert_eq!(parse_date_safe(Some("05-Jan-24")), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_safe(Some("05-Jan-2024")), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_date_other_formats() {
        assert_eq!(parse_date_safe(Some("2024-03-09")), Some(ymd(2024, 3, 9)));
        assert_eq!(parse_date_safe(Some("09/03/2024")), Some(ymd(2024, 3, 9)));
        assert_eq!(
            parse_date_safe(Some("2024-03-09 17:45:00")),
            Some(ymd(2024, 3, 9))
        );
        assert_eq!(
            parse_date_safe(Some("2024-03-09T23:59:59+02:00")),
            Some(ymd(2024, 3, 9))
        );
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date_safe(Some("not a date")), None);
        assert_eq!(parse_date_safe(Some("31-Feb-24")), None);
        assert_eq!(parse_date_safe(Some("  ")), None);
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(serial_to_date(45292.75), Some(ymd(2024, 1, 1)));
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(-3.0), None);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(Some(&FieldValue::from(" Harare North "))), "Harare North");
        assert_eq!(coerce_text(Some(&FieldValue::Number(12.0))), "12");
        assert_eq!(coerce_text(None), "");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1.0, 4.0), 25.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(0.0, 1), "0.0");
    }

    #[test]
    fn test_format_int_and_pct() {
        assert_eq!(format_int(9855u64), "9,855");
        assert_eq!(format_pct(87.5), "87.5%");
        assert_eq!(format_pct(100.0), "100.0%");
    }
}
