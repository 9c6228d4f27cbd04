//! Temporal normalizer: coerce heterogeneous expiry representations into
//! concrete calendar dates.
//!
//! Source columns arrive as ISO text, locale-formatted text, datetime
//! strings, or bare spreadsheet serial numbers depending on which export
//! produced the file. Resolution is a coalesce: the first interpretation
//! that succeeds wins.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Spreadsheet serial-date epoch (1899-12-30, which absorbs the 1900
/// leap-year bug offset).
pub const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Text date formats tried after strict ISO fails, in order.
const PERMISSIVE_FORMATS: &[&str] = &["%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Normalize one raw expiry value against `today`.
///
/// Tries, in order: strict ISO date, permissive text formats, ISO
/// datetime (time part discarded), numeric spreadsheet serial. If every
/// interpretation fails the value defaults to `today` — a deliberate
/// policy inherited from the source system: bad expiry data surfaces as
/// a zero-days-to-expire lot rather than an error. Callers that need to
/// reject missing dates must check for emptiness before calling this.
pub fn parse_expiry(raw: &str, today: NaiveDate) -> NaiveDate {
    let s = raw.trim();
    if s.is_empty() {
        return today;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d;
    }

    for fmt in PERMISSIVE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d;
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.date();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return dt.date();
    }

    if let Some(d) = parse_excel_serial(s) {
        return d;
    }

    today
}

/// Interpret a bare integer as days since the spreadsheet epoch.
fn parse_excel_serial(s: &str) -> Option<NaiveDate> {
    let serial: i64 = s.parse().ok()?;
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial))
}

/// Signed whole days from `today` to `expiry` (negative = expired).
pub fn days_to_expire(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()
    }

    #[test]
    fn test_iso_date_roundtrip() {
        // Canonical value normalizes to itself.
        let d = parse_expiry("2026-09-01", today());
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(parse_expiry(&d.to_string(), today()), d);
    }

    #[test]
    fn test_permissive_formats() {
        let expect = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(parse_expiry("2026/09/01", today()), expect);
        assert_eq!(parse_expiry("01-09-2026", today()), expect);
        assert_eq!(parse_expiry("2026-09-01 08:30:00", today()), expect);
    }

    #[test]
    fn test_excel_serial() {
        // 45170 days after 1899-12-30 = 2023-09-01.
        assert_eq!(
            parse_expiry("45170", today()),
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_unparseable_defaults_to_today() {
        assert_eq!(parse_expiry("not a date", today()), today());
        assert_eq!(parse_expiry("", today()), today());
        assert_eq!(parse_expiry("   ", today()), today());
    }

    #[test]
    fn test_days_to_expire_signed() {
        let expiry = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_eq!(days_to_expire(expiry, today()), -5);
        assert_eq!(days_to_expire(today(), today()), 0);
    }
}
