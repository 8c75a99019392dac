//! The academic calendar: the April-to-March month cycle, academic-year
//! labels, and the timestamp format shared with the stored data.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};

/// The twelve fee months in academic order.
pub const MONTHS: [&str; 12] = [
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
    "JANUARY",
    "FEBRUARY",
    "MARCH",
];

/// Ledger sentinel for an annual-charges row.
pub const ANNUAL: &str = "ANNUAL";
/// Ledger sentinel for an admission-fee row.
pub const ADMISSION: &str = "ADMISSION";

/// Timestamp format used throughout the stored data.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Date format used for payment dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn is_month_name(label: &str) -> bool {
    MONTHS.contains(&label)
}

/// Labels accepted in the ledger's month column.
pub fn is_ledger_month_label(label: &str) -> bool {
    is_month_name(label) || label == ANNUAL || label == ADMISSION
}

/// The academic year a date falls in. The year runs April through March:
/// April 1 of year Y opens `"Y-(Y+1)"`, March 31 of year Y still belongs to
/// `"(Y-1)-Y"`.
pub fn academic_year_for(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= 4 {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

/// Current wall-clock time in the stored timestamp format.
pub fn now_stamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

/// Human-readable remaining-trial duration, e.g. `"29 days, 23 hours, 59 minutes"`.
pub fn format_remaining(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    format!("{days} days, {hours} hours, {minutes} minutes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn april_first_opens_the_year() {
        assert_eq!(academic_year_for(date(2025, 4, 1)), "2025-2026");
    }

    #[test]
    fn march_last_closes_the_previous_year() {
        assert_eq!(academic_year_for(date(2025, 3, 31)), "2024-2025");
    }

    #[test]
    fn midyear_dates() {
        assert_eq!(academic_year_for(date(2025, 9, 15)), "2025-2026");
        assert_eq!(academic_year_for(date(2026, 1, 10)), "2025-2026");
    }

    #[test]
    fn month_labels() {
        assert!(is_month_name("APRIL"));
        assert!(!is_month_name("April"));
        assert!(!is_month_name("ANNUAL"));
        assert!(is_ledger_month_label("ANNUAL"));
        assert!(is_ledger_month_label("ADMISSION"));
        assert!(!is_ledger_month_label("YEARLY"));
    }

    #[test]
    fn remaining_formatting() {
        assert_eq!(format_remaining(0), "0 days, 0 hours, 0 minutes");
        assert_eq!(
            format_remaining(29 * 86_400 + 23 * 3_600 + 59 * 60 + 30),
            "29 days, 23 hours, 59 minutes"
        );
        assert_eq!(format_remaining(-5), "0 days, 0 hours, 0 minutes");
    }

    #[test]
    fn timestamp_round_trip() {
        let ts = parse_timestamp("2026-08-06 10:30:00").unwrap();
        assert_eq!(format_timestamp(ts), "2026-08-06 10:30:00");
        assert!(parse_timestamp("06-08-2026").is_none());
    }
}
