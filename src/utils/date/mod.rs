// Date utility functions
// Month arithmetic and the "YYYY-MM" / "HH:MM" formats used by the planner document

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Weekday};

/// Format of the `month` field of the document.
pub const MONTH_FORMAT: &str = "%Y-%m";
/// Format of dates inside event keys and span bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the "YYYY-MM" string for the month containing `date`.
pub fn format_month(date: NaiveDate) -> String {
    date.format(MONTH_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a "YYYY-MM" string into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let (year, month) = value.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Parses a "YYYY-MM-DD" string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a strict "HH:MM" time. Anything else (including "9:00") is rejected.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return None;
    }
    let hour: u32 = value[..2].parse().ok()?;
    let minute: u32 = value[3..].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Moves the first day of a month forward or backward by whole months.
pub fn shift_month(month_start: NaiveDate, delta: i32) -> NaiveDate {
    let start = first_of_month(month_start);
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        start.checked_add_months(months)
    } else {
        start.checked_sub_months(months)
    };
    shifted.unwrap_or(start)
}

/// Every date from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn each_date_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// All dates of the month containing `date`.
pub fn month_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let start = first_of_month(date);
    let end = shift_month(start, 1).pred_opt().unwrap_or(start);
    each_date_inclusive(start, end).collect()
}

pub fn weekday_label(weekday: Weekday, compact: bool) -> &'static str {
    match (weekday, compact) {
        (Weekday::Sun, true) => "Su",
        (Weekday::Mon, true) => "Mo",
        (Weekday::Tue, true) => "Tu",
        (Weekday::Wed, true) => "We",
        (Weekday::Thu, true) => "Th",
        (Weekday::Fri, true) => "Fr",
        (Weekday::Sat, true) => "Sa",
        (Weekday::Sun, false) => "Sunday",
        (Weekday::Mon, false) => "Monday",
        (Weekday::Tue, false) => "Tuesday",
        (Weekday::Wed, false) => "Wednesday",
        (Weekday::Thu, false) => "Thursday",
        (Weekday::Fri, false) => "Friday",
        (Weekday::Sat, false) => "Saturday",
    }
}

/// Row label for a date: "M/D" in compact mode, the full date otherwise.
pub fn date_label(date: NaiveDate, compact: bool) -> String {
    if compact {
        format!("{}/{}", date.month(), date.day())
    } else {
        format_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("2024-3"), None);
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn test_parse_hhmm_is_strict() {
        assert_eq!(parse_hhmm("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_hhmm("9:30"), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("ab:cd"), None);
    }

    #[test]
    fn test_shift_month_crosses_years() {
        assert_eq!(shift_month(ymd(2024, 1, 15), -1), ymd(2023, 12, 1));
        assert_eq!(shift_month(ymd(2024, 12, 1), 1), ymd(2025, 1, 1));
        assert_eq!(shift_month(ymd(2024, 5, 31), 0), ymd(2024, 5, 1));
    }

    #[test]
    fn test_each_date_inclusive() {
        let dates: Vec<_> = each_date_inclusive(ymd(2024, 2, 28), ymd(2024, 3, 1)).collect();
        assert_eq!(dates, vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]);
        assert_eq!(each_date_inclusive(ymd(2024, 3, 2), ymd(2024, 3, 1)).count(), 0);
    }

    #[test]
    fn test_month_dates_leap_february() {
        let dates = month_dates(ymd(2024, 2, 10));
        assert_eq!(dates.len(), 29);
        assert_eq!(dates[0], ymd(2024, 2, 1));
        assert_eq!(dates[28], ymd(2024, 2, 29));
    }

    #[test]
    fn test_labels() {
        assert_eq!(date_label(ymd(2024, 3, 9), true), "3/9");
        assert_eq!(date_label(ymd(2024, 3, 9), false), "2024-03-09");
        assert_eq!(weekday_label(Weekday::Sat, true), "Sa");
        assert_eq!(weekday_label(Weekday::Sat, false), "Saturday");
    }
}
