//! Survey date parsing. Dates arrive as free text; a format hint picks the
//! day/month order when the text is ambiguous.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Explicit day/month ordering for survey dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `dd/MM/yyyy`
    DayMonthYear,
    /// `MM/dd/yyyy`
    MonthDayYear,
    /// `yyyy-MM-dd`
    YearMonthDay,
    /// `yyyy-MM`, read as the first day of the month.
    YearMonth,
}

impl DateFormat {
    /// Recognise a hint such as `dd/MM/yyyy`, `MM-dd-yyyy` or `yyyy-MM`.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        if hint.starts_with("dd") {
            Some(DateFormat::DayMonthYear)
        } else if hint.starts_with("mm") {
            Some(DateFormat::MonthDayYear)
        } else if hint.starts_with("yyyy") {
            let parts = hint.split(['-', '/', '.']).count();
            if parts == 2 {
                Some(DateFormat::YearMonth)
            } else {
                Some(DateFormat::YearMonthDay)
            }
        } else {
            None
        }
    }

    fn parse(&self, text: &str) -> Option<NaiveDate> {
        let unified = text.replace(['-', '.'], "/");
        match self {
            DateFormat::DayMonthYear => NaiveDate::parse_from_str(&unified, "%d/%m/%Y").ok(),
            DateFormat::MonthDayYear => NaiveDate::parse_from_str(&unified, "%m/%d/%Y").ok(),
            DateFormat::YearMonthDay => NaiveDate::parse_from_str(&unified, "%Y/%m/%d").ok(),
            DateFormat::YearMonth => {
                NaiveDate::parse_from_str(&format!("{unified}/01"), "%Y/%m/%d").ok()
            }
        }
    }
}

const FALLBACK_DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

const FALLBACK_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a survey date. A recognised hint is tried first, then a fixed list of
/// general formats. Blank or unparsable text yields `None`.
pub fn parse_date(text: &str, hint: Option<&str>) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(format) = hint.and_then(DateFormat::from_hint) {
        if let Some(date) = format.parse(text) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    DateFormat::YearMonth.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hint_selects_day_month_order() {
        assert_eq!(parse_date("01/02/2024", Some("dd/MM/yyyy")), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("01/02/2024", Some("MM/dd/yyyy")), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("13-02-2024", Some("dd-MM-yyyy")), Some(ymd(2024, 2, 13)));
    }

    #[test]
    fn test_year_month_hint() {
        assert_eq!(DateFormat::from_hint("yyyy-MM"), Some(DateFormat::YearMonth));
        assert_eq!(parse_date("2024-03", Some("yyyy-MM")), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_fallback_formats() {
        assert_eq!(parse_date("2024-01-15", None), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T10:30:00Z", None), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 08:00:00", None), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024", None), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("March 5, 2024", None), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-07", None), Some(ymd(2024, 7, 1)));
    }

    #[test]
    fn test_hint_mismatch_falls_back() {
        // ISO text with a day-first hint still parses through the fallback list.
        assert_eq!(parse_date("2024-01-15", Some("dd/MM/yyyy")), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_unparsable_dates_are_absent() {
        assert_eq!(parse_date("", None), None);
        assert_eq!(parse_date("   ", Some("dd/MM/yyyy")), None);
        assert_eq!(parse_date("last tuesday", None), None);
        assert_eq!(parse_date("31/02/2024", Some("dd/MM/yyyy")), None);
    }
}
