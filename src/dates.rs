//! Date normalization for backend payloads.
//!
//! The backend emits dates as `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY`,
//! or a datetime with the time glued on after a space or `T`. Filters and
//! status badges compare dates at midnight local time, so everything is
//! normalized to a [`NaiveDate`] here.

use chrono::{Months, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

fn ddmmyyyy() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})").unwrap())
}

fn yyyymmdd() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})").unwrap())
}

/// Parse any backend date shape to its calendar day, dropping the
/// time-of-day so "today at 23:00" and "today at 08:00" compare equal.
pub fn midnight(raw: &str) -> Option<NaiveDate> {
    if let Some(c) = ddmmyyyy().captures(raw) {
        return NaiveDate::from_ymd_opt(
            c[3].parse().ok()?,
            c[2].parse().ok()?,
            c[1].parse().ok()?,
        );
    }
    if let Some(c) = yyyymmdd().captures(raw) {
        return NaiveDate::from_ymd_opt(
            c[1].parse().ok()?,
            c[2].parse().ok()?,
            c[3].parse().ok()?,
        );
    }
    None
}

/// `HH:MM` embedded in a datetime string (`2025-01-10 14:30:00` or
/// `2025-01-10T14:30`), when the backend did not fill the `heure` field.
pub fn embedded_time(raw: &str) -> Option<String> {
    let (_, time) = raw.split_once([' ', 'T'])?;
    // get() keeps multibyte garbage after the separator from panicking.
    let hhmm = time.get(..5)?;
    let mut parts = hhmm.split(':');
    let (h, m) = (parts.next()?, parts.next()?);
    if h.len() == 2 && m.len() == 2 && h.chars().chain(m.chars()).all(|c| c.is_ascii_digit()) {
        Some(hhmm.to_string())
    } else {
        None
    }
}

/// Whether `raw` falls within the trailing three months ending `today`
/// (the "recent" filter).
pub fn is_recent(raw: &str, today: NaiveDate) -> bool {
    match (midnight(raw), today.checked_sub_months(Months::new(3))) {
        (Some(date), Some(cutoff)) => date >= cutoff,
        _ => false,
    }
}

/// Whether `raw` is today or later. A record dated exactly today counts
/// as upcoming.
pub fn is_upcoming(raw: &str, today: NaiveDate) -> bool {
    midnight(raw).map(|d| d >= today).unwrap_or(false)
}

/// Whether `raw` is strictly before today.
pub fn is_past(raw: &str, today: NaiveDate) -> bool {
    midnight(raw).map(|d| d < today).unwrap_or(false)
}

const WEEKDAYS_FR: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

const MONTHS_FR: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
    "septembre", "octobre", "novembre", "décembre",
];

/// Long French date, e.g. "mardi 14 janvier 2025".
pub fn format_long_fr(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{} {} {} {}",
        WEEKDAYS_FR[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS_FR[date.month0() as usize],
        date.year()
    )
}

/// Short French date, `DD/MM/YYYY`.
pub fn format_short_fr(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(midnight("2025-03-07"), Some(d(2025, 3, 7)));
    }

    #[test]
    fn parses_french_date() {
        assert_eq!(midnight("07/03/2025"), Some(d(2025, 3, 7)));
        assert_eq!(midnight("7-3-2025"), Some(d(2025, 3, 7)));
    }

    #[test]
    fn datetime_suffix_is_ignored() {
        assert_eq!(midnight("2025-03-07 14:30:00"), Some(d(2025, 3, 7)));
        assert_eq!(midnight("2025-03-07T09:00"), Some(d(2025, 3, 7)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(midnight("demain"), None);
        assert_eq!(midnight(""), None);
    }

    #[test]
    fn embedded_time_from_space_and_t() {
        assert_eq!(embedded_time("2025-03-07 14:30:00").as_deref(), Some("14:30"));
        assert_eq!(embedded_time("2025-03-07T09:15").as_deref(), Some("09:15"));
        assert_eq!(embedded_time("2025-03-07"), None);
    }

    #[test]
    fn non_time_suffix_is_rejected_not_a_panic() {
        // Multibyte text after the separator must not trip byte slicing.
        assert_eq!(embedded_time("2025-01-10 heuré"), None);
        assert_eq!(embedded_time("2025-01-10 à 14h"), None);
        assert_eq!(embedded_time("2025-01-10 14h"), None);
    }

    #[test]
    fn today_is_upcoming_not_past() {
        let today = d(2025, 3, 7);
        assert!(is_upcoming("2025-03-07", today));
        assert!(!is_past("2025-03-07", today));
    }

    #[test]
    fn time_of_day_does_not_skew_partition() {
        // A record later today must not land in "past" because of its time.
        let today = d(2025, 3, 7);
        assert!(is_upcoming("2025-03-07 23:59:00", today));
        assert!(is_past("2025-03-06 23:59:00", today));
    }

    #[test]
    fn recent_is_three_months() {
        let today = d(2025, 6, 15);
        assert!(is_recent("2025-04-01", today));
        assert!(is_recent("2025-03-15", today));
        assert!(!is_recent("2025-03-14", today));
    }

    #[test]
    fn french_formats() {
        // 2025-03-07 is a Friday.
        assert_eq!(format_long_fr(d(2025, 3, 7)), "vendredi 7 mars 2025");
        assert_eq!(format_short_fr(d(2025, 3, 7)), "07/03/2025");
    }
}
