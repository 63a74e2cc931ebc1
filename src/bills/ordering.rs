//! Display dates and their ordering
//!
//! Bills are displayed as "D Mon. YY" (e.g. "4 Avr. 04"). That form drops
//! the century, so rows are ordered on the stored ISO date; `parse` reads a
//! display date back only for rows whose stored date is not ISO.

use chrono::{Datelike, NaiveDate};
use std::cmp::Reverse;

/// Localized month abbreviations, January to December.
/// Matching is exact: case and diacritics matter.
pub const MONTHS: [&str; 12] = [
    "Jan.", "Fév.", "Mar.", "Avr.", "Mai", "Juin", "Jui.", "Aoû.", "Sep.", "Oct.", "Nov.", "Déc.",
];

/// A display date made comparable.
///
/// `Unorderable` sorts below every real date so malformed rows end up last
/// in a newest-first list instead of aborting the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComparableDate {
    Unorderable,
    Date(NaiveDate),
}

/// Parse a display date ("<day> <MonthAbbrev> <yy>")
pub fn parse(display: &str) -> ComparableDate {
    parse_opt(display).map_or(ComparableDate::Unorderable, ComparableDate::Date)
}

fn parse_opt(display: &str) -> Option<NaiveDate> {
    let mut parts = display.split_whitespace();
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a stored ISO date (YYYY-MM-DD)
pub fn parse_iso(iso: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d")
}

/// Display form of a date, e.g. "4 Avr. 04"
pub fn display(date: NaiveDate) -> String {
    format!(
        "{} {} {:02}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year().rem_euclid(100)
    )
}

/// Stable sort of items by date, newest first.
/// Unorderable items keep their relative order at the end.
pub fn sort_newest_first<T>(items: &mut [T], date_of: impl Fn(&T) -> ComparableDate) {
    items.sort_by_key(|item| Reverse(date_of(item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> ComparableDate {
        ComparableDate::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_parse_display_dates() {
        assert_eq!(parse("4 Avr. 04"), ymd(2004, 4, 4));
        assert_eq!(parse("12 Déc. 22"), ymd(2022, 12, 12));
        assert_eq!(parse("1 Mai 21"), ymd(2021, 5, 1));
        assert_eq!(parse("30 Juin 23"), ymd(2023, 6, 30));
        assert_eq!(parse("14 Jui. 23"), ymd(2023, 7, 14));
        assert_eq!(parse("15 Aoû. 2019"), ymd(2019, 8, 15));
    }

    #[test]
    fn test_unknown_month_is_unorderable() {
        assert_eq!(parse("4 avr. 04"), ComparableDate::Unorderable);
        assert_eq!(parse("4 Fev. 04"), ComparableDate::Unorderable);
        assert_eq!(parse("4 April 04"), ComparableDate::Unorderable);
    }

    #[test]
    fn test_malformed_input_never_panics() {
        for input in ["", "   ", "2004-04-04", "31 Fév. 21", "x Jan. 21", "1 Jan.", "1 Jan. 2 3", "1 Jan. 123"] {
            assert_eq!(parse(input), ComparableDate::Unorderable, "{input:?}");
        }
    }

    #[test]
    fn test_display_round_trips_every_month() {
        for month in 1..=12 {
            let date = parse_iso(&format!("2023-{:02}-09", month)).unwrap();
            let shown = display(date);
            assert_eq!(parse(&shown), ymd(2023, month, 9), "month {month}: {shown}");
        }
        assert_eq!(display(parse_iso("2004-04-04").unwrap()), "4 Avr. 04");
        assert_eq!(display(parse_iso("1999-06-01").unwrap()), "1 Juin 99");
        assert!(parse_iso("04/04/2004").is_err());
    }

    #[test]
    fn test_sort_newest_first_puts_unorderable_last() {
        let mut dates = vec!["1 Jan. 21", "garbage", "3 Mar. 22", "2 Fév. 21", "bad too", "3 Mar. 20"];
        sort_newest_first(&mut dates, |d| parse(d));
        assert_eq!(
            dates,
            vec!["3 Mar. 22", "2 Fév. 21", "1 Jan. 21", "3 Mar. 20", "garbage", "bad too"]
        );
    }
}
