use chrono::{Datelike, NaiveDate};

/// Absolute number of days between two dates.
pub fn delta_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// Whether a start/end pair spans a full fiscal year.
///
/// Same-calendar-year periods qualify when the month difference is 11
/// (e.g. 2015-01-01 to 2015-12-31). Periods crossing a calendar-year
/// boundary qualify when the month difference is 0 or 1 in either
/// direction, which covers fiscal years ending near year-end
/// (e.g. 2015-02-01 to 2016-01-31).
pub fn full_year_period(start: NaiveDate, end: NaiveDate) -> bool {
    let month_diff = end.month() as i32 - start.month() as i32;
    if start.year() == end.year() {
        month_diff.abs() == 11
    } else {
        month_diff == 0 || month_diff.abs() == 1
    }
}

/// Whole months from `start` to `end`.
///
/// A negative span means the filer's dates are rearranged or plain wrong;
/// those are unusable for duration selection, so the count floors at 0.
pub fn count_months(start: NaiveDate, end: NaiveDate) -> i32 {
    let months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    months.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_delta_days_is_symmetric() {
        let a = date("2015-09-30");
        let b = date("2015-12-31");
        assert_eq!(delta_days(a, b), 92);
        assert_eq!(delta_days(b, a), 92);
        assert_eq!(delta_days(a, a), 0);
    }

    #[test]
    fn test_full_year_same_calendar_year() {
        assert!(full_year_period(date("2015-01-01"), date("2015-12-31")));
        assert!(!full_year_period(date("2015-01-01"), date("2015-06-30")));
    }

    #[test]
    fn test_full_year_across_calendar_years() {
        // Fiscal year ending just after the calendar boundary
        assert!(full_year_period(date("2015-02-01"), date("2016-01-31")));
        // Month diff of zero across years
        assert!(full_year_period(date("2015-06-01"), date("2016-06-30")));
        // Half a year crossing the boundary is not a full year
        assert!(!full_year_period(date("2015-09-01"), date("2016-03-31")));
    }

    #[test]
    fn test_count_months() {
        assert_eq!(count_months(date("2015-01-01"), date("2015-12-31")), 11);
        assert_eq!(count_months(date("2015-04-01"), date("2015-12-31")), 8);
        assert_eq!(count_months(date("2014-11-01"), date("2016-01-31")), 14);
    }

    #[test]
    fn test_count_months_negative_span_is_zero() {
        // End-year preceding start-year is a filing error, never negative
        assert_eq!(count_months(date("2016-01-01"), date("2015-12-31")), 0);
        assert_eq!(count_months(date("2015-12-01"), date("2015-03-31")), 0);
    }
}
