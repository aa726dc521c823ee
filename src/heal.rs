use crate::doctype::DocumentType;
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;

/// A filing whose declared dates are internally contradictory beyond
/// general-purpose repair, with the dates that actually work.
///
/// `lookup_end` is the end date under which the document's duration
/// contexts are really registered; the `corrected_*` dates are what the
/// filing record should say once the context is found. New rows go here,
/// never into resolution logic.
#[derive(Debug)]
pub struct KnownBadFiling {
    pub cik: &'static str,
    pub fiscal_year_focus: i32,
    pub document_type: DocumentType,
    pub lookup_end: NaiveDate,
    pub corrected_start: NaiveDate,
    pub corrected_end: NaiveDate,
    pub corrected_balance_sheet: NaiveDate,
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid table date")
}

/// Wayne Savings Bancshares' 2012 10-K registered its duration contexts
/// under 2011 dates while reporting a 2012 fiscal year.
pub static KNOWN_BAD_FILINGS: Lazy<Vec<KnownBadFiling>> = Lazy::new(|| {
    vec![KnownBadFiling {
        cik: "0001036030",
        fiscal_year_focus: 2012,
        document_type: DocumentType::Annual,
        lookup_end: ymd(2011, 12, 31),
        corrected_start: ymd(2012, 4, 1),
        corrected_end: ymd(2012, 12, 31),
        corrected_balance_sheet: ymd(2012, 12, 31),
    }]
});

pub fn lookup_known_bad(
    cik: &str,
    fiscal_year_focus: i32,
    document_type: &DocumentType,
) -> Option<&'static KnownBadFiling> {
    KNOWN_BAD_FILINGS.iter().find(|row| {
        row.cik == cik
            && row.fiscal_year_focus == fiscal_year_focus
            && row.document_type == *document_type
    })
}

/// Derives a missing fiscal-year focus from the period end date: a period
/// ending after June mostly sat in the end date's year, one ending in the
/// first half mostly sat in the year before.
pub fn derive_fiscal_year_focus(period_end: NaiveDate) -> i32 {
    if period_end.month() > 6 {
        period_end.year()
    } else {
        period_end.year() - 1
    }
}

/// Checks a declared end date against the fiscal-year focus and
/// reconstructs it when the year is plainly wrong.
///
/// A naive 365-day-earlier start is reconstructed; the focus year must
/// fall between that start's year and the end's year, otherwise the end
/// date gets the focus year with its original month and day. An
/// unrepresentable reconstruction (Feb 29 of a common year) keeps the
/// declared date.
pub fn check_end_date(period_end: NaiveDate, fiscal_year_focus: i32) -> NaiveDate {
    let dummy_start = period_end - Duration::days(365);

    if dummy_start.year() <= fiscal_year_focus && fiscal_year_focus <= period_end.year() {
        return period_end;
    }

    match NaiveDate::from_ymd_opt(fiscal_year_focus, period_end.month(), period_end.day())
    {
        Some(guess) => {
            log::warn!(
                "declared period end {} disagrees with fiscal year focus {}, using {}",
                period_end,
                fiscal_year_focus,
                guess
            );
            guess
        }
        None => period_end,
    }
}

/// Pulls a period end date out of an instance file name of the form
/// `<prefix>-<YYYYMMDD>.<ext>`. Any other shape skips this repair.
pub fn filename_period_end(file_name: &str) -> Option<NaiveDate> {
    let base = file_name.rsplit(['/', '\\']).next()?;
    let token = base.split('-').nth(1)?;
    let digits = token.split('.').next()?;

    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}
