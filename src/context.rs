use crate::dates::{count_months, delta_days, full_year_period};
use crate::doctype::DocumentType;
use crate::document::InstanceDocument;
use chrono::NaiveDate;

/// A selected duration context. The start date it carries is the only
/// source of the filing's period start date; DEI scalars never declare it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DurationChoice {
    pub id: String,
    pub start: NaiveDate,
}

/// Derives the balance-sheet date corroborating the declared period end.
///
/// If some dimensionless instant context sits exactly on the declared end
/// date, the declaration stands. Otherwise the nearest instant date wins
/// (filers occasionally declare an end date a few days off from every
/// context they actually define). With no instant contexts at all the
/// declared date is kept as-is.
pub fn balance_sheet_date(doc: &InstanceDocument, period_end: NaiveDate) -> NaiveDate {
    if doc.instant_contexts_on(period_end).next().is_some() {
        return period_end;
    }
    match closest_instant(doc, period_end) {
        Some((_, date)) => {
            log::debug!(
                "no instant context on {}, using closest instant {}",
                period_end,
                date
            );
            date
        }
        None => period_end,
    }
}

/// The instant context nearest to `target` by absolute day distance.
/// The running minimum starts from the first candidate scanned, and ties
/// keep the earliest context in document order.
fn closest_instant(doc: &InstanceDocument, target: NaiveDate) -> Option<(&str, NaiveDate)> {
    doc.instant_contexts()
        .min_by_key(|&(_, date)| delta_days(date, target))
}

/// Selects the current period's instant context.
///
/// Probes in order: exact match on the declared period end date, exact
/// match on the derived balance-sheet date, then the closest instant
/// anywhere in the document. A document with no instant contexts resolves
/// nothing; that is reported to callers as absence, not an error.
pub fn resolve_instant(
    doc: &InstanceDocument,
    period_end: NaiveDate,
    bs_date: NaiveDate,
) -> Option<String> {
    if let Some(id) = doc.instant_contexts_on(period_end).next() {
        return Some(id.to_string());
    }
    if let Some(id) = doc.instant_contexts_on(bs_date).next() {
        return Some(id.to_string());
    }
    closest_instant(doc, period_end).map(|(id, _)| id.to_string())
}

/// Selects the current period's duration context.
///
/// Candidates are the dimensionless duration contexts ending on the
/// declared period end date (or, failing that, the balance-sheet date),
/// scanned in document order:
///
/// - Quarterly filings accept a span strictly between 60 and 120 days.
/// - Annual filings accept a full fiscal year; if none qualifies (the
///   company may be changing its fiscal calendar) the candidate spanning
///   the most whole months wins, ties going to the last one scanned.
///   Zero-month spans come from rearranged filer dates and are unusable.
/// - Other form types carry no income-statement period, so nothing is
///   resolved for them.
pub fn resolve_duration(
    doc: &InstanceDocument,
    doc_type: &DocumentType,
    period_end: NaiveDate,
    bs_date: NaiveDate,
) -> Option<DurationChoice> {
    let mut candidates: Vec<(&str, NaiveDate)> =
        doc.duration_contexts_ending(period_end).collect();
    let mut end = period_end;
    if candidates.is_empty() {
        candidates = doc.duration_contexts_ending(bs_date).collect();
        end = bs_date;
    }

    match doc_type {
        DocumentType::Quarterly => candidates
            .iter()
            .find(|&&(_, start)| {
                let days = delta_days(start, end);
                days > 60 && days < 120
            })
            .map(|&(id, start)| DurationChoice {
                id: id.to_string(),
                start,
            }),
        DocumentType::Annual => {
            let full_year = candidates
                .iter()
                .find(|&&(_, start)| full_year_period(start, end))
                .map(|&(id, start)| DurationChoice {
                    id: id.to_string(),
                    start,
                });
            full_year.or_else(|| longest_duration(&candidates, end))
        }
        DocumentType::Other(_) => None,
    }
}

fn longest_duration(
    candidates: &[(&str, NaiveDate)],
    end: NaiveDate,
) -> Option<DurationChoice> {
    let mut best: Option<(DurationChoice, i32)> = None;
    for &(id, start) in candidates {
        let months = count_months(start, end);
        if months == 0 {
            continue;
        }
        if best.as_ref().map_or(true, |&(_, m)| months >= m) {
            best = Some((
                DurationChoice {
                    id: id.to_string(),
                    start,
                },
                months,
            ));
        }
    }
    best.map(|(choice, _)| choice)
}
