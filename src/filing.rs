use crate::context::{self, DurationChoice};
use crate::dei::{self, Dei};
use crate::doctype::DocumentType;
use crate::document::InstanceDocument;
use crate::facts::{self, ConceptValue};
use crate::{heal, units};
use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

/// One fully resolved filing: the DEI scalars as filed, the (possibly
/// self-healed) reporting-period dates, the selected contexts, and the
/// reporting currency, plus the document itself for concept extraction.
///
/// Resolution happens once, in [`Filing::parse`]; the record is immutable
/// afterwards, so resolving the same bytes twice yields identical results.
#[derive(Debug, Serialize)]
pub struct Filing {
    pub dei: Dei,
    pub document_type: DocumentType,
    pub fiscal_year_focus: Option<i32>,
    pub period_end_date: Option<NaiveDate>,
    pub period_start_date: Option<NaiveDate>,
    pub balance_sheet_date: Option<NaiveDate>,
    pub instant_context: Option<String>,
    pub duration_context: Option<String>,
    pub currency: String,
    #[serde(skip)]
    doc: InstanceDocument,
}

/// Working state threaded through the resolution stages. Each stage takes
/// what the previous one produced; nothing is patched up after the fact.
#[derive(Debug, Default)]
struct Resolution {
    fiscal_year_focus: Option<i32>,
    period_end: Option<NaiveDate>,
    period_start: Option<NaiveDate>,
    balance_sheet: Option<NaiveDate>,
    instant_context: Option<String>,
    duration_context: Option<String>,
}

impl Filing {
    /// Parses and resolves an instance document with no file name
    /// available; the filename-derived repair step is skipped.
    pub fn parse(raw: &str) -> Result<Filing> {
        Filing::parse_named(raw, None)
    }

    /// Parses and resolves an instance document. The file name, when
    /// known, feeds the second self-healing step.
    pub fn parse_named(raw: &str, file_name: Option<&str>) -> Result<Filing> {
        let doc = InstanceDocument::parse(raw)?;
        let dei = dei::extract(&doc);
        let document_type = dei
            .document_type
            .clone()
            .unwrap_or_else(|| DocumentType::Other(String::new()));

        let mut res = resolve_contexts(&doc, &document_type, dei.period_end_date);
        res.fiscal_year_focus = dei.fiscal_year_focus;

        if res.period_start.is_none() {
            self_heal(&doc, &document_type, dei.cik.as_deref(), file_name, &mut res);
        }

        let currency = units::resolve_currency(&doc, res.instant_context.as_deref());

        Ok(Filing {
            dei,
            document_type,
            fiscal_year_focus: res.fiscal_year_focus,
            period_end_date: res.period_end,
            period_start_date: res.period_start,
            balance_sheet_date: res.balance_sheet,
            instant_context: res.instant_context,
            duration_context: res.duration_context,
            currency,
            doc,
        })
    }

    /// Reads and resolves an instance file; the file's name participates
    /// in self-healing.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Filing> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading instance file {:?}", path))?;
        let file_name = path.file_name().and_then(|n| n.to_str());
        Filing::parse_named(&raw, file_name)
    }

    /// The value of a concept under an explicit context id.
    pub fn concept_in(&self, concept: &str, context_ref: &str) -> Option<Decimal> {
        facts::extract_concept(&self.doc, concept, context_ref)
    }

    /// A concept's value with precision metadata under an explicit context.
    pub fn concept_value_in(&self, concept: &str, context_ref: &str) -> Option<ConceptValue> {
        facts::concept_value(&self.doc, concept, context_ref)
    }

    /// A balance-sheet style concept under the current instant context.
    /// Absent when the concept is not filed or no instant context resolved.
    pub fn instant_concept(&self, concept: &str) -> Option<Decimal> {
        let context = self.instant_context.as_deref()?;
        self.concept_in(concept, context)
    }

    /// An income-statement style concept under the current duration
    /// context.
    pub fn duration_concept(&self, concept: &str) -> Option<Decimal> {
        let context = self.duration_context.as_deref()?;
        self.concept_in(concept, context)
    }

    /// The reporting currency, or `"not specified"` when undiscoverable.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn document(&self) -> &InstanceDocument {
        &self.doc
    }
}

/// Stage two: context selection from the declared period end date.
fn resolve_contexts(
    doc: &InstanceDocument,
    document_type: &DocumentType,
    period_end: Option<NaiveDate>,
) -> Resolution {
    let mut res = Resolution {
        period_end,
        ..Resolution::default()
    };

    let Some(end) = period_end else {
        log::warn!("no declared period end date; context resolution deferred to healing");
        return res;
    };

    let bs_date = context::balance_sheet_date(doc, end);
    res.balance_sheet = Some(bs_date);
    res.instant_context = context::resolve_instant(doc, end, bs_date);

    if let Some(choice) = context::resolve_duration(doc, document_type, end, bs_date) {
        apply_duration(&mut res, choice);
    }

    res
}

fn apply_duration(res: &mut Resolution, choice: DurationChoice) {
    log::debug!(
        "selected duration context {} starting {}",
        choice.id,
        choice.start
    );
    res.period_start = Some(choice.start);
    res.duration_context = Some(choice.id);
}

/// Stage three: repairs for filings whose declared dates leave the
/// duration context unresolved. Three strategies, in order, each skipped
/// once a period start date exists:
///
/// 1. derive/validate the fiscal-year focus and reconstruct the end date;
/// 2. take the end date embedded in the instance file name;
/// 3. the known-bad-filing override table.
fn self_heal(
    doc: &InstanceDocument,
    document_type: &DocumentType,
    cik: Option<&str>,
    file_name: Option<&str>,
    res: &mut Resolution,
) {
    // Sometimes the fiscal year focus is just not there
    if res.fiscal_year_focus.is_none() {
        if let Some(end) = res.period_end {
            res.fiscal_year_focus = Some(heal::derive_fiscal_year_focus(end));
        }
    }

    // Sometimes the period end date has the wrong year
    if res.period_start.is_none() {
        if let (Some(end), Some(focus)) = (res.period_end, res.fiscal_year_focus) {
            let corrected = heal::check_end_date(end, focus);
            if corrected != end {
                res.period_end = Some(corrected);
                rerun_duration(doc, document_type, corrected, res);
            }
        }
    }

    // Sometimes the wrong day or month was filed; the filename knows better
    if res.period_start.is_none() {
        if let Some(end) = file_name.and_then(heal::filename_period_end) {
            log::debug!("trying filename-derived period end {}", end);
            res.period_end = Some(end);
            rerun_duration(doc, document_type, end, res);
        }
    }

    // Last resort: filings known to be broken beyond general repair
    if res.period_start.is_none() {
        let row = cik
            .zip(res.fiscal_year_focus)
            .and_then(|(cik, focus)| heal::lookup_known_bad(cik, focus, document_type));
        if let Some(row) = row {
            log::warn!(
                "applying known-bad-filing override for CIK {} FY{}",
                row.cik,
                row.fiscal_year_focus
            );
            if let Some(choice) =
                context::resolve_duration(doc, document_type, row.lookup_end, row.lookup_end)
            {
                res.duration_context = Some(choice.id);
            }
            res.period_start = Some(row.corrected_start);
            res.period_end = Some(row.corrected_end);
            res.balance_sheet = Some(row.corrected_balance_sheet);
        }
    }
}

fn rerun_duration(
    doc: &InstanceDocument,
    document_type: &DocumentType,
    end: NaiveDate,
    res: &mut Resolution,
) {
    let bs_date = res.balance_sheet.unwrap_or(end);
    if let Some(choice) = context::resolve_duration(doc, document_type, end, bs_date) {
        apply_duration(res, choice);
    }
}
