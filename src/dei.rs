use crate::doctype::DocumentType;
use crate::document::InstanceDocument;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Document & Entity Information scalars, as filed.
///
/// These are flat one-to-one tag lookups with no decision logic; the
/// resolver works from copies of `document_type`, `period_end_date`, and
/// `fiscal_year_focus` so that self-healing corrections never clobber the
/// as-filed values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dei {
    pub amendment_flag: Option<bool>,
    pub fiscal_year_end: Option<String>,
    pub fiscal_period_focus: Option<String>,
    pub fiscal_year_focus: Option<i32>,
    pub period_end_date: Option<NaiveDate>,
    pub document_type: Option<DocumentType>,
    pub cik: Option<String>,
    pub current_reporting_status: Option<bool>,
    pub filer_category: Option<String>,
    pub registrant_name: Option<String>,
    pub voluntary_filers: Option<bool>,
    pub well_known_issuer: Option<bool>,
    pub shell_company: Option<bool>,
    pub small_business: Option<bool>,
    pub trading_symbols: Option<Vec<String>>,
}

/// SEC boolean fields are filed as Yes/No (occasionally true/false).
fn parse_flag(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "yes" | "true")
}

/// Extracts the DEI fields from a parsed instance document.
///
/// Dispatch is an exact match on the qualified tag name. Substring
/// containment would be shorter but collides once one field name is a
/// prefix of another (e.g. a hypothetical `EntityFilerCategoryExtended`).
pub fn extract(doc: &InstanceDocument) -> Dei {
    let mut dei = Dei::default();

    for fact in doc.dei_facts() {
        let text = fact.value.as_str();
        match fact.concept.as_str() {
            "dei:AmendmentFlag" => dei.amendment_flag = Some(parse_flag(text)),
            "dei:CurrentFiscalYearEndDate" => {
                dei.fiscal_year_end = Some(text.to_string());
            }
            "dei:DocumentFiscalPeriodFocus" => {
                dei.fiscal_period_focus = Some(text.to_string());
            }
            "dei:DocumentFiscalYearFocus" => match text.parse::<i32>() {
                Ok(year) => dei.fiscal_year_focus = Some(year),
                Err(_) => log::warn!("unparseable fiscal year focus: {:?}", text),
            },
            "dei:DocumentPeriodEndDate" => {
                match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                    Ok(date) => dei.period_end_date = Some(date),
                    Err(_) => log::warn!("unparseable period end date: {:?}", text),
                }
            }
            "dei:DocumentType" => {
                // Infallible: unknown forms pass through as Other
                dei.document_type = DocumentType::from_str(text).ok();
            }
            "dei:EntityCentralIndexKey" => dei.cik = Some(text.to_string()),
            "dei:EntityCurrentReportingStatus" => {
                dei.current_reporting_status = Some(parse_flag(text));
            }
            "dei:EntityFilerCategory" => dei.filer_category = Some(text.to_string()),
            "dei:EntityRegistrantName" => dei.registrant_name = Some(text.to_string()),
            "dei:EntityVoluntaryFilers" => dei.voluntary_filers = Some(parse_flag(text)),
            "dei:EntityWellKnownSeasonedIssuer" => {
                dei.well_known_issuer = Some(parse_flag(text));
            }
            "dei:EntityShellCompany" => dei.shell_company = Some(parse_flag(text)),
            "dei:EntitySmallBusiness" => dei.small_business = Some(parse_flag(text)),
            "dei:TradingSymbol" => {
                dei.trading_symbols =
                    Some(text.split(", ").map(str::to_string).collect());
            }
            _ => {}
        }
    }

    dei
}
