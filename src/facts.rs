use crate::document::InstanceDocument;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// What the fact's `decimals` attribute says about rounding.
///
/// This is metadata about the reported figure, never a transformation
/// applied to it: `Digits(-6)` means the filer rounded to millions, but
/// the extracted value is still exactly what was filed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Precision {
    /// `decimals="INF"`: an exact figure.
    Exact,
    /// Rounded to this many places right of the decimal point (negative
    /// means places left of it).
    Digits(i32),
    /// No `decimals` attribute, or one that does not parse.
    Unspecified,
}

impl Precision {
    pub fn from_attr(raw: Option<&str>) -> Precision {
        match raw.map(str::trim) {
            None => Precision::Unspecified,
            Some("INF") => Precision::Exact,
            Some(s) => s
                .parse::<i32>()
                .map(Precision::Digits)
                .unwrap_or(Precision::Unspecified),
        }
    }
}

/// An extracted concept value together with its precision metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConceptValue {
    pub value: Decimal,
    pub precision: Precision,
}

/// Looks up a concept under a specific context and returns its value with
/// precision metadata, or `None` if the entity did not file it there.
///
/// A fact marked `xsi:nil="true"` is a declared non-disclosure and maps to
/// exact zero by policy, regardless of any raw text. Everything else is
/// parsed as an arbitrary-precision decimal, never a binary float, so
/// cent-level figures with 15+ significant digits survive intact.
pub fn concept_value(
    doc: &InstanceDocument,
    concept: &str,
    context_ref: &str,
) -> Option<ConceptValue> {
    let fact = doc.fact(concept, context_ref)?;
    let precision = Precision::from_attr(fact.decimals.as_deref());

    if fact.nil {
        return Some(ConceptValue {
            value: Decimal::ZERO,
            precision,
        });
    }

    match Decimal::from_str(fact.value.trim()) {
        Ok(value) => Some(ConceptValue { value, precision }),
        Err(err) => {
            log::warn!(
                "unparseable value for {} in context {}: {:?} ({})",
                concept,
                context_ref,
                fact.value,
                err
            );
            None
        }
    }
}

/// The plain decimal value of a concept, or `None` when absent. Absence is
/// distinct from zero; zero only ever comes from an explicit nil.
pub fn extract_concept(
    doc: &InstanceDocument,
    concept: &str,
    context_ref: &str,
) -> Option<Decimal> {
    concept_value(doc, concept, context_ref).map(|cv| cv.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                    xmlns:us-gaap="http://fasb.org/us-gaap/2015-01-31"
                    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <xbrli:context id="AsOf">
                <xbrli:period><xbrli:instant>2015-12-31</xbrli:instant></xbrli:period>
            </xbrli:context>
            <xbrli:context id="PriorYear">
                <xbrli:period><xbrli:instant>2014-12-31</xbrli:instant></xbrli:period>
            </xbrli:context>
            <us-gaap:Assets contextRef="AsOf" decimals="-6">290479000000</us-gaap:Assets>
            <us-gaap:Assets contextRef="PriorYear" decimals="-6">231839000000</us-gaap:Assets>
            <us-gaap:EarningsPerShareDiluted contextRef="AsOf" decimals="2">9.22</us-gaap:EarningsPerShareDiluted>
            <us-gaap:Cash contextRef="AsOf" xsi:nil="true">ignored</us-gaap:Cash>
            <us-gaap:CommitmentsAndContingencies contextRef="AsOf" decimals="INF">123456789012345.67</us-gaap:CommitmentsAndContingencies>
            <us-gaap:Goodwill contextRef="AsOf">not a number</us-gaap:Goodwill>
        </xbrli:xbrl>
    "#;

    #[test]
    fn test_value_follows_context() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        assert_eq!(
            extract_concept(&doc, "us-gaap:Assets", "AsOf"),
            Some(Decimal::from_str("290479000000").unwrap())
        );
        assert_eq!(
            extract_concept(&doc, "us-gaap:Assets", "PriorYear"),
            Some(Decimal::from_str("231839000000").unwrap())
        );
    }

    #[test]
    fn test_nil_fact_is_exact_zero() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let cv = concept_value(&doc, "us-gaap:Cash", "AsOf").unwrap();
        assert_eq!(cv.value, Decimal::ZERO);
    }

    #[test]
    fn test_absent_concept_is_none_not_zero() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        assert_eq!(extract_concept(&doc, "us-gaap:Liabilities", "AsOf"), None);
        // Also absent when the context does not match
        assert_eq!(extract_concept(&doc, "us-gaap:Cash", "NoSuchContext"), None);
    }

    #[test]
    fn test_high_precision_value_survives() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let cv =
            concept_value(&doc, "us-gaap:CommitmentsAndContingencies", "AsOf").unwrap();
        assert_eq!(cv.value.to_string(), "123456789012345.67");
        assert_eq!(cv.precision, Precision::Exact);
    }

    #[test]
    fn test_precision_markers() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        assert_eq!(
            concept_value(&doc, "us-gaap:Assets", "AsOf").unwrap().precision,
            Precision::Digits(-6)
        );
        assert_eq!(
            concept_value(&doc, "us-gaap:EarningsPerShareDiluted", "AsOf")
                .unwrap()
                .precision,
            Precision::Digits(2)
        );
        assert_eq!(Precision::from_attr(None), Precision::Unspecified);
        assert_eq!(Precision::from_attr(Some("INF")), Precision::Exact);
        assert_eq!(Precision::from_attr(Some("junk")), Precision::Unspecified);
    }

    #[test]
    fn test_unparseable_text_degrades_to_absence() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        assert_eq!(extract_concept(&doc, "us-gaap:Goodwill", "AsOf"), None);
    }
}
