use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Namespace URIs that get a canonical prefix even when the document binds
/// them as the default (unprefixed) namespace, which would otherwise make
/// their facts unaddressable by qualified name.
const WELL_KNOWN_NAMESPACES: &[(&str, &str)] = &[
    ("http://www.xbrl.org/2003/instance", "xbrli"),
    ("http://fasb.org/us-gaap", "us-gaap"),
    ("http://xbrl.sec.gov/dei", "dei"),
    ("http://www.xbrl.org/2003/iso4217", "iso4217"),
];

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses runs of whitespace (filings wrap dates and values across lines).
fn normalize_space(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").to_string()
}

/// The time period a context declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Instant(NaiveDate),
    Duration { start: NaiveDate, end: NaiveDate },
}

/// One candidate reporting-period descriptor from the instance document.
///
/// `dimensional` marks contexts carrying a disaggregating dimension (a
/// `segment` descendant); those are never eligible as the current period.
#[derive(Clone, Debug)]
pub struct ContextDescriptor {
    pub id: String,
    pub period: Period,
    pub dimensional: bool,
}

/// One reported value, tied to a concept and a context.
#[derive(Clone, Debug)]
pub struct Fact {
    /// Prefix-qualified concept name, e.g. `us-gaap:Assets`.
    pub concept: String,
    pub context_ref: String,
    pub unit_ref: Option<String>,
    /// Raw `decimals` attribute; see [`crate::facts::Precision`].
    pub decimals: Option<String>,
    /// Set when `xsi:nil="true"` declares an explicit non-disclosure.
    pub nil: bool,
    pub value: String,
}

/// An XBRL instance document parsed into owned context, fact, and unit
/// tables. Immutable after load; every query is a pure read.
#[derive(Debug, Default)]
pub struct InstanceDocument {
    contexts: Vec<ContextDescriptor>,
    facts: Vec<Fact>,
    units: HashMap<String, String>,
}

impl InstanceDocument {
    pub fn parse(raw: &str) -> Result<Self> {
        let tree = roxmltree::Document::parse(raw)
            .map_err(|e| anyhow!("malformed instance document: {}", e))?;

        let mut contexts = Vec::new();
        let mut facts = Vec::new();
        let mut units = HashMap::new();

        let elements = tree
            .root_element()
            .children()
            .filter(|e| e.node_type() == roxmltree::NodeType::Element);

        let non_fact = ["context", "unit", "schemaRef"];

        for child in elements {
            match child.tag_name().name() {
                "context" => {
                    if let Some(ctx) = parse_context(&child) {
                        contexts.push(ctx);
                    }
                }
                "unit" => {
                    let id = child.attribute("id").unwrap_or("");
                    let measure = child
                        .descendants()
                        .find(|e| e.tag_name().name() == "measure")
                        .and_then(|m| m.text());
                    if let Some(measure) = measure {
                        units.insert(id.to_string(), normalize_space(measure));
                    }
                }
                name if !non_fact.contains(&name) => {
                    if let Some(fact) = parse_fact(&child) {
                        facts.push(fact);
                    }
                }
                _ => {}
            }
        }

        log::debug!(
            "parsed instance document: {} contexts, {} facts, {} units",
            contexts.len(),
            facts.len(),
            units.len()
        );

        Ok(InstanceDocument {
            contexts,
            facts,
            units,
        })
    }

    pub fn contexts(&self) -> &[ContextDescriptor] {
        &self.contexts
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// All non-dimensional instant contexts, in document order.
    pub fn instant_contexts(&self) -> impl Iterator<Item = (&str, NaiveDate)> + '_ {
        self.contexts
            .iter()
            .filter(|c| !c.dimensional)
            .filter_map(|c| match c.period {
                Period::Instant(date) => Some((c.id.as_str(), date)),
                Period::Duration { .. } => None,
            })
    }

    /// Non-dimensional instant contexts declared exactly on `date`.
    pub fn instant_contexts_on(&self, date: NaiveDate) -> impl Iterator<Item = &str> + '_ {
        self.instant_contexts()
            .filter(move |&(_, d)| d == date)
            .map(|(id, _)| id)
    }

    /// Non-dimensional duration contexts ending exactly on `end`, yielding
    /// each context's id and start date in document order.
    pub fn duration_contexts_ending(
        &self,
        end: NaiveDate,
    ) -> impl Iterator<Item = (&str, NaiveDate)> + '_ {
        self.contexts
            .iter()
            .filter(|c| !c.dimensional)
            .filter_map(move |c| match c.period {
                Period::Duration { start, end: e } if e == end => {
                    Some((c.id.as_str(), start))
                }
                _ => None,
            })
    }

    /// First fact in document order matching a qualified concept name and
    /// context reference.
    pub fn fact(&self, concept: &str, context_ref: &str) -> Option<&Fact> {
        self.facts
            .iter()
            .find(|f| f.concept == concept && f.context_ref == context_ref)
    }

    /// Facts from the Document & Entity Information namespace.
    pub fn dei_facts(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.facts.iter().filter(|f| f.concept.starts_with("dei:"))
    }

    /// The measure string of a unit definition, if the unit exists.
    pub fn unit_measure(&self, unit_id: &str) -> Option<&str> {
        self.units.get(unit_id).map(String::as_str)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&normalize_space(raw), "%Y-%m-%d").ok()
}

fn parse_context(node: &roxmltree::Node) -> Option<ContextDescriptor> {
    let id = node.attribute("id")?.to_string();

    let dimensional = node
        .descendants()
        .any(|e| e.tag_name().name() == "segment");

    let period = node
        .children()
        .find(|e| e.tag_name().name() == "period")?;

    let text_of = |name: &str| -> Option<NaiveDate> {
        period
            .descendants()
            .find(|e| e.tag_name().name() == name)
            .and_then(|e| e.text())
            .and_then(parse_date)
    };

    let period = if let Some(instant) = text_of("instant") {
        Period::Instant(instant)
    } else if let (Some(start), Some(end)) = (text_of("startDate"), text_of("endDate")) {
        Period::Duration { start, end }
    } else {
        log::warn!("context {} has no usable period, skipping", id);
        return None;
    };

    Some(ContextDescriptor {
        id,
        period,
        dimensional,
    })
}

fn parse_fact(node: &roxmltree::Node) -> Option<Fact> {
    let namespace = node.tag_name().namespace()?;
    let name = node.tag_name().name();

    // Prefer the document's own prefix; recover a canonical one when the
    // namespace is bound as the default namespace.
    let prefix = node
        .lookup_prefix(namespace)
        .filter(|p| !p.is_empty())
        .or_else(|| {
            WELL_KNOWN_NAMESPACES
                .iter()
                .find(|(uri, _)| namespace.starts_with(uri))
                .map(|&(_, prefix)| prefix)
        })?;

    let context_ref = node.attribute("contextRef")?;

    let nil = node
        .attribute((XSI_NS, "nil"))
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Some(Fact {
        concept: format!("{}:{}", prefix, name),
        context_ref: context_ref.to_string(),
        unit_ref: node.attribute("unitRef").map(str::to_string),
        decimals: node.attribute("decimals").map(str::to_string),
        nil,
        value: node.text().map(normalize_space).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                    xmlns:us-gaap="http://fasb.org/us-gaap/2015-01-31"
                    xmlns:dei="http://xbrl.sec.gov/dei/2014-01-31"
                    xmlns:xbrldi="http://xbrl.org/2006/xbrldi"
                    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <xbrli:context id="FY2015">
                <xbrli:period>
                    <xbrli:startDate>2015-01-01</xbrli:startDate>
                    <xbrli:endDate>2015-12-31</xbrli:endDate>
                </xbrli:period>
            </xbrli:context>
            <xbrli:context id="AsOf2015">
                <xbrli:period>
                    <xbrli:instant>
                        2015-12-31
                    </xbrli:instant>
                </xbrli:period>
            </xbrli:context>
            <xbrli:context id="AsOf2015_Segment">
                <xbrli:entity>
                    <xbrli:segment>
                        <xbrldi:explicitMember dimension="us-gaap:StatementBusinessSegmentsAxis">us-gaap:RetailMember</xbrldi:explicitMember>
                    </xbrli:segment>
                </xbrli:entity>
                <xbrli:period>
                    <xbrli:instant>2015-12-31</xbrli:instant>
                </xbrli:period>
            </xbrli:context>
            <xbrli:unit id="usd">
                <xbrli:measure>iso4217:USD</xbrli:measure>
            </xbrli:unit>
            <dei:DocumentType contextRef="FY2015">10-K</dei:DocumentType>
            <us-gaap:Assets contextRef="AsOf2015" unitRef="usd" decimals="-6">290000000000</us-gaap:Assets>
            <us-gaap:Cash contextRef="AsOf2015" unitRef="usd" xsi:nil="true"/>
        </xbrli:xbrl>
    "#;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parses_contexts_facts_and_units() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.contexts().len(), 3);
        assert_eq!(doc.facts().len(), 3);
        assert_eq!(doc.unit_measure("usd"), Some("iso4217:USD"));
        assert_eq!(doc.unit_measure("eur"), None);
    }

    #[test]
    fn test_dimensional_contexts_are_flagged() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let segmented = doc
            .contexts()
            .iter()
            .find(|c| c.id == "AsOf2015_Segment")
            .unwrap();
        assert!(segmented.dimensional);

        // The dimensionless query must skip it even though the date matches
        let ids: Vec<&str> = doc.instant_contexts_on(date("2015-12-31")).collect();
        assert_eq!(ids, vec!["AsOf2015"]);
    }

    #[test]
    fn test_instant_date_whitespace_is_normalized() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let instants: Vec<_> = doc.instant_contexts().collect();
        assert!(instants.contains(&("AsOf2015", date("2015-12-31"))));
    }

    #[test]
    fn test_duration_contexts_ending() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let durations: Vec<_> = doc.duration_contexts_ending(date("2015-12-31")).collect();
        assert_eq!(durations, vec![("FY2015", date("2015-01-01"))]);
        assert_eq!(doc.duration_contexts_ending(date("2014-12-31")).count(), 0);
    }

    #[test]
    fn test_fact_lookup_and_nil_flag() {
        let doc = InstanceDocument::parse(SAMPLE).unwrap();
        let assets = doc.fact("us-gaap:Assets", "AsOf2015").unwrap();
        assert_eq!(assets.value, "290000000000");
        assert_eq!(assets.decimals.as_deref(), Some("-6"));
        assert!(!assets.nil);

        let cash = doc.fact("us-gaap:Cash", "AsOf2015").unwrap();
        assert!(cash.nil);

        assert!(doc.fact("us-gaap:Assets", "FY2015").is_none());
    }

    #[test]
    fn test_default_namespace_facts_get_canonical_prefix() {
        let xml = r#"
            <xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                        xmlns="http://fasb.org/us-gaap/2015-01-31">
                <xbrli:context id="AsOf">
                    <xbrli:period><xbrli:instant>2015-12-31</xbrli:instant></xbrli:period>
                </xbrli:context>
                <Assets contextRef="AsOf">100</Assets>
            </xbrli:xbrl>
        "#;
        let doc = InstanceDocument::parse(xml).unwrap();
        assert!(doc.fact("us-gaap:Assets", "AsOf").is_some());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(InstanceDocument::parse("<xbrl><context").is_err());
    }
}
