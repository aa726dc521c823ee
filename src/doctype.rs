use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// The three-way split of SEC form types the context resolver cares about.
///
/// Annual (10-K) and quarterly (10-Q) filings carry an income-statement
/// duration period; everything else only ever resolves an instant context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String")]
pub enum DocumentType {
    Annual,
    Quarterly,
    Other(String),
}

impl TryFrom<String> for DocumentType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DocumentType::from_str(&s)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Annual => write!(f, "10-K"),
            DocumentType::Quarterly => write!(f, "10-Q"),
            DocumentType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<DocumentType, String> {
        match s.trim().to_uppercase().as_str() {
            "10-K" => Ok(DocumentType::Annual),
            "10-Q" => Ok(DocumentType::Quarterly),
            _ => Ok(DocumentType::Other(s.trim().to_string())),
        }
    }
}

pub static PERIODIC_TYPES: Lazy<String> = Lazy::new(|| {
    DocumentType::iter()
        .filter(|t| !matches!(t, DocumentType::Other(_)))
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl DocumentType {
    /// The form types for which a duration context is resolved.
    pub fn list_periodic() -> &'static str {
        &PERIODIC_TYPES
    }
}
