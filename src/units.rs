use crate::document::InstanceDocument;

/// Sentinel for a unit or currency that could not be determined.
pub const NOT_SPECIFIED: &str = "not specified";

/// Common balance-sheet concepts probed to discover the reporting
/// currency. Ordered for exhaustiveness, not ranking: the first one the
/// filer actually reported under the current instant context wins.
pub const COMMON_BALANCE_SHEET_CONCEPTS: &[&str] = &[
    "us-gaap:Assets",
    "us-gaap:AssetsCurrent",
    "us-gaap:AssetsNoncurrent",
    "us-gaap:CashAndCashEquivalentsAtCarryingValue",
    "us-gaap:Cash",
    "us-gaap:CashAndDueFromBanks",
    "us-gaap:CashCashEquivalentsAndShortTermInvestments",
    "us-gaap:ShortTermInvestments",
    "us-gaap:MarketableSecuritiesCurrent",
    "us-gaap:AvailableForSaleSecuritiesCurrent",
    "us-gaap:CashEquivalentsAtCarryingValue",
    "us-gaap:OtherShortTermInvestments",
    "us-gaap:TradingSecurities",
    "us-gaap:TradingSecuritiesCurrent",
    "us-gaap:AccountsNotesAndLoansReceivableNetCurrent",
    "us-gaap:AccountsReceivableNetCurrent",
    "us-gaap:AccountsReceivableNet",
    "us-gaap:NontradeReceivablesCurrent",
    "us-gaap:NotesAndLoansReceivableNetCurrent",
    "us-gaap:NotesReceivableNet",
    "us-gaap:OtherReceivablesNetCurrent",
    "us-gaap:PremiumsAndOtherReceivablesNet",
    "us-gaap:OtherReceivables",
    "us-gaap:ReceivablesNetCurrent",
    "us-gaap:InventoryNet",
    "us-gaap:InventoryFinishedGoodsNetOfReserves",
    "us-gaap:InventoryFinishedGoodsAndWorkInProgress",
    "us-gaap:Goodwill",
    "us-gaap:PropertyPlantAndEquipmentNet",
    "us-gaap:AccountsPayableCurrent",
    "us-gaap:AccountsPayableCurrentAndNoncurrent",
    "us-gaap:ShortTermBorrowings",
    "us-gaap:CommercialPaper",
    "us-gaap:LongTermDebtCurrent",
    "us-gaap:DebtCurrent",
    "us-gaap:LongTermDebt",
    "us-gaap:Liabilities",
    "us-gaap:LiabilitiesCurrent",
    "us-gaap:StockholdersEquity",
    "us-gaap:AssetsNet",
];

/// Translates a fact's unitRef into its measure.
///
/// ISO 4217 measures (`iso4217:USD`) come back as the bare lowercased
/// currency code; anything else (`shares`, `pure`, custom measures) comes
/// back verbatim. An undefined unit id yields the sentinel.
pub fn decode_unit(doc: &InstanceDocument, unit_id: &str) -> String {
    let Some(measure) = doc.unit_measure(unit_id) else {
        return NOT_SPECIFIED.to_string();
    };
    match measure.split_once(':') {
        Some(("iso4217", code)) => code.to_lowercase(),
        _ => measure.to_string(),
    }
}

/// Discovers the filing's reporting currency by probing common
/// balance-sheet concepts under the resolved instant context.
pub fn resolve_currency(doc: &InstanceDocument, instant_context: Option<&str>) -> String {
    let Some(context) = instant_context else {
        return NOT_SPECIFIED.to_string();
    };

    for concept in COMMON_BALANCE_SHEET_CONCEPTS {
        if let Some(fact) = doc.fact(concept, context) {
            if let Some(unit_ref) = &fact.unit_ref {
                log::debug!("currency probe hit: {} (unit {})", concept, unit_ref);
                return decode_unit(doc, unit_ref);
            }
        }
    }

    NOT_SPECIFIED.to_string()
}
