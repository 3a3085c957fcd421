//! Category families.
//!
//! Catalog categories are free text. Matching compares families: the normalized label with
//! underscores and hyphens read as spaces, a trailing plural `s` dropped, and known historical
//! spellings of the same family folded together. Distinct families are never merged.

use super::text::{normalize_label, singular};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const INVOICE_FACTORING: &str = "invoice factoring";

const FAMILY_ALIASES: &[(&str, &str)] = &[
    ("line of credit", "business line of credit"),
    ("lines of credit", "business line of credit"),
    ("business lines of credit", "business line of credit"),
    ("credit line", "business line of credit"),
    ("revolving credit", "business line of credit"),
    ("loc", "business line of credit"),
    ("factoring", INVOICE_FACTORING),
    ("invoice financing", INVOICE_FACTORING),
    ("accounts receivable financing", INVOICE_FACTORING),
    ("ar financing", INVOICE_FACTORING),
    ("equipment finance", "equipment financing"),
    ("equipment loan", "equipment financing"),
    ("equipment leasing", "equipment financing"),
    ("working capital loan", "working capital"),
    ("working capital financing", "working capital"),
    ("business working capital", "working capital"),
    ("business term loan", "term loan"),
    ("commercial term loan", "term loan"),
    ("po financing", "purchase order financing"),
    ("purchase order finance", "purchase order financing"),
    ("abl", "asset based lending"),
    ("asset based loan", "asset based lending"),
];

static FAMILY_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

fn family_alias_map() -> &'static HashMap<String, &'static str> {
    FAMILY_ALIAS_MAP.get_or_init(|| {
        FAMILY_ALIASES
            .iter()
            .map(|(alias, family)| (base_form(alias), *family))
            .collect()
    })
}

fn base_form(category: &str) -> String {
    let spaced = normalize_label(&category.replace(['_', '-'], " "));
    singular(&spaced).to_string()
}

/// Family key for a category label.
pub fn family_of(category: &str) -> String {
    let base = base_form(category);
    match family_alias_map().get(&base) {
        Some(family) => (*family).to_string(),
        None => base,
    }
}

pub fn same_family(left: &str, right: &str) -> bool {
    let left = family_of(left);
    !left.is_empty() && left == family_of(right)
}

pub fn is_invoice_factoring(category: &str) -> bool {
    family_of(category) == INVOICE_FACTORING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_and_case_variants_share_a_family() {
        assert!(same_family("Term Loans", "term loan"));
        assert!(same_family("Working Capital", "working capital"));
        assert!(same_family("term_loan", "Term Loan"));
        assert!(same_family("Asset-Based Lending", "asset based lending"));
    }

    #[test]
    fn distinct_families_stay_distinct() {
        assert!(!same_family("Working Capital", "Business Line of Credit"));
        assert!(!same_family("Working Capital", "Term Loan"));
        assert!(!same_family("Equipment Financing", "Invoice Factoring"));
    }

    #[test]
    fn historical_spellings_fold_into_their_family() {
        assert_eq!(family_of("Line of Credit"), "business line of credit");
        assert_eq!(family_of("Business Lines of Credit"), "business line of credit");
        assert_eq!(family_of("Factoring"), INVOICE_FACTORING);
        assert_eq!(family_of("Equipment Finance"), "equipment financing");
        assert!(is_invoice_factoring("invoice_factoring"));
    }

    #[test]
    fn blank_categories_never_match() {
        assert!(!same_family("", ""));
        assert!(!same_family("  ", "Term Loan"));
    }
}
