//! Canonical supporting-document types and the alias table that folds lender wording onto them.

use super::category;
use super::domain::DocumentRequirement;
use super::text::{display_label, normalize_label, slug};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A document type the upload step knows how to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub default_quantity: u32,
}

pub const BANK_STATEMENTS: &str = "bank_statements";
pub const FINANCIAL_STATEMENTS: &str = "account_prepared_financials";
pub const TAX_RETURNS: &str = "tax_returns";

const DOCUMENT_TYPES: &[DocumentType] = &[
    DocumentType {
        key: BANK_STATEMENTS,
        label: "Bank Statements",
        description: "Last six months of business bank statements",
        default_quantity: 6,
    },
    DocumentType {
        key: FINANCIAL_STATEMENTS,
        label: "Accountant Prepared Financial Statements",
        description: "Accountant prepared, compiled or audited financial statements",
        default_quantity: 3,
    },
    DocumentType {
        key: TAX_RETURNS,
        label: "Tax Returns",
        description: "Business tax returns for the last three years",
        default_quantity: 3,
    },
    DocumentType {
        key: "balance_sheet",
        label: "Balance Sheet",
        description: "Current balance sheet showing assets and liabilities",
        default_quantity: 1,
    },
    DocumentType {
        key: "cash_flow_statement",
        label: "Cash Flow Statement",
        description: "Cash flow statement or projections",
        default_quantity: 1,
    },
    DocumentType {
        key: "profit_and_loss",
        label: "Profit & Loss Statement",
        description: "Profit and loss statement for the most recent period",
        default_quantity: 1,
    },
    DocumentType {
        key: "accounts_receivable",
        label: "Accounts Receivable Aging",
        description: "Accounts receivable aging report",
        default_quantity: 1,
    },
    DocumentType {
        key: "accounts_payable",
        label: "Accounts Payable Aging",
        description: "Accounts payable aging report",
        default_quantity: 1,
    },
    DocumentType {
        key: "invoice_samples",
        label: "Invoice Samples",
        description: "Sample customer invoices showing payment terms",
        default_quantity: 1,
    },
    DocumentType {
        key: "equipment_quote",
        label: "Equipment Quote",
        description: "Quote or invoice for the equipment being financed",
        default_quantity: 1,
    },
    DocumentType {
        key: "purchase_orders",
        label: "Purchase Orders",
        description: "Open purchase orders to be financed",
        default_quantity: 1,
    },
    DocumentType {
        key: "supplier_agreement",
        label: "Supplier Agreement",
        description: "Agreements with key suppliers or vendors",
        default_quantity: 1,
    },
    DocumentType {
        key: "business_plan",
        label: "Business Plan",
        description: "Business plan with projections and use of funds",
        default_quantity: 1,
    },
    DocumentType {
        key: "collateral_docs",
        label: "Collateral Documents",
        description: "Valuations or titles for assets offered as security",
        default_quantity: 1,
    },
    DocumentType {
        key: "personal_guarantee",
        label: "Personal Guarantee",
        description: "Signed personal guarantee from the principal owners",
        default_quantity: 1,
    },
    DocumentType {
        key: "void_cheque",
        label: "Void Cheque",
        description: "Void cheque or pre-authorized debit form for payments",
        default_quantity: 1,
    },
    DocumentType {
        key: "drivers_license",
        label: "Driver's License",
        description: "Government issued photo ID, front and back",
        default_quantity: 1,
    },
    DocumentType {
        key: "business_license",
        label: "Business License",
        description: "Business license or registration documents",
        default_quantity: 1,
    },
    DocumentType {
        key: "articles_of_incorporation",
        label: "Articles of Incorporation",
        description: "Articles of incorporation or formation documents",
        default_quantity: 1,
    },
    DocumentType {
        key: "signed_application",
        label: "Signed Application",
        description: "Completed and signed credit application",
        default_quantity: 1,
    },
];

/// Lender wording observed in catalog records, keyed to canonical document keys.
const NAME_TO_KEY: &[(&str, &str)] = &[
    // Bank statements
    ("Bank Statement", BANK_STATEMENTS),
    ("Bank Statements (6 months)", BANK_STATEMENTS),
    ("Business Bank Statements", BANK_STATEMENTS),
    ("Banking Statements", BANK_STATEMENTS),
    ("Bank Account Statements", BANK_STATEMENTS),
    // Financial statements, accountant prepared or personal
    ("Financial Statements", FINANCIAL_STATEMENTS),
    ("Financial Statement", FINANCIAL_STATEMENTS),
    ("Financial Statements (P&L and Balance Sheet)", FINANCIAL_STATEMENTS),
    ("Accountant Prepared Financial Statements", FINANCIAL_STATEMENTS),
    ("Accountant Prepared Financials", FINANCIAL_STATEMENTS),
    ("Accountant Prepared Statements", FINANCIAL_STATEMENTS),
    ("Accountant Financials", FINANCIAL_STATEMENTS),
    ("Audited Financial Statements", FINANCIAL_STATEMENTS),
    ("Audited Financials", FINANCIAL_STATEMENTS),
    ("Compiled Financial Statements", FINANCIAL_STATEMENTS),
    ("Personal Financial Statement", FINANCIAL_STATEMENTS),
    ("Personal Financial Statements", FINANCIAL_STATEMENTS),
    ("Personal Financials", FINANCIAL_STATEMENTS),
    ("Personal Balance Sheet", FINANCIAL_STATEMENTS),
    // Tax returns
    ("Tax Return", TAX_RETURNS),
    ("Business Tax Returns", TAX_RETURNS),
    ("Business Tax Returns (2-3 years)", TAX_RETURNS),
    ("Corporate Tax Returns", TAX_RETURNS),
    ("Tax Returns (2-3 years)", TAX_RETURNS),
    // Profit and loss
    ("P&L Statement", "profit_and_loss"),
    ("PnL Statement", "profit_and_loss"),
    ("Profit and Loss Statement", "profit_and_loss"),
    ("Profit Loss Statement", "profit_and_loss"),
    ("Income Statement", "profit_and_loss"),
    // Receivables and payables
    ("A/R Aging", "accounts_receivable"),
    ("AR Aging", "accounts_receivable"),
    ("AR Report", "accounts_receivable"),
    ("Accounts Receivable", "accounts_receivable"),
    ("Accounts Receivable Aging Report", "accounts_receivable"),
    ("Receivables", "accounts_receivable"),
    ("Customer Receivables", "accounts_receivable"),
    ("A/P Aging", "accounts_payable"),
    ("AP Aging", "accounts_payable"),
    ("Accounts Payable", "accounts_payable"),
    ("Payables", "accounts_payable"),
    ("Payables Report", "accounts_payable"),
    // Invoices
    ("Invoices", "invoice_samples"),
    ("Sample Invoices", "invoice_samples"),
    ("Customer Invoices", "invoice_samples"),
    ("Invoice Samples (90 days)", "invoice_samples"),
    ("Invoice Summary", "invoice_samples"),
    // Equipment
    ("Equipment Invoice", "equipment_quote"),
    ("Equipment Quote or Invoice", "equipment_quote"),
    ("Equipment Specifications", "equipment_quote"),
    // Purchase orders and suppliers
    ("Purchase Order", "purchase_orders"),
    ("PO Documents", "purchase_orders"),
    ("Supplier Contracts", "supplier_agreement"),
    ("Vendor Agreements", "supplier_agreement"),
    // Planning
    ("Business Plan with Use of Funds", "business_plan"),
    ("Business Plan and Projections", "business_plan"),
    ("Financial Projections", "business_plan"),
    ("Cash Flow Projections", "cash_flow_statement"),
    ("Cash Flow Analysis", "cash_flow_statement"),
    ("Statement of Financial Position", "balance_sheet"),
    // Security
    ("Collateral Documentation", "collateral_docs"),
    ("Asset Documentation", "collateral_docs"),
    ("Asset Valuation", "collateral_docs"),
    ("Security Documents", "collateral_docs"),
    ("Personal Guaranty", "personal_guarantee"),
    ("Personal Guarantees", "personal_guarantee"),
    ("Guarantee Form", "personal_guarantee"),
    // Banking details
    ("Void Check", "void_cheque"),
    ("Voided Check", "void_cheque"),
    ("Cancelled Check", "void_cheque"),
    ("Void PAD", "void_cheque"),
    ("Banking Info", "void_cheque"),
    ("Bank Verification", "void_cheque"),
    // Identity and registration
    ("Drivers License", "drivers_license"),
    ("Driver License", "drivers_license"),
    ("Driver's License Front and Back", "drivers_license"),
    ("Drivers License Front Back", "drivers_license"),
    ("Government ID", "drivers_license"),
    ("Proof of Identity", "drivers_license"),
    ("ID Verification", "drivers_license"),
    ("Business Operating License", "business_license"),
    ("Operating License", "business_license"),
    ("Professional License", "business_license"),
    ("Incorporation Documents", "articles_of_incorporation"),
    ("Corporate Formation Documents", "articles_of_incorporation"),
    ("Completed Application", "signed_application"),
    ("Loan Application", "signed_application"),
];

/// Standard checklist per category family, used when nothing in the catalog matches.
const FALLBACK_BY_FAMILY: &[(&str, &[&str])] = &[
    ("working capital", &[BANK_STATEMENTS, FINANCIAL_STATEMENTS, TAX_RETURNS]),
    (
        "term loan",
        &[BANK_STATEMENTS, TAX_RETURNS, FINANCIAL_STATEMENTS, "cash_flow_statement"],
    ),
    (
        "business line of credit",
        &[BANK_STATEMENTS, FINANCIAL_STATEMENTS, TAX_RETURNS],
    ),
    (
        "equipment financing",
        &["equipment_quote", BANK_STATEMENTS, TAX_RETURNS],
    ),
    (
        category::INVOICE_FACTORING,
        &["accounts_receivable", BANK_STATEMENTS, "invoice_samples"],
    ),
    (
        "purchase order financing",
        &["purchase_orders", BANK_STATEMENTS, "supplier_agreement"],
    ),
    (
        "asset based lending",
        &["collateral_docs", BANK_STATEMENTS, FINANCIAL_STATEMENTS],
    ),
];

const DEFAULT_FALLBACK: &[&str] = &[BANK_STATEMENTS, TAX_RETURNS, FINANCIAL_STATEMENTS];

static DOCUMENT_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

fn document_alias_map() -> &'static HashMap<String, &'static str> {
    DOCUMENT_ALIAS_MAP.get_or_init(|| {
        let mut map = HashMap::with_capacity(DOCUMENT_TYPES.len() * 2 + NAME_TO_KEY.len());
        for document in DOCUMENT_TYPES {
            map.insert(lookup_key(document.key), document.key);
            map.insert(lookup_key(document.label), document.key);
        }
        for (name, key) in NAME_TO_KEY {
            map.insert(lookup_key(name), *key);
        }
        map
    })
}

fn lookup_key(name: &str) -> String {
    normalize_label(&name.replace(['_', '-'], " "))
}

fn strip_parenthetical(key: &str) -> Option<&str> {
    let trimmed = key.strip_suffix(')')?;
    let open = trimmed.rfind('(')?;
    Some(trimmed[..open].trim_end())
}

pub fn document_types() -> &'static [DocumentType] {
    DOCUMENT_TYPES
}

pub fn document_type(key: &str) -> Option<&'static DocumentType> {
    DOCUMENT_TYPES.iter().find(|document| document.key == key)
}

/// De-aliased key for a document name or key.
///
/// Unknown names become their own key: lowercase with non-alphanumerics folded to `_`.
pub fn canonical_key(name: &str) -> String {
    let key = lookup_key(name);
    let map = document_alias_map();
    if let Some(canonical) = map.get(&key) {
        return (*canonical).to_string();
    }
    if let Some(canonical) = strip_parenthetical(&key).and_then(|base| map.get(base)) {
        return (*canonical).to_string();
    }
    slug(name, '_')
}

pub fn default_quantity(key: &str) -> u32 {
    document_type(key)
        .map(|document| document.default_quantity)
        .unwrap_or(1)
}

/// Builds a requirement from a lender's wording. Returns `None` for blank names.
///
/// A name that is just the canonical key spelled out takes the catalogue label; any other
/// wording is kept for display.
pub fn requirement(name: &str, quantity: Option<u32>) -> Option<DocumentRequirement> {
    let label = display_label(name);
    if label.is_empty() {
        return None;
    }

    let key = canonical_key(&label);
    let label = match document_type(&key) {
        Some(document) if slug(&label, '_') == key => document.label.to_string(),
        _ => label,
    };
    let required_quantity = quantity
        .filter(|count| *count >= 1)
        .unwrap_or_else(|| default_quantity(&key));

    Some(DocumentRequirement {
        key,
        label,
        required_quantity,
    })
}

/// Standard documents for a category family when no product is eligible.
pub fn fallback_documents(category: &str) -> Vec<DocumentRequirement> {
    let family = category::family_of(category);
    let keys = FALLBACK_BY_FAMILY
        .iter()
        .find(|(candidate, _)| *candidate == family)
        .map(|(_, keys)| *keys)
        .unwrap_or(DEFAULT_FALLBACK);

    keys.iter()
        .filter_map(|key| document_type(key))
        .map(|document| DocumentRequirement {
            key: document.key.to_string(),
            label: document.label.to_string(),
            required_quantity: document.default_quantity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_statement_family_shares_one_key() {
        for name in [
            "Financial Statements",
            "Accountant Prepared Financial Statements",
            "Personal Financial Statement",
            "accountant_prepared_financial_statements",
            "account_prepared_financials",
        ] {
            assert_eq!(canonical_key(name), FINANCIAL_STATEMENTS, "{name}");
        }
    }

    #[test]
    fn tax_return_aliases_share_one_key() {
        assert_eq!(canonical_key("Business Tax Returns"), TAX_RETURNS);
        assert_eq!(canonical_key("Tax Returns"), TAX_RETURNS);
        assert_eq!(canonical_key("tax_returns"), TAX_RETURNS);
    }

    #[test]
    fn bank_statements_stay_distinct() {
        assert_eq!(canonical_key("Bank Statements"), BANK_STATEMENTS);
        assert_eq!(canonical_key("Bank Statements (last 4 months)"), BANK_STATEMENTS);
        assert_ne!(canonical_key("Bank Statements"), FINANCIAL_STATEMENTS);
    }

    #[test]
    fn default_quantities_follow_document_type() {
        assert_eq!(default_quantity(BANK_STATEMENTS), 6);
        assert_eq!(default_quantity(FINANCIAL_STATEMENTS), 3);
        assert_eq!(default_quantity(TAX_RETURNS), 3);
        assert_eq!(default_quantity("void_cheque"), 1);
        assert_eq!(default_quantity("landlord_letter"), 1);
    }

    #[test]
    fn unknown_documents_get_their_own_key() {
        let requirement = requirement("Landlord Waiver Letter", None).expect("requirement");
        assert_eq!(requirement.key, "landlord_waiver_letter");
        assert_eq!(requirement.label, "Landlord Waiver Letter");
        assert_eq!(requirement.required_quantity, 1);
    }

    #[test]
    fn requirement_uses_catalogue_label_for_bare_keys() {
        let from_key = requirement("bank_statements", None).expect("requirement");
        assert_eq!(from_key.label, "Bank Statements");
        assert_eq!(from_key.required_quantity, 6);

        let from_alias = requirement("Audited Financials", Some(2)).expect("requirement");
        assert_eq!(from_alias.key, FINANCIAL_STATEMENTS);
        assert_eq!(from_alias.label, "Audited Financials");
        assert_eq!(from_alias.required_quantity, 2);

        assert!(requirement("   ", None).is_none());
    }

    #[test]
    fn zero_quantity_falls_back_to_default() {
        let requirement = requirement("Tax Returns", Some(0)).expect("requirement");
        assert_eq!(requirement.required_quantity, 3);
    }

    #[test]
    fn fallback_documents_follow_category_family() {
        let keys: Vec<String> = fallback_documents("Equipment Finance")
            .into_iter()
            .map(|document| document.key)
            .collect();
        assert_eq!(keys, vec!["equipment_quote", BANK_STATEMENTS, TAX_RETURNS]);

        let generic = fallback_documents("Something Else");
        assert_eq!(generic.len(), DEFAULT_FALLBACK.len());
    }

    #[test]
    fn every_alias_targets_a_known_document_type() {
        for (name, key) in NAME_TO_KEY {
            assert!(document_type(key).is_some(), "{name} -> {key}");
        }
        for (_, keys) in FALLBACK_BY_FAMILY {
            for key in *keys {
                assert!(document_type(key).is_some(), "{key}");
            }
        }
    }
}
