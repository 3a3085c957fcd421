use super::super::category;
use super::super::domain::CanonicalProduct;
use super::super::text::{normalize_label, singular, words};
use std::collections::HashSet;

/// Scores how well a product suits the applicant's stated use of funds.
pub trait PurposeAlignment: Send + Sync {
    /// Alignment in `[0, 1]`; values outside are clamped by the caller.
    fn alignment(&self, purpose: &str, product: &CanonicalProduct) -> f64;
}

/// Uses of funds the intake form offers, with the families that suit them.
const PURPOSE_FAMILIES: &[(&str, &[&str])] = &[
    ("equipment", &["equipment financing"]),
    (
        "business expansion",
        &[
            "business line of credit",
            category::INVOICE_FACTORING,
            "working capital",
            "term loan",
        ],
    ),
    (
        "working capital",
        &["business line of credit", "working capital", "term loan"],
    ),
    (
        "inventory",
        &[
            "business line of credit",
            category::INVOICE_FACTORING,
            "purchase order financing",
            "term loan",
            "working capital",
        ],
    ),
    (
        "marketing",
        &["business line of credit", "term loan", "working capital"],
    ),
    (
        "debt consolidation",
        &[
            "business line of credit",
            category::INVOICE_FACTORING,
            "term loan",
            "working capital",
        ],
    ),
];

const STOPWORDS: &[&str] = &[
    "and", "for", "the", "our", "with", "new", "buy", "use", "fund", "funds", "need", "into",
    "from", "some", "more",
];

/// Half family fit for recognised purposes, half keyword overlap with the product text.
/// Free-text purposes without a known family score on keywords alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPurposeAlignment;

impl PurposeAlignment for KeywordPurposeAlignment {
    fn alignment(&self, purpose: &str, product: &CanonicalProduct) -> f64 {
        let purpose_key = normalize_label(&purpose.replace(['_', '-'], " "));
        let keyword_share = keyword_share(&purpose_key, product);

        match suited_families(&purpose_key) {
            Some(families) => {
                let family = category::family_of(&product.category);
                let family_fit = if families.contains(&family.as_str()) {
                    1.0
                } else {
                    0.0
                };
                0.5 * family_fit + 0.5 * keyword_share
            }
            None => keyword_share,
        }
    }
}

fn suited_families(purpose_key: &str) -> Option<&'static [&'static str]> {
    PURPOSE_FAMILIES
        .iter()
        .find(|(purpose, _)| *purpose == purpose_key)
        .map(|(_, families)| *families)
}

fn keyword_share(purpose_key: &str, product: &CanonicalProduct) -> f64 {
    let keywords: Vec<String> = words(purpose_key, 3)
        .into_iter()
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect();
    if keywords.is_empty() {
        return 0.0;
    }

    let haystack = format!(
        "{} {} {}",
        product.category,
        product.name,
        product.description.as_deref().unwrap_or_default()
    );
    let product_words: HashSet<String> = words(&haystack, 3)
        .iter()
        .map(|word| singular(word).to_string())
        .collect();

    let matched = keywords
        .iter()
        .filter(|word| product_words.contains(singular(word)))
        .count();
    matched as f64 / keywords.len() as f64
}
