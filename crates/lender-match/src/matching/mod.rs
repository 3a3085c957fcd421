//! Lender product matching.
//!
//! Raw catalog records are normalized once per catalog load ([`normalizer`]), then every match
//! call filters the snapshot ([`eligibility`]), ranks what is left ([`scoring`]) and folds the
//! document requirements of the ranked products into one checklist ([`aggregation`]). All four
//! steps are pure; the only shared state is the [`catalog::CatalogStore`], which is replaced
//! whole on reload.

pub mod aggregation;
pub(crate) mod aliases;
pub mod catalog;
pub mod category;
pub mod documents;
pub mod domain;
pub mod eligibility;
pub mod normalizer;
pub mod router;
pub mod scoring;
pub mod service;
pub(crate) mod text;

#[cfg(test)]
mod tests;

pub use aggregation::{aggregate, aggregate_ranked, summarize_categories, CategorySummary};
pub use aliases::CanonicalField;
pub use catalog::{
    CatalogError, CatalogImporter, CatalogSnapshot, CatalogState, CatalogStore, ImportedCatalog,
};
pub use documents::{fallback_documents, DocumentType};
pub use domain::{
    ApplicantRequest, ApplicantRequestPayload, CanonicalProduct, Country, CountryConstraint,
    DocumentRequirement,
};
pub use eligibility::{assess, filter, is_eligible, Rejection};
pub use normalizer::{
    normalize, normalize_catalog, normalize_with_warnings, NormalizationWarning, Normalized,
    RawProductRecord,
};
pub use router::matching_router;
pub use scoring::{
    score, Criterion, KeywordPurposeAlignment, MatchResult, PurposeAlignment,
    RecommendationLevel, ScoreComponent, ScoringEngine,
};
pub use service::{CatalogStatus, LoadReport, MatchReport, MatchingService, RecordWarning};

use serde::Serialize;

/// Request rejected before any product is looked at.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error("amount must be greater than zero, got {amount}")]
    NonPositiveAmount { amount: f64 },
    #[error("amount is required")]
    MissingAmount,
    #[error("country is required")]
    MissingCountry,
    #[error("unsupported country {value:?}; expected US or CA")]
    UnsupportedCountry { value: String },
}

/// Ranked products and the merged document checklist for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub ranked: Vec<MatchResult>,
    pub required_documents: Vec<DocumentRequirement>,
}

/// Normalizes `catalog`, then filters, scores and aggregates against `request`.
///
/// Malformed records are normalized to safe defaults; only an invalid request is an error.
pub fn match_and_aggregate(
    catalog: &[RawProductRecord],
    request: &ApplicantRequest,
) -> Result<MatchOutcome, MatchError> {
    request.validate()?;
    let products: Vec<CanonicalProduct> = normalize_catalog(catalog)
        .into_iter()
        .map(|normalized| normalized.product)
        .collect();
    Ok(match_catalog(&products, request, &ScoringEngine::default()))
}

/// Matching over an already-normalized catalog. Expects a validated request.
pub(crate) fn match_catalog(
    products: &[CanonicalProduct],
    request: &ApplicantRequest,
    engine: &ScoringEngine,
) -> MatchOutcome {
    let eligible = eligibility::filter(products, request);
    let ranked = engine.score(&eligible, request);
    let required_documents = aggregation::aggregate_ranked(&ranked);
    MatchOutcome {
        ranked,
        required_documents,
    }
}
