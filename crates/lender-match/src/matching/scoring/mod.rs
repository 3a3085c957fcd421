mod policy;
mod purpose;
mod rules;

pub use policy::RecommendationLevel;
pub use purpose::{KeywordPurposeAlignment, PurposeAlignment};
pub use rules::{
    AMOUNT_COMFORT_POINTS, CATEGORY_MATCH_POINTS, COUNTRY_MATCH_POINTS, PURPOSE_ALIGNMENT_POINTS,
};

use super::domain::{ApplicantRequest, CanonicalProduct};
use serde::{Deserialize, Serialize};

/// Stateless scorer over an already-eligible product set.
pub struct ScoringEngine {
    purpose: Box<dyn PurposeAlignment>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_purpose_alignment(KeywordPurposeAlignment)
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_purpose_alignment<P>(purpose: P) -> Self
    where
        P: PurposeAlignment + 'static,
    {
        Self {
            purpose: Box::new(purpose),
        }
    }

    pub fn score_product(
        &self,
        product: &CanonicalProduct,
        request: &ApplicantRequest,
    ) -> MatchResult {
        let (components, score) = rules::score_components(product, request, self.purpose.as_ref());

        MatchResult {
            product: product.clone(),
            score,
            level: RecommendationLevel::from_score(score),
            components,
        }
    }

    /// Scores every product and ranks the results. Nothing is dropped.
    pub fn score(
        &self,
        products: &[CanonicalProduct],
        request: &ApplicantRequest,
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = products
            .iter()
            .map(|product| self.score_product(product, request))
            .collect();
        policy::rank(&mut results);
        results
    }
}

/// Scores with the default keyword purpose heuristic.
pub fn score(products: &[CanonicalProduct], request: &ApplicantRequest) -> Vec<MatchResult> {
    ScoringEngine::default().score(products, request)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    CountryMatch,
    CategoryMatch,
    AmountComfort,
    PurposeAlignment,
}

/// Points awarded for one criterion, kept so a ranking can be explained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub criterion: Criterion,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub product: CanonicalProduct,
    pub score: f64,
    pub level: RecommendationLevel,
    pub components: Vec<ScoreComponent>,
}
