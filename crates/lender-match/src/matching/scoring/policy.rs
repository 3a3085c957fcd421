use super::MatchResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Coarse banding of a match score for product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    Excellent,
    Good,
    Fair,
}

impl RecommendationLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RecommendationLevel::Excellent
        } else if score >= 50.0 {
            RecommendationLevel::Good
        } else {
            RecommendationLevel::Fair
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RecommendationLevel::Excellent => "excellent",
            RecommendationLevel::Good => "good",
            RecommendationLevel::Fair => "fair",
        }
    }
}

/// Descending score; ties by lender name, then product name, then id.
pub(crate) fn rank(results: &mut [MatchResult]) {
    results.sort_by(ranking_order);
}

fn ranking_order(left: &MatchResult, right: &MatchResult) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| left.product.lender_name.cmp(&right.product.lender_name))
        .then_with(|| left.product.name.cmp(&right.product.name))
        .then_with(|| left.product.id.cmp(&right.product.id))
}
