//! Folding per-product document lists into one applicant checklist.

use super::category;
use super::documents;
use super::domain::{CanonicalProduct, DocumentRequirement};
use super::scoring::MatchResult;
use serde::Serialize;
use std::collections::HashMap;

/// Union of every product's requirements, one entry per document key.
///
/// Entries follow first appearance across `products`; each carries the first label seen and the
/// largest quantity any product asked for.
pub fn aggregate(products: &[CanonicalProduct]) -> Vec<DocumentRequirement> {
    fold(products.iter())
}

/// [`aggregate`] over ranked results, so the checklist leads with the best match's documents.
pub fn aggregate_ranked(ranked: &[MatchResult]) -> Vec<DocumentRequirement> {
    fold(ranked.iter().map(|result| &result.product))
}

fn fold<'a>(products: impl Iterator<Item = &'a CanonicalProduct>) -> Vec<DocumentRequirement> {
    let mut merged: Vec<DocumentRequirement> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for requirement in products.flat_map(|product| product.required_documents.iter()) {
        let key = documents::canonical_key(&requirement.key);
        let quantity = requirement.required_quantity.max(1);
        match positions.get(&key) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.required_quantity = existing.required_quantity.max(quantity);
            }
            None => {
                positions.insert(key.clone(), merged.len());
                merged.push(DocumentRequirement {
                    key,
                    label: requirement.label.clone(),
                    required_quantity: quantity,
                });
            }
        }
    }

    merged
}

/// Eligible products grouped by category family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub family: String,
    pub label: String,
    pub product_count: usize,
    pub best_score: f64,
}

/// Families in first-seen order of `ranked`, so the family holding the top match leads.
pub fn summarize_categories(ranked: &[MatchResult]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in ranked {
        let family = category::family_of(&result.product.category);
        match positions.get(&family) {
            Some(&index) => {
                let summary = &mut summaries[index];
                summary.product_count += 1;
                if result.score > summary.best_score {
                    summary.best_score = result.score;
                }
            }
            None => {
                positions.insert(family.clone(), summaries.len());
                summaries.push(CategorySummary {
                    family,
                    label: result.product.category_label.clone(),
                    product_count: 1,
                    best_score: result.score,
                });
            }
        }
    }

    summaries
}
