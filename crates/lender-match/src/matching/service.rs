use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::aggregation::{self, CategorySummary};
use super::catalog::{CatalogSnapshot, CatalogState, CatalogStore, ImportedCatalog};
use super::documents;
use super::domain::{ApplicantRequest, DocumentRequirement};
use super::normalizer::{normalize_catalog, NormalizationWarning, RawProductRecord};
use super::scoring::{MatchResult, ScoringEngine};
use super::{match_catalog, MatchError, MatchOutcome};

/// Service composing the catalog store and the scoring engine.
pub struct MatchingService {
    store: Arc<CatalogStore>,
    engine: Arc<ScoringEngine>,
}

impl Default for MatchingService {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingService {
    pub fn new() -> Self {
        Self::with_engine(ScoringEngine::default())
    }

    pub fn with_engine(engine: ScoringEngine) -> Self {
        Self {
            store: Arc::new(CatalogStore::new()),
            engine: Arc::new(engine),
        }
    }

    /// Normalize raw records and install them as the current catalog.
    pub fn load(&self, records: &[RawProductRecord]) -> LoadReport {
        self.install(records, 0)
    }

    /// [`load`](Self::load) for an import, counting the entries the importer skipped.
    pub fn load_imported(&self, imported: &ImportedCatalog) -> LoadReport {
        self.install(&imported.records, imported.skipped_entries)
    }

    fn install(&self, records: &[RawProductRecord], skipped: usize) -> LoadReport {
        let mut products = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();

        for normalized in normalize_catalog(records) {
            warnings.extend(normalized.warnings.into_iter().map(|warning| RecordWarning {
                product_id: normalized.product.id.clone(),
                warning,
            }));
            products.push(normalized.product);
        }

        let snapshot = self.store.replace(products);
        if !warnings.is_empty() {
            info!(
                generation = snapshot.generation,
                warnings = warnings.len(),
                "catalog loaded with normalization warnings"
            );
        }

        LoadReport {
            generation: snapshot.generation,
            state: snapshot.state(),
            received: records.len() + skipped,
            loaded: snapshot.products.len(),
            skipped,
            warnings,
            loaded_at: snapshot.loaded_at,
        }
    }

    pub fn status(&self) -> CatalogStatus {
        CatalogStatus::from(self.store.snapshot().as_ref())
    }

    /// Current catalog products, shared with any reader that holds the same snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.store.snapshot()
    }

    /// Match a request against the current snapshot.
    pub fn match_request(&self, request: &ApplicantRequest) -> Result<MatchReport, MatchError> {
        request.validate()?;
        let snapshot = self.store.snapshot();
        let outcome = match_catalog(&snapshot.products, request, &self.engine);

        debug!(
            generation = snapshot.generation,
            catalog = snapshot.products.len(),
            eligible = outcome.ranked.len(),
            documents = outcome.required_documents.len(),
            "match request served"
        );

        Ok(MatchReport::from_outcome(outcome, request))
    }
}

/// Normalization warning tagged with the product it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWarning {
    pub product_id: String,
    pub warning: NormalizationWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub generation: u64,
    pub state: CatalogState,
    pub received: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub warnings: Vec<RecordWarning>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub state: CatalogState,
    pub generation: u64,
    pub products: usize,
    pub active_products: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl From<&CatalogSnapshot> for CatalogStatus {
    fn from(snapshot: &CatalogSnapshot) -> Self {
        Self {
            state: snapshot.state(),
            generation: snapshot.generation,
            products: snapshot.products.len(),
            active_products: snapshot
                .products
                .iter()
                .filter(|product| product.active)
                .count(),
            loaded_at: snapshot.loaded_at,
        }
    }
}

/// Match outcome plus what the application step needs around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub ranked: Vec<MatchResult>,
    pub required_documents: Vec<DocumentRequirement>,
    /// Standard documents for the requested category, present only when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_documents: Option<Vec<DocumentRequirement>>,
    pub categories: Vec<CategorySummary>,
}

impl MatchReport {
    pub fn from_outcome(outcome: MatchOutcome, request: &ApplicantRequest) -> Self {
        let fallback_documents = if outcome.ranked.is_empty() {
            Some(documents::fallback_documents(
                request.category.as_deref().unwrap_or_default(),
            ))
        } else {
            None
        };
        let categories = aggregation::summarize_categories(&outcome.ranked);

        Self {
            ranked: outcome.ranked,
            required_documents: outcome.required_documents,
            fallback_documents,
            categories,
        }
    }
}
