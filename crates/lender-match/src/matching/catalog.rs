//! Catalog snapshots: importing raw lender exports and swapping the active product set.

use super::domain::CanonicalProduct;
use super::normalizer::RawProductRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnexpectedShape(&'static str),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read lender catalog: {}", err),
            CatalogError::Json(err) => write!(f, "invalid lender catalog JSON: {}", err),
            CatalogError::UnexpectedShape(found) => write!(
                f,
                "lender catalog must be an array of products or an object with a `products` array, found {}",
                found
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::UnexpectedShape(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Raw records pulled from an export, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ImportedCatalog {
    pub records: Vec<RawProductRecord>,
    /// Array entries that were not JSON objects.
    pub skipped_entries: usize,
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportedCatalog, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ImportedCatalog, CatalogError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Accepts a bare array or the wrapped `{ "success": .., "products": [..] }` payload.
    pub fn from_value(value: Value) -> Result<ImportedCatalog, CatalogError> {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut wrapper) => match wrapper.remove("products") {
                Some(Value::Array(entries)) => entries,
                Some(_) => return Err(CatalogError::UnexpectedShape("a non-array `products` field")),
                None => return Err(CatalogError::UnexpectedShape("an object without `products`")),
            },
            Value::Null => return Err(CatalogError::UnexpectedShape("null")),
            Value::Bool(_) => return Err(CatalogError::UnexpectedShape("a boolean")),
            Value::Number(_) => return Err(CatalogError::UnexpectedShape("a number")),
            Value::String(_) => return Err(CatalogError::UnexpectedShape("a string")),
        };

        let mut imported = ImportedCatalog::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match RawProductRecord::from_value(entry) {
                Some(record) => imported.records.push(record),
                None => {
                    warn!(index, "skipping catalog entry that is not an object");
                    imported.skipped_entries += 1;
                }
            }
        }
        Ok(imported)
    }
}

/// Immutable product set shared by in-flight match requests.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<CanonicalProduct>,
    pub generation: u64,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    Empty,
    Loaded,
    Reloaded,
}

impl CatalogState {
    pub const fn label(self) -> &'static str {
        match self {
            CatalogState::Empty => "empty",
            CatalogState::Loaded => "loaded",
            CatalogState::Reloaded => "reloaded",
        }
    }
}

impl CatalogSnapshot {
    pub fn state(&self) -> CatalogState {
        match self.generation {
            0 => CatalogState::Empty,
            1 => CatalogState::Loaded,
            _ => CatalogState::Reloaded,
        }
    }
}

/// Holder of the current snapshot. Readers clone the `Arc`; a reload swaps it whole.
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Installs a new product set and returns the snapshot that is now current.
    pub fn replace(&self, products: Vec<CanonicalProduct>) -> Arc<CatalogSnapshot> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = Arc::new(CatalogSnapshot {
            products,
            generation: guard.generation + 1,
            loaded_at: Some(Utc::now()),
        });
        *guard = Arc::clone(&next);
        drop(guard);

        info!(
            generation = next.generation,
            products = next.products.len(),
            state = next.state().label(),
            "lender catalog installed"
        );
        next
    }
}
