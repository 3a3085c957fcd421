use lender_match::error::AppError;
use lender_match::matching::{CatalogImporter, LoadReport, MatchingService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reads a catalog file into the service, replacing whatever it held.
pub(crate) fn load_catalog_file(
    service: &MatchingService,
    path: &Path,
) -> Result<LoadReport, AppError> {
    let imported = CatalogImporter::from_path(path)?;
    let report = service.load_imported(&imported);

    if report.skipped > 0 || !report.warnings.is_empty() {
        warn!(
            path = %path.display(),
            skipped = report.skipped,
            warnings = report.warnings.len(),
            "catalog file loaded with problems"
        );
    }
    info!(
        path = %path.display(),
        products = report.loaded,
        generation = report.generation,
        "catalog file loaded"
    );
    Ok(report)
}
