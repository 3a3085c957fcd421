use crate::infra::load_catalog_file;
use clap::Args;
use lender_match::config::{AppConfig, ConfigError};
use lender_match::error::AppError;
use lender_match::matching::{
    ApplicantRequest, ApplicantRequestPayload, DocumentRequirement, MatchReport, MatchingService,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Catalog JSON file (defaults to LENDER_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Applicant country, US or CA
    #[arg(long)]
    pub(crate) country: String,
    /// Requested funding amount
    #[arg(long)]
    pub(crate) amount: f64,
    /// Preferred product category, e.g. "Working Capital"
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Use of funds, e.g. "equipment" or "hire two drivers"
    #[arg(long)]
    pub(crate) purpose: Option<String>,
    /// The business has no accounts receivable to factor
    #[arg(long)]
    pub(crate) no_receivables: bool,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        catalog,
        country,
        amount,
        category,
        purpose,
        no_receivables,
        json,
    } = args;

    let catalog = match catalog {
        Some(path) => path,
        None => AppConfig::load()?
            .catalog
            .snapshot_path
            .ok_or(ConfigError::MissingCatalog)?,
    };

    let request = ApplicantRequest::try_from(ApplicantRequestPayload {
        country: Some(country),
        amount: Some(amount),
        category,
        has_accounts_receivable: no_receivables.then_some(false),
        purpose,
    })?;

    let service = MatchingService::new();
    let loaded = load_catalog_file(&service, &catalog)?;
    let report = service.match_request(&request)?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Match report unavailable: {err}"),
        }
        return Ok(());
    }

    println!(
        "Catalog {} ({} products, {} warnings)",
        catalog.display(),
        loaded.loaded,
        loaded.warnings.len()
    );
    render_match_report(&request, &report);
    Ok(())
}

pub(crate) fn render_match_report(request: &ApplicantRequest, report: &MatchReport) {
    let country = request
        .country
        .map(|country| country.code())
        .unwrap_or("??");
    println!("Request: {} {:.2}", country, request.amount);
    if let Some(category) = &request.category {
        println!("Category: {category}");
    }
    if let Some(purpose) = &request.purpose {
        println!("Purpose: {purpose}");
    }

    if report.ranked.is_empty() {
        println!("\nMatches: none");
    } else {
        println!("\nMatches");
        for (position, result) in report.ranked.iter().enumerate() {
            println!(
                "{}. {} - {} [{}] score {:.1} ({})",
                position + 1,
                result.product.lender_name,
                result.product.name,
                result.product.category_label,
                result.score,
                result.level.label()
            );
            for component in &result.components {
                println!("     +{:.1} {}", component.points, component.notes);
            }
        }
    }

    if !report.categories.is_empty() {
        println!("\nCategories");
        for summary in &report.categories {
            println!(
                "- {}: {} products, best score {:.1}",
                summary.label, summary.product_count, summary.best_score
            );
        }
    }

    if let Some(fallback) = &report.fallback_documents {
        println!("\nStandard documents for this request");
        render_documents(fallback);
    } else {
        println!("\nRequired documents");
        render_documents(&report.required_documents);
    }
}

fn render_documents(documents: &[DocumentRequirement]) {
    if documents.is_empty() {
        println!("- none");
    }
    for document in documents {
        println!("- {} x{}", document.label, document.required_quantity);
    }
}
