use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::matching::domain::{
    ApplicantRequest, CanonicalProduct, Country, CountryConstraint, DocumentRequirement,
};
use crate::matching::normalizer::RawProductRecord;
use crate::matching::service::MatchingService;
use crate::matching::text::normalize_label;

pub(super) fn record(value: Value) -> RawProductRecord {
    RawProductRecord::from_value(value).expect("fixture is a JSON object")
}

pub(super) fn canadian_working_capital() -> Value {
    json!({
        "id": "ca-wc",
        "name": "Flex Capital",
        "lender_name": "Maple Lending",
        "country": "CA",
        "category": "Working Capital",
        "min_amount": 10000,
        "max_amount": 100000,
        "active": true,
        "requiredDocuments": [
            { "name": "Bank Statements", "quantity": 6 },
            { "name": "Financial Statements", "quantity": 3 }
        ]
    })
}

pub(super) fn us_term_loan() -> Value {
    json!({
        "id": "us-term",
        "productName": "Main Street Term",
        "lenderName": "Liberty Capital",
        "countryCode": "US",
        "productCategory": "Term Loans",
        "amountMin": 25000,
        "amountMax": "$500,000",
        "isActive": true,
        "documents": ["Bank Statements", "Business Tax Returns"]
    })
}

pub(super) fn canadian_factoring() -> Value {
    json!({
        "id": "ca-factor",
        "name": "Receivables Advance",
        "lender": "North Factor",
        "geography": ["CA"],
        "type": "Invoice Factoring",
        "fundingMin": 0,
        "fundingMax": 250000,
        "active": "yes",
        "required_documents": "AR Aging, Bank Statements"
    })
}

/// One Canadian working capital product and one US product.
pub(super) fn scenario_catalog() -> Vec<RawProductRecord> {
    vec![record(canadian_working_capital()), record(us_term_loan())]
}

pub(super) fn full_catalog() -> Vec<RawProductRecord> {
    vec![
        record(canadian_working_capital()),
        record(us_term_loan()),
        record(canadian_factoring()),
    ]
}

pub(super) fn product(
    id: &str,
    lender_name: &str,
    name: &str,
    category: &str,
    min_amount: f64,
    max_amount: f64,
) -> CanonicalProduct {
    CanonicalProduct {
        id: id.to_string(),
        name: name.to_string(),
        lender_name: lender_name.to_string(),
        country: CountryConstraint::Unconstrained,
        category: normalize_label(category),
        category_label: category.to_string(),
        description: None,
        min_amount,
        max_amount,
        active: true,
        required_documents: Vec::new(),
    }
}

pub(super) fn in_country(mut product: CanonicalProduct, country: Country) -> CanonicalProduct {
    product.country = CountryConstraint::Only(country);
    product
}

pub(super) fn with_documents(
    mut product: CanonicalProduct,
    documents: &[(&str, &str, u32)],
) -> CanonicalProduct {
    product.required_documents = documents
        .iter()
        .map(|(key, label, quantity)| requirement(key, label, *quantity))
        .collect();
    product
}

pub(super) fn requirement(key: &str, label: &str, required_quantity: u32) -> DocumentRequirement {
    DocumentRequirement {
        key: key.to_string(),
        label: label.to_string(),
        required_quantity,
    }
}

pub(super) fn canadian_request(amount: f64) -> ApplicantRequest {
    ApplicantRequest::new(Country::Canada, amount)
}

pub(super) fn keys(documents: &[DocumentRequirement]) -> Vec<(&str, u32)> {
    documents
        .iter()
        .map(|document| (document.key.as_str(), document.required_quantity))
        .collect()
}

pub(super) fn loaded_service() -> Arc<MatchingService> {
    let service = MatchingService::new();
    service.load(&full_catalog());
    Arc::new(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
