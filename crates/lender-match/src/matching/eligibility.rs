//! Hard eligibility predicates. A product is eligible when [`assess`] finds nothing wrong.

use super::category;
use super::domain::{ApplicantRequest, CanonicalProduct, Country};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Why a product was excluded for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    Inactive,
    CountryMismatch {
        requested: Option<Country>,
        offered: Option<String>,
    },
    BelowMinimum {
        minimum: f64,
    },
    AboveMaximum {
        maximum: f64,
    },
    CategoryMismatch {
        requested: String,
        offered: String,
    },
    ReceivablesRequired,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Inactive => write!(f, "product is inactive"),
            Rejection::CountryMismatch { requested, offered } => write!(
                f,
                "offered in {} but requested for {}",
                offered.as_deref().unwrap_or("no market"),
                requested.map(Country::code).unwrap_or("no market")
            ),
            Rejection::BelowMinimum { minimum } => {
                write!(f, "amount is below the product minimum of {minimum}")
            }
            Rejection::AboveMaximum { maximum } => {
                write!(f, "amount is above the product maximum of {maximum}")
            }
            Rejection::CategoryMismatch { requested, offered } => {
                write!(f, "category {offered} does not match requested {requested}")
            }
            Rejection::ReceivablesRequired => {
                write!(f, "invoice factoring requires accounts receivable")
            }
        }
    }
}

/// Every predicate the product fails for this request, in evaluation order.
pub fn assess(product: &CanonicalProduct, request: &ApplicantRequest) -> Vec<Rejection> {
    let mut rejections = Vec::new();

    if !product.active {
        rejections.push(Rejection::Inactive);
    }

    let country_admitted = match request.country {
        Some(country) => product.country.admits(country),
        None => product.country.is_unconstrained(),
    };
    if !country_admitted {
        rejections.push(Rejection::CountryMismatch {
            requested: request.country,
            offered: product.country.label().map(str::to_string),
        });
    }

    let unusable = request.amount.is_nan();
    if unusable || request.amount < product.min_amount {
        rejections.push(Rejection::BelowMinimum {
            minimum: product.min_amount,
        });
    }
    if unusable || request.amount > product.max_amount {
        rejections.push(Rejection::AboveMaximum {
            maximum: product.max_amount,
        });
    }

    if let Some(requested) = &request.category {
        if !category::same_family(requested, &product.category) {
            rejections.push(Rejection::CategoryMismatch {
                requested: requested.clone(),
                offered: product.category_label.clone(),
            });
        }
    }

    if receivables_gate_applies(request) && category::is_invoice_factoring(&product.category) {
        rejections.push(Rejection::ReceivablesRequired);
    }

    rejections
}

pub fn is_eligible(product: &CanonicalProduct, request: &ApplicantRequest) -> bool {
    assess(product, request).is_empty()
}

/// Eligible products in catalog order. The catalog itself is left untouched.
pub fn filter(catalog: &[CanonicalProduct], request: &ApplicantRequest) -> Vec<CanonicalProduct> {
    catalog
        .iter()
        .filter(|product| {
            let rejections = assess(product, request);
            if !rejections.is_empty() {
                debug!(
                    product_id = %product.id,
                    reasons = ?rejections,
                    "product excluded"
                );
            }
            rejections.is_empty()
        })
        .cloned()
        .collect()
}

/// Factoring needs receivables to sell: it is off the table when the applicant has none or
/// asks for nothing.
fn receivables_gate_applies(request: &ApplicantRequest) -> bool {
    request.has_accounts_receivable == Some(false) || request.amount == 0.0
}
