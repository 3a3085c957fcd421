use super::common::*;

use crate::matching::domain::{ApplicantRequest, Country, CountryConstraint};
use crate::matching::eligibility::{assess, filter, is_eligible, Rejection};
use crate::matching::normalizer::normalize;

fn ids(products: &[crate::matching::domain::CanonicalProduct]) -> Vec<&str> {
    products.iter().map(|product| product.id.as_str()).collect()
}

#[test]
fn amount_bounds_are_inclusive() {
    let product = in_country(
        product("wc", "Maple", "Flex", "Working Capital", 10_000.0, 100_000.0),
        Country::Canada,
    );

    assert!(is_eligible(&product, &canadian_request(10_000.0)));
    assert!(is_eligible(&product, &canadian_request(100_000.0)));
    assert_eq!(
        assess(&product, &canadian_request(9_999.99)),
        vec![Rejection::BelowMinimum { minimum: 10_000.0 }]
    );
    assert_eq!(
        assess(&product, &canadian_request(100_000.01)),
        vec![Rejection::AboveMaximum { maximum: 100_000.0 }]
    );
}

#[test]
fn canadian_request_keeps_only_the_canadian_product() {
    let catalog: Vec<_> = scenario_catalog().iter().map(normalize).collect();
    let eligible = filter(&catalog, &canadian_request(40_000.0));

    assert_eq!(ids(&eligible), vec!["ca-wc"]);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn products_without_a_country_serve_every_market() {
    let open = product("open", "Acme", "Open Line", "Line of Credit", 0.0, f64::INFINITY);

    assert!(is_eligible(&open, &canadian_request(5_000.0)));
    assert!(is_eligible(
        &open,
        &ApplicantRequest::new(Country::UnitedStates, 5_000.0)
    ));
}

#[test]
fn unrecognized_product_country_serves_nobody() {
    let mut garbled = product("mx", "Acme", "Peso Line", "Working Capital", 0.0, f64::INFINITY);
    garbled.country = CountryConstraint::Unrecognized("Mexico".to_string());

    assert_eq!(
        assess(&garbled, &canadian_request(5_000.0)),
        vec![Rejection::CountryMismatch {
            requested: Some(Country::Canada),
            offered: Some("Mexico".to_string()),
        }]
    );
}

#[test]
fn inactive_products_are_excluded() {
    let mut paused = product("paused", "Acme", "Paused", "Term Loan", 0.0, f64::INFINITY);
    paused.active = false;

    assert_eq!(
        assess(&paused, &canadian_request(5_000.0)),
        vec![Rejection::Inactive]
    );
}

#[test]
fn plural_category_names_select_the_same_products() {
    let catalog = vec![
        product("term-a", "Acme", "Term A", "Term Loans", 0.0, f64::INFINITY),
        product("term-b", "Beta", "Term B", "term loan", 0.0, f64::INFINITY),
        product("wc", "Gamma", "Flex", "Working Capital", 0.0, f64::INFINITY),
    ];

    let singular = filter(&catalog, &canadian_request(20_000.0).with_category("Term Loan"));
    let plural = filter(&catalog, &canadian_request(20_000.0).with_category("Term Loans"));

    assert_eq!(ids(&singular), vec!["term-a", "term-b"]);
    assert_eq!(singular, plural);
}

#[test]
fn distinct_families_are_never_conflated() {
    let term = product("term", "Acme", "Term", "Term Loan", 0.0, f64::INFINITY);
    let rejections = assess(
        &term,
        &canadian_request(20_000.0).with_category("Working Capital"),
    );

    assert_eq!(
        rejections,
        vec![Rejection::CategoryMismatch {
            requested: "Working Capital".to_string(),
            offered: "Term Loan".to_string(),
        }]
    );
}

#[test]
fn category_match_ignores_casing() {
    let catalog: Vec<_> = scenario_catalog().iter().map(normalize).collect();
    let eligible = filter(
        &catalog,
        &canadian_request(40_000.0).with_category("Working Capital"),
    );

    assert_eq!(ids(&eligible), vec!["ca-wc"]);
    assert_eq!(eligible[0].category, "working capital");
}

#[test]
fn zero_amount_without_receivables_excludes_factoring() {
    let catalog = vec![
        in_country(
            product("factor", "North", "Advance", "Invoice Factoring", 0.0, 250_000.0),
            Country::Canada,
        ),
        product("loc", "Acme", "Open Line", "Line of Credit", 0.0, f64::INFINITY),
    ];
    let request = ApplicantRequest {
        amount: 0.0,
        has_accounts_receivable: Some(false),
        ..canadian_request(1.0)
    };

    assert_eq!(ids(&filter(&catalog, &request)), vec!["loc"]);
    assert_eq!(
        assess(&catalog[0], &request),
        vec![Rejection::ReceivablesRequired]
    );
}

#[test]
fn receivables_answer_gates_factoring() {
    let factoring = product("factor", "North", "Advance", "factoring", 0.0, 250_000.0);

    assert!(!is_eligible(
        &factoring,
        &canadian_request(40_000.0).with_accounts_receivable(false)
    ));
    assert!(is_eligible(
        &factoring,
        &canadian_request(40_000.0).with_accounts_receivable(true)
    ));
    assert!(is_eligible(&factoring, &canadian_request(40_000.0)));
}

#[test]
fn every_failed_predicate_is_reported() {
    let mut product = in_country(
        product("us", "Liberty", "Term", "Term Loan", 25_000.0, 50_000.0),
        Country::UnitedStates,
    );
    product.active = false;

    let rejections = assess(&product, &canadian_request(60_000.0).with_category("Equipment"));
    assert_eq!(rejections.len(), 4);
    assert_eq!(rejections[0], Rejection::Inactive);
    assert_eq!(
        rejections[1].to_string(),
        "offered in US but requested for CA"
    );
}

#[test]
fn shared_market_country_strings_serve_both_markets() {
    let catalog: Vec<_> = ["US/CA", "Both", "North America"]
        .into_iter()
        .enumerate()
        .map(|(index, country)| {
            normalize(&record(serde_json::json!({
                "id": format!("shared-{index}"),
                "lender": "Summit",
                "name": "Growth Line",
                "category": "Line of Credit",
                "country": country,
                "minAmount": 0,
                "maxAmount": 100000,
            })))
        })
        .collect();

    let canadian = filter(&catalog, &canadian_request(40_000.0));
    let american = filter(&catalog, &ApplicantRequest::new(Country::UnitedStates, 40_000.0));

    assert_eq!(ids(&canadian), vec!["shared-0", "shared-1", "shared-2"]);
    assert_eq!(canadian, american);
}

#[test]
fn nan_amount_fails_both_bounds() {
    let product = product("wc", "Maple", "Flex", "Working Capital", 10_000.0, 100_000.0);
    let request = ApplicantRequest {
        amount: f64::NAN,
        ..canadian_request(1.0)
    };

    assert!(filter(std::slice::from_ref(&product), &request).is_empty());
    assert_eq!(
        assess(&product, &request),
        vec![
            Rejection::BelowMinimum { minimum: 10_000.0 },
            Rejection::AboveMaximum { maximum: 100_000.0 },
        ]
    );
}
