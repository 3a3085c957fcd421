use super::super::category;
use super::super::domain::{ApplicantRequest, CanonicalProduct};
use super::purpose::PurposeAlignment;
use super::{Criterion, ScoreComponent};

pub const COUNTRY_MATCH_POINTS: f64 = 30.0;
pub const CATEGORY_MATCH_POINTS: f64 = 20.0;
pub const AMOUNT_COMFORT_POINTS: f64 = 15.0;
pub const PURPOSE_ALIGNMENT_POINTS: f64 = 15.0;

/// Share of a product's amount range, centred, that counts as a comfortable fit.
const COMFORT_BAND: f64 = 0.8;

pub(crate) fn score_components(
    product: &CanonicalProduct,
    request: &ApplicantRequest,
    purpose: &dyn PurposeAlignment,
) -> (Vec<ScoreComponent>, f64) {
    let mut components = Vec::new();

    if let Some(country) = request.country {
        if product.country.country() == Some(country) {
            components.push(ScoreComponent {
                criterion: Criterion::CountryMatch,
                points: COUNTRY_MATCH_POINTS,
                notes: format!("offered in {country}"),
            });
        }
    }

    if let Some(requested) = &request.category {
        if category::same_family(requested, &product.category) {
            components.push(ScoreComponent {
                criterion: Criterion::CategoryMatch,
                points: CATEGORY_MATCH_POINTS,
                notes: format!("{} matches requested {}", product.category_label, requested),
            });
        }
    }

    if comfortably_within(product, request.amount) {
        components.push(ScoreComponent {
            criterion: Criterion::AmountComfort,
            points: AMOUNT_COMFORT_POINTS,
            notes: format!("{} sits well inside the product range", request.amount),
        });
    }

    if let Some(stated) = &request.purpose {
        let fraction = purpose.alignment(stated, product).clamp(0.0, 1.0);
        let points = round_tenths(fraction * PURPOSE_ALIGNMENT_POINTS);
        if points > 0.0 {
            components.push(ScoreComponent {
                criterion: Criterion::PurposeAlignment,
                points,
                notes: format!("{:.0}% aligned with purpose \"{}\"", fraction * 100.0, stated),
            });
        }
    }

    let total = round_tenths(components.iter().map(|component| component.points).sum());
    (components, total)
}

/// True when the amount lies in the central band of the product range, not just inside it.
/// Products without a ceiling are comfortable anywhere above their floor.
fn comfortably_within(product: &CanonicalProduct, amount: f64) -> bool {
    if !product.accepts_amount(amount) {
        return false;
    }
    if !product.has_ceiling() {
        return amount > product.min_amount;
    }

    let margin = (product.max_amount - product.min_amount) * (1.0 - COMFORT_BAND) / 2.0;
    amount >= product.min_amount + margin && amount <= product.max_amount - margin
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::{Country, CountryConstraint};

    fn product(min_amount: f64, max_amount: f64) -> CanonicalProduct {
        CanonicalProduct {
            id: "p".to_string(),
            name: "Flex".to_string(),
            lender_name: "Acme".to_string(),
            country: CountryConstraint::Only(Country::Canada),
            category: "working capital".to_string(),
            category_label: "Working Capital".to_string(),
            description: None,
            min_amount,
            max_amount,
            active: true,
            required_documents: Vec::new(),
        }
    }

    #[test]
    fn comfort_band_excludes_the_outer_tenths() {
        let band = product(10_000.0, 110_000.0);
        assert!(!comfortably_within(&band, 10_000.0));
        assert!(!comfortably_within(&band, 19_999.0));
        assert!(comfortably_within(&band, 20_000.0));
        assert!(comfortably_within(&band, 60_000.0));
        assert!(comfortably_within(&band, 100_000.0));
        assert!(!comfortably_within(&band, 100_001.0));
        assert!(!comfortably_within(&band, 120_000.0));
    }

    #[test]
    fn single_point_range_is_comfortable_at_that_point() {
        let exact = product(25_000.0, 25_000.0);
        assert!(comfortably_within(&exact, 25_000.0));
    }

    #[test]
    fn open_ended_range_is_comfortable_above_the_floor() {
        let open = product(5_000.0, f64::INFINITY);
        assert!(!comfortably_within(&open, 5_000.0));
        assert!(comfortably_within(&open, 5_001.0));
        assert!(comfortably_within(&open, 9_000_000.0));
    }
}
