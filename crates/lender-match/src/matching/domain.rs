use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::MatchError;

/// Wire label for a product without an upper funding limit.
pub const UNBOUNDED_AMOUNT: &str = "unbounded";

/// Markets served by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "US")]
    UnitedStates,
    #[serde(rename = "CA")]
    Canada,
}

impl Country {
    pub const fn code(self) -> &'static str {
        match self {
            Country::UnitedStates => "US",
            Country::Canada => "CA",
        }
    }

    /// Uppercases, keeps the first two letters and accepts only `US` or `CA`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw
            .trim()
            .chars()
            .take(2)
            .collect::<String>()
            .to_ascii_uppercase();
        match code.as_str() {
            "US" => Some(Country::UnitedStates),
            "CA" => Some(Country::Canada),
            _ => None,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Country restriction carried by a product.
///
/// Only an absent country is permissive. A value that was present but not recognised is
/// kept verbatim and admits no applicant, so a garbled record never matches every market.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryConstraint {
    #[default]
    Unconstrained,
    Only(Country),
    Unrecognized(String),
}

impl CountryConstraint {
    /// Reads a single country value, which may list several markets (`US/CA`, `US, CA`,
    /// `Both`).
    pub(crate) fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CountryConstraint::Unconstrained;
        }
        Self::from_markets(market_tokens(trimmed), trimmed)
    }

    /// Resolves market tokens; naming both markets leaves the product unconstrained.
    /// `raw` is kept when no token is recognised.
    pub(crate) fn from_markets<'a>(tokens: impl IntoIterator<Item = &'a str>, raw: &str) -> Self {
        let mut markets = BTreeSet::new();
        for token in tokens {
            match token.to_ascii_lowercase().as_str() {
                "both" | "north america" => {
                    markets.insert(Country::UnitedStates);
                    markets.insert(Country::Canada);
                }
                other => markets.extend(Country::parse(other)),
            }
        }

        let mut recognized = markets.into_iter();
        match (recognized.next(), recognized.next()) {
            (None, _) => CountryConstraint::Unrecognized(raw.to_string()),
            (Some(country), None) => CountryConstraint::Only(country),
            (Some(_), Some(_)) => CountryConstraint::Unconstrained,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, CountryConstraint::Unconstrained)
    }

    pub fn admits(&self, country: Country) -> bool {
        match self {
            CountryConstraint::Unconstrained => true,
            CountryConstraint::Only(required) => *required == country,
            CountryConstraint::Unrecognized(_) => false,
        }
    }

    /// Market code, or the unrecognized value as received.
    pub fn label(&self) -> Option<&str> {
        match self {
            CountryConstraint::Unconstrained => None,
            CountryConstraint::Only(country) => Some(country.code()),
            CountryConstraint::Unrecognized(raw) => Some(raw),
        }
    }

    pub fn country(&self) -> Option<Country> {
        match self {
            CountryConstraint::Only(country) => Some(*country),
            _ => None,
        }
    }
}

/// Splits a country value on the separators exports use between markets.
pub(crate) fn market_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|ch: char| matches!(ch, '/' | ',' | '&'))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl Serialize for CountryConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.label() {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CountryConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(CountryConstraint::from_raw)
            .unwrap_or_default())
    }
}

/// A supporting document a lender asks for.
///
/// `key` is already de-aliased: two requirements with the same key are the same document
/// whatever their labels say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequirement {
    pub key: String,
    pub label: String,
    pub required_quantity: u32,
}

/// Lender product after field normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    pub id: String,
    pub name: String,
    pub lender_name: String,
    #[serde(default, skip_serializing_if = "CountryConstraint::is_unconstrained")]
    pub country: CountryConstraint,
    /// Lowercase, whitespace-collapsed matching key.
    pub category: String,
    /// Category as the catalog spelled it, for display.
    pub category_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub min_amount: f64,
    /// `f64::INFINITY` when the product has no ceiling.
    #[serde(with = "amount_ceiling")]
    pub max_amount: f64,
    pub active: bool,
    #[serde(default)]
    pub required_documents: Vec<DocumentRequirement>,
}

impl CanonicalProduct {
    pub fn has_ceiling(&self) -> bool {
        self.max_amount.is_finite()
    }

    pub fn accepts_amount(&self, amount: f64) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}

mod amount_ceiling {
    use super::UNBOUNDED_AMOUNT;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(UNBOUNDED_AMOUNT)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ceiling {
        Amount(f64),
        Label(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Ceiling::deserialize(deserializer)? {
            Ceiling::Amount(value) => Ok(value),
            Ceiling::Label(label) if label.trim().eq_ignore_ascii_case(UNBOUNDED_AMOUNT) => {
                Ok(f64::INFINITY)
            }
            Ceiling::Label(other) => Err(D::Error::custom(format!(
                "expected a number or \"{UNBOUNDED_AMOUNT}\", got \"{other}\""
            ))),
        }
    }
}

/// Funding request for a single matching call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRequest {
    pub country: Option<Country>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_accounts_receivable: Option<bool>,
    /// Free-text use of funds, e.g. "equipment" or "hire two drivers".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl ApplicantRequest {
    pub fn new(country: Country, amount: f64) -> Self {
        Self {
            country: Some(country),
            amount,
            category: None,
            has_accounts_receivable: None,
            purpose: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_accounts_receivable(mut self, has_receivables: bool) -> Self {
        self.has_accounts_receivable = Some(has_receivables);
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Checks the request can be matched at all, returning the applicant's country.
    pub fn validate(&self) -> Result<Country, MatchError> {
        let country = self.country.ok_or(MatchError::MissingCountry)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(MatchError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        Ok(country)
    }
}

/// Loosely typed request as it arrives from the application UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRequestPayload {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub has_accounts_receivable: Option<bool>,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl TryFrom<ApplicantRequestPayload> for ApplicantRequest {
    type Error = MatchError;

    fn try_from(payload: ApplicantRequestPayload) -> Result<Self, Self::Error> {
        let raw_country = payload
            .country
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(MatchError::MissingCountry)?;
        let country = Country::parse(&raw_country).ok_or(MatchError::UnsupportedCountry {
            value: raw_country,
        })?;
        let amount = payload.amount.ok_or(MatchError::MissingAmount)?;

        let request = ApplicantRequest {
            country: Some(country),
            amount,
            category: non_blank(payload.category),
            has_accounts_receivable: payload.has_accounts_receivable,
            purpose: non_blank(payload.purpose),
        };
        request.validate()?;
        Ok(request)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn country_parse_truncates_and_validates() {
        assert_eq!(Country::parse("ca"), Some(Country::Canada));
        assert_eq!(Country::parse("Canada"), Some(Country::Canada));
        assert_eq!(Country::parse(" usa "), Some(Country::UnitedStates));
        assert_eq!(Country::parse("United States"), None);
        assert_eq!(Country::parse("MX"), None);
        assert_eq!(Country::parse("C"), None);
    }

    #[test]
    fn unrecognized_country_admits_nobody() {
        let constraint = CountryConstraint::from_raw("Mexico");
        assert_eq!(constraint, CountryConstraint::Unrecognized("Mexico".to_string()));
        assert!(!constraint.admits(Country::Canada));
        assert!(!constraint.admits(Country::UnitedStates));
        assert!(CountryConstraint::Unconstrained.admits(Country::Canada));
        assert!(CountryConstraint::from_raw("   ").is_unconstrained());
    }

    #[test]
    fn country_values_naming_both_markets_are_unconstrained() {
        for raw in ["US/CA", "us, ca", "CA & US", "Both", "North America"] {
            assert_eq!(
                CountryConstraint::from_raw(raw),
                CountryConstraint::Unconstrained,
                "{raw}"
            );
        }
        assert_eq!(
            CountryConstraint::from_raw("CA/MX"),
            CountryConstraint::Only(Country::Canada)
        );
        assert_eq!(
            CountryConstraint::from_raw(" / "),
            CountryConstraint::Unrecognized("/".to_string())
        );
    }

    #[test]
    fn unbounded_ceiling_serializes_as_label() {
        let product = CanonicalProduct {
            id: "p-1".to_string(),
            name: "Flex".to_string(),
            lender_name: "Acme".to_string(),
            country: CountryConstraint::Only(Country::Canada),
            category: "working capital".to_string(),
            category_label: "Working Capital".to_string(),
            description: None,
            min_amount: 0.0,
            max_amount: f64::INFINITY,
            active: true,
            required_documents: Vec::new(),
        };

        let value = serde_json::to_value(&product).expect("serializes");
        assert_eq!(value["maxAmount"], json!("unbounded"));
        assert_eq!(value["country"], json!("CA"));

        let restored: CanonicalProduct = serde_json::from_value(value).expect("deserializes");
        assert!(!restored.has_ceiling());
        assert_eq!(restored, product);
    }

    #[test]
    fn validate_rejects_non_positive_amounts_and_missing_country() {
        let request = ApplicantRequest::new(Country::Canada, 0.0);
        assert_eq!(
            request.validate(),
            Err(MatchError::NonPositiveAmount { amount: 0.0 })
        );

        let mut request = ApplicantRequest::new(Country::Canada, 5_000.0);
        request.country = None;
        assert_eq!(request.validate(), Err(MatchError::MissingCountry));

        let request = ApplicantRequest::new(Country::UnitedStates, 5_000.0);
        assert_eq!(request.validate(), Ok(Country::UnitedStates));
    }

    #[test]
    fn payload_conversion_reports_unsupported_country() {
        let payload: ApplicantRequestPayload =
            serde_json::from_value(json!({ "country": "Mexico", "amount": 40000 }))
                .expect("payload parses");
        let error = ApplicantRequest::try_from(payload).expect_err("unsupported");
        assert_eq!(
            error,
            MatchError::UnsupportedCountry {
                value: "Mexico".to_string()
            }
        );
    }

    #[test]
    fn payload_conversion_drops_blank_optionals() {
        let payload: ApplicantRequestPayload = serde_json::from_value(json!({
            "country": "canada",
            "amount": 40000,
            "category": "  ",
            "hasAccountsReceivable": false,
        }))
        .expect("payload parses");

        let request = ApplicantRequest::try_from(payload).expect("valid request");
        assert_eq!(request.country, Some(Country::Canada));
        assert_eq!(request.category, None);
        assert_eq!(request.has_accounts_receivable, Some(false));
    }
}
