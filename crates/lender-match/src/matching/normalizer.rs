//! Maps raw catalog records onto [`CanonicalProduct`].
//!
//! Normalization never fails. Garbled values fall back to safe defaults (a zero floor, an
//! unbounded ceiling, an unrecognized country that admits nobody) and are reported as
//! [`NormalizationWarning`]s so one bad upstream record cannot abort a catalog load.

use super::aliases::{is_known_field, resolve, CanonicalField};
use super::documents;
use super::domain::{market_tokens, CanonicalProduct, CountryConstraint, DocumentRequirement};
use super::text::{display_label, normalize_label, slug};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::warn;

const UNKNOWN_LENDER: &str = "Unknown Lender";

const DOCUMENT_NAME_KEYS: &[&str] = &[
    "label",
    "name",
    "documentType",
    "document_type",
    "type",
    "key",
];

const DOCUMENT_QUANTITY_KEYS: &[&str] = &[
    "requiredQuantity",
    "required_quantity",
    "quantity",
    "count",
];

/// Untyped product record as delivered by the catalog source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProductRecord(Map<String, Value>);

impl RawProductRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON object; any other JSON value is not a record.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawProductRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<&CanonicalProduct> for RawProductRecord {
    fn from(product: &CanonicalProduct) -> Self {
        match serde_json::to_value(product) {
            Ok(Value::Object(fields)) => Self(fields),
            _ => Self::default(),
        }
    }
}

/// Soft failure found while normalizing a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationWarning {
    MissingField { field: &'static str },
    MalformedAmount { field: &'static str, value: String },
    ZeroCeiling { alias: &'static str },
    InvertedAmounts { min: f64, max: f64 },
    UnrecognizedCountry { value: String },
    MalformedFlag { field: &'static str, value: String },
    MalformedDocument { value: String },
    MalformedQuantity { value: String },
    DuplicateId { id: String, renamed_to: String },
    UnrecognizedFields { fields: Vec<String> },
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationWarning::MissingField { field } => write!(f, "missing {field}"),
            NormalizationWarning::MalformedAmount { field, value } => {
                write!(f, "{field} is not a usable amount: {value}")
            }
            NormalizationWarning::ZeroCeiling { alias } => {
                write!(f, "{alias} of 0 read as no ceiling")
            }
            NormalizationWarning::InvertedAmounts { min, max } => {
                write!(f, "amount bounds inverted ({min} > {max}); swapped")
            }
            NormalizationWarning::UnrecognizedCountry { value } => {
                write!(f, "unrecognized country {value}")
            }
            NormalizationWarning::MalformedFlag { field, value } => {
                write!(f, "{field} is not a boolean: {value}")
            }
            NormalizationWarning::MalformedDocument { value } => {
                write!(f, "unusable document requirement: {value}")
            }
            NormalizationWarning::MalformedQuantity { value } => {
                write!(f, "document quantity is not a whole count: {value}; default used")
            }
            NormalizationWarning::DuplicateId { id, renamed_to } => {
                write!(f, "id {id} already in catalog; renamed to {renamed_to}")
            }
            NormalizationWarning::UnrecognizedFields { fields } => {
                write!(f, "unrecognized fields: {}", fields.join(", "))
            }
        }
    }
}

/// Normalized product together with the soft failures met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub product: CanonicalProduct,
    pub warnings: Vec<NormalizationWarning>,
}

pub fn normalize(raw: &RawProductRecord) -> CanonicalProduct {
    normalize_with_warnings(raw).product
}

pub fn normalize_with_warnings(raw: &RawProductRecord) -> Normalized {
    let mut normalizer = RecordNormalizer {
        fields: raw.fields(),
        warnings: Vec::new(),
    };
    let product = normalizer.product();
    let warnings = normalizer.warnings;

    for warning in &warnings {
        warn!(product_id = %product.id, %warning, "catalog record normalized with defaults");
    }

    Normalized { product, warnings }
}

/// Normalizes a whole catalog, renaming repeated ids (`acme`, `acme-2`, ...) so every id in
/// the result is unique.
pub fn normalize_catalog(records: &[RawProductRecord]) -> Vec<Normalized> {
    let mut seen_ids = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| {
            let mut normalized = normalize_with_warnings(record);
            if let Some(renamed_to) = unique_id(&normalized.product.id, &seen_ids) {
                warn!(
                    product_id = %normalized.product.id,
                    %renamed_to,
                    "duplicate product id in catalog"
                );
                let id = std::mem::replace(&mut normalized.product.id, renamed_to.clone());
                normalized
                    .warnings
                    .push(NormalizationWarning::DuplicateId { id, renamed_to });
            }
            seen_ids.insert(normalized.product.id.clone());
            normalized
        })
        .collect()
}

fn unique_id(id: &str, seen: &HashSet<String>) -> Option<String> {
    if !seen.contains(id) {
        return None;
    }
    (2..)
        .map(|suffix| format!("{id}-{suffix}"))
        .find(|candidate| !seen.contains(candidate))
}

struct RecordNormalizer<'a> {
    fields: &'a Map<String, Value>,
    warnings: Vec<NormalizationWarning>,
}

impl RecordNormalizer<'_> {
    fn product(&mut self) -> CanonicalProduct {
        let name = self.text(CanonicalField::Name).unwrap_or_else(|| {
            self.missing(CanonicalField::Name);
            String::new()
        });
        let lender_name = self.text(CanonicalField::LenderName).unwrap_or_else(|| {
            self.missing(CanonicalField::LenderName);
            UNKNOWN_LENDER.to_string()
        });
        let id = self
            .text(CanonicalField::Id)
            .unwrap_or_else(|| slug(&format!("{lender_name} {name}"), '-'));

        let raw_category = self.text(CanonicalField::Category).unwrap_or_else(|| {
            self.missing(CanonicalField::Category);
            String::new()
        });
        let category_label = self
            .text(CanonicalField::CategoryLabel)
            .unwrap_or_else(|| raw_category.clone());
        let description = self.text(CanonicalField::Description);

        let country = self.country();
        let (min_amount, max_amount) = self.amount_bounds();
        let active = self.active();
        let required_documents = self.required_documents();
        self.flag_unrecognized_fields();

        CanonicalProduct {
            id,
            name,
            lender_name,
            country,
            category: normalize_label(&raw_category),
            category_label,
            description,
            min_amount,
            max_amount,
            active,
            required_documents,
        }
    }

    fn missing(&mut self, field: CanonicalField) {
        self.warnings
            .push(NormalizationWarning::MissingField { field: field.name() });
    }

    fn text(&self, field: CanonicalField) -> Option<String> {
        let (_, value) = resolve(self.fields, field)?;
        let text = match value {
            Value::String(text) => display_label(text),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return None,
        };
        Some(text).filter(|text| !text.is_empty())
    }

    fn country(&mut self) -> CountryConstraint {
        let Some((_, value)) = resolve(self.fields, CanonicalField::Country) else {
            return CountryConstraint::Unconstrained;
        };

        let constraint = match value {
            Value::String(raw) => CountryConstraint::from_raw(raw),
            Value::Array(entries) => country_from_list(entries),
            other => CountryConstraint::Unrecognized(other.to_string()),
        };

        if let CountryConstraint::Unrecognized(value) = &constraint {
            self.warnings.push(NormalizationWarning::UnrecognizedCountry {
                value: value.clone(),
            });
        }
        constraint
    }

    fn amount_bounds(&mut self) -> (f64, f64) {
        let min = match resolve(self.fields, CanonicalField::MinAmount) {
            None => 0.0,
            Some((_, value)) => match coerce_amount(value) {
                Amount::Finite(amount) => amount,
                Amount::Unbounded | Amount::Malformed => {
                    self.malformed_amount(CanonicalField::MinAmount, value);
                    0.0
                }
            },
        };

        let max = match resolve(self.fields, CanonicalField::MaxAmount) {
            None => f64::INFINITY,
            Some((alias, value)) => match coerce_amount(value) {
                Amount::Finite(amount) if amount == 0.0 => {
                    self.warnings.push(NormalizationWarning::ZeroCeiling { alias });
                    f64::INFINITY
                }
                Amount::Finite(amount) => amount,
                Amount::Unbounded => f64::INFINITY,
                Amount::Malformed => {
                    self.malformed_amount(CanonicalField::MaxAmount, value);
                    f64::INFINITY
                }
            },
        };

        if min > max {
            self.warnings
                .push(NormalizationWarning::InvertedAmounts { min, max });
            (max, min)
        } else {
            (min, max)
        }
    }

    fn malformed_amount(&mut self, field: CanonicalField, value: &Value) {
        self.warnings.push(NormalizationWarning::MalformedAmount {
            field: field.name(),
            value: value.to_string(),
        });
    }

    fn active(&mut self) -> bool {
        let Some((_, value)) = resolve(self.fields, CanonicalField::Active) else {
            return true;
        };
        match coerce_flag(value) {
            Some(flag) => flag,
            None => {
                self.warnings.push(NormalizationWarning::MalformedFlag {
                    field: CanonicalField::Active.name(),
                    value: value.to_string(),
                });
                false
            }
        }
    }

    fn required_documents(&mut self) -> Vec<DocumentRequirement> {
        let Some((_, value)) = resolve(self.fields, CanonicalField::RequiredDocuments) else {
            return Vec::new();
        };

        match value {
            Value::Array(entries) => entries
                .iter()
                .filter_map(|entry| self.document_entry(entry))
                .collect(),
            Value::String(list) => split_document_list(list)
                .into_iter()
                .filter_map(|name| self.document_name(name, None, value))
                .collect(),
            other => {
                self.malformed_document(other);
                Vec::new()
            }
        }
    }

    fn document_entry(&mut self, entry: &Value) -> Option<DocumentRequirement> {
        match entry {
            Value::String(name) => self.document_name(name, None, entry),
            Value::Object(fields) => {
                let name = first_present(fields, DOCUMENT_NAME_KEYS).and_then(Value::as_str);
                let quantity = first_present(fields, DOCUMENT_QUANTITY_KEYS).and_then(|value| {
                    let quantity = coerce_quantity(value);
                    if quantity.is_none() {
                        self.warnings.push(NormalizationWarning::MalformedQuantity {
                            value: value.to_string(),
                        });
                    }
                    quantity
                });
                match name {
                    Some(name) => self.document_name(name, quantity, entry),
                    None => {
                        self.malformed_document(entry);
                        None
                    }
                }
            }
            other => {
                self.malformed_document(other);
                None
            }
        }
    }

    fn document_name(
        &mut self,
        name: &str,
        quantity: Option<u32>,
        source: &Value,
    ) -> Option<DocumentRequirement> {
        let requirement = documents::requirement(name, quantity);
        if requirement.is_none() {
            self.malformed_document(source);
        }
        requirement
    }

    fn malformed_document(&mut self, value: &Value) {
        self.warnings.push(NormalizationWarning::MalformedDocument {
            value: value.to_string(),
        });
    }

    fn flag_unrecognized_fields(&mut self) {
        let unknown: BTreeSet<&String> = self
            .fields
            .keys()
            .filter(|name| !is_known_field(name))
            .collect();
        if !unknown.is_empty() {
            self.warnings.push(NormalizationWarning::UnrecognizedFields {
                fields: unknown.into_iter().cloned().collect(),
            });
        }
    }
}

fn country_from_list(entries: &[Value]) -> CountryConstraint {
    if entries.is_empty() {
        return CountryConstraint::Unconstrained;
    }

    let raw = entries
        .iter()
        .map(|entry| match entry {
            Value::String(code) => code.trim().to_string(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",");
    let tokens = entries
        .iter()
        .filter_map(Value::as_str)
        .flat_map(market_tokens);

    CountryConstraint::from_markets(tokens, &raw)
}

enum Amount {
    Finite(f64),
    Unbounded,
    Malformed,
}

fn coerce_amount(value: &Value) -> Amount {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let cleaned: String = text
                .chars()
                .filter(|ch| !matches!(ch, '$' | ',' | '_') && !ch.is_whitespace())
                .collect();
            if matches!(
                cleaned.to_ascii_lowercase().as_str(),
                "unbounded" | "unlimited" | "infinity" | "nolimit"
            ) {
                return Amount::Unbounded;
            }
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };

    match parsed {
        Some(amount) if amount.is_finite() && amount >= 0.0 => Amount::Finite(amount),
        Some(amount) if amount == f64::INFINITY => Amount::Unbounded,
        _ => Amount::Malformed,
    }
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match normalize_label(text).as_str() {
            "true" | "yes" | "1" | "active" | "enabled" | "live" => Some(true),
            "false" | "no" | "0" | "inactive" | "disabled" | "archived" | "paused" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Splits on commas that sit outside parentheses, so `Financial Statements (P&L, Balance
/// Sheet)` stays one document.
fn split_document_list(list: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in list.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                names.push(&list[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    names.push(&list[start..]);
    names
}

/// Whole, non-negative counts only; `12.0` is accepted, `2.5` and `"5 years"` are not.
fn coerce_quantity(value: &Value) -> Option<u32> {
    let count = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if count.is_finite() && count >= 0.0 && count.fract() == 0.0 && count <= f64::from(u32::MAX) {
        Some(count as u32)
    } else {
        None
    }
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|value| !value.is_null()))
}
