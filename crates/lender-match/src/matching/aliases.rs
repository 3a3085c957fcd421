//! Ordered legacy field names for every canonical product field.
//!
//! The upstream catalog has renamed its fields several times. Each canonical field lists the
//! spellings it has been seen under, newest first; the first alias holding a non-null value
//! wins. The first alias is always the canonical camelCase name so an already-normalized
//! record resolves to itself.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Id,
    Name,
    LenderName,
    Country,
    Category,
    CategoryLabel,
    Description,
    MinAmount,
    MaxAmount,
    Active,
    RequiredDocuments,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::Id,
        CanonicalField::Name,
        CanonicalField::LenderName,
        CanonicalField::Country,
        CanonicalField::Category,
        CanonicalField::CategoryLabel,
        CanonicalField::Description,
        CanonicalField::MinAmount,
        CanonicalField::MaxAmount,
        CanonicalField::Active,
        CanonicalField::RequiredDocuments,
    ];

    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Id => &["id", "productId", "product_id", "uuid"],
            CanonicalField::Name => &[
                "name",
                "productName",
                "product_name",
                "product",
                "title",
            ],
            CanonicalField::LenderName => &["lenderName", "lender_name", "lender", "provider"],
            CanonicalField::Country => &[
                "country",
                "countryCode",
                "country_code",
                "geography",
                "region",
            ],
            CanonicalField::Category => &[
                "category",
                "productCategory",
                "product_category",
                "productType",
                "product_type",
                "type",
            ],
            CanonicalField::CategoryLabel => &[
                "categoryLabel",
                "category_label",
                "categoryName",
                "category_name",
            ],
            CanonicalField::Description => &[
                "description",
                "productDescription",
                "product_description",
                "summary",
            ],
            CanonicalField::MinAmount => &[
                "minAmount",
                "amountMin",
                "min_amount",
                "amount_min",
                "minAmountUsd",
                "fundingMin",
                "loanMin",
            ],
            CanonicalField::MaxAmount => &[
                "maxAmount",
                "amountMax",
                "max_amount",
                "amount_max",
                "maxAmountUsd",
                "fundingMax",
                "loanMax",
            ],
            CanonicalField::Active => &["active", "isActive", "is_active", "enabled", "status"],
            CanonicalField::RequiredDocuments => &[
                "requiredDocuments",
                "required_documents",
                "documentRequirements",
                "doc_requirements",
                "documents",
            ],
        }
    }

    pub const fn name(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Returns the first alias of `field` present in `record` with a non-null value.
pub(crate) fn resolve(
    record: &Map<String, Value>,
    field: CanonicalField,
) -> Option<(&'static str, &Value)> {
    field.aliases().iter().find_map(|alias| {
        record
            .get(*alias)
            .filter(|value| !value.is_null())
            .map(|value| (*alias, value))
    })
}

static KNOWN_FIELDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

pub(crate) fn is_known_field(name: &str) -> bool {
    KNOWN_FIELDS
        .get_or_init(|| {
            CanonicalField::ALL
                .iter()
                .flat_map(|field| field.aliases().iter().copied())
                .collect()
        })
        .contains(name)
}
