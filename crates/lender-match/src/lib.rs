//! Lender product matching and document requirement aggregation.
//!
//! The [`matching`] module holds the engine: catalog records are normalized into
//! [`matching::CanonicalProduct`] values, filtered and scored against an
//! [`matching::ApplicantRequest`], and the required documents of every eligible product are
//! folded into a single deduplicated checklist.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
