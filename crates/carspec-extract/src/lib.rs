//! carspec extract: label classification, unit extraction, identity fallback and canonical spec building.

pub mod builder;
pub mod classify;
pub mod conflict;
pub mod engine;
pub mod identity;
pub mod normalize;
pub mod units;

pub use builder::{Completeness, Extraction, Provenance, SpecBuilder};
pub use classify::{classify, classify_label, Basis, Classification, Regime, Target};
pub use conflict::{ConflictResolver, Resolution};
pub use engine::{extract_spec, SourcePage, SpecEngine};
pub use identity::{Identity, IdentitySource};
pub use units::{Measurement, Unit, UnitFamily};
