//! carspec core: canonical specification record, slot identifiers, configuration.

pub mod config;
pub mod error;
pub mod spec;

pub use config::{ConflictPolicy, EngineConfig};
pub use error::{Error, Result};
pub use spec::{CanonicalSpec, RawEntry, RawSpecifications, Slot, SpecSlots};
