//! oncoact-common — Shared types, errors, and configuration used across all Oncoact crates.

pub mod error;
pub mod profile;
pub mod knowledge;
pub mod matching_config;

// Re-export commonly used types
pub use error::{OncoactError, Result};
pub use matching_config::MatchingConfig;
pub use profile::{DriverId, DriverRef, MolecularProfile};
pub use knowledge::{Criterion, KnowledgeBase, LeafPredicate};
