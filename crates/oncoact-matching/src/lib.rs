//! oncoact-matching — Actionability matching engine.
//!
//! Decides which knowledge-base evidence and trial records a patient's
//! molecular profile satisfies, credits the driver instances responsible,
//! classifies cancer-type applicability and assembles the clinical view.

pub mod leaf;
pub mod outcome;
pub mod criterion;
pub mod actionability;
pub mod ontology;
pub mod applicability;
pub mod clinical;
pub mod indirect;

pub use actionability::{ActionabilityMatch, ActionabilityMatcher, ActionabilityMatches, TrialMatch};
pub use applicability::{CancerTypeApplicability, CancerTypeResolver};
pub use clinical::{
    ClinicalEvidence, ClinicalEvidenceAssembler, DriverClinicalEvidence, EligibleTrial, PatientClinicalView, TreatmentEvidence,
};
pub use criterion::{evaluate_criterion, CriterionMatch};
pub use indirect::IndirectEvidenceMatcher;
pub use leaf::SatisfiedBy;
pub use ontology::OntologyIndex;
pub use outcome::MatchOutcome;
