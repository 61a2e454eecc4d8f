//! Cancer-type applicability of a knowledge-base indication for one patient.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use oncoact_common::knowledge::Indication;

use crate::ontology::OntologyIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancerTypeApplicability {
    /// Indication covers one of the patient's tumor types.
    SpecificType,
    /// Indication is the ontology root, i.e. tumor agnostic.
    AllTypes,
    OtherType,
}

impl CancerTypeApplicability {
    pub fn is_on_label(self) -> bool {
        matches!(self, CancerTypeApplicability::SpecificType | CancerTypeApplicability::AllTypes)
    }
}

/// Resolves indications against one patient's tumor ontology codes.
#[derive(Debug, Clone)]
pub struct CancerTypeResolver {
    ontology: Arc<OntologyIndex>,
    patient_codes: BTreeSet<String>,
}

impl CancerTypeResolver {
    pub fn new(ontology: Arc<OntologyIndex>, patient_codes: BTreeSet<String>) -> Self {
        for code in patient_codes.iter().filter(|c| !ontology.contains(c)) {
            warn!(code = %code, "Patient tumor code not in ontology; matches only itself");
        }
        Self { ontology, patient_codes }
    }

    pub fn patient_codes(&self) -> &BTreeSet<String> {
        &self.patient_codes
    }

    pub fn resolve(&self, indication: &Indication) -> CancerTypeApplicability {
        // Excluded subtypes win over everything, including a root indication.
        let excluded = indication
            .excluded_subtypes
            .iter()
            .any(|subtype| self.covers_patient(&subtype.code));
        if excluded {
            return CancerTypeApplicability::OtherType;
        }

        let code = &indication.applicable.code;
        if self.ontology.is_root(code) {
            CancerTypeApplicability::AllTypes
        } else if self.covers_patient(code) {
            CancerTypeApplicability::SpecificType
        } else {
            CancerTypeApplicability::OtherType
        }
    }

    pub fn is_on_label(&self, indication: &Indication) -> bool {
        self.resolve(indication).is_on_label()
    }

    fn covers_patient(&self, ancestor: &str) -> bool {
        self.patient_codes
            .iter()
            .any(|code| self.ontology.is_in_subtree(ancestor, code))
    }
}
