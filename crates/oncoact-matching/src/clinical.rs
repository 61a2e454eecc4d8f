//! Patient-facing clinical evidence.
//!
//! Turns the per-driver match map into on-label / off-label treatment
//! evidence and eligible trials. Evidence is deduplicated by
//! (treatment, level, direction); trials sharing an external id are merged.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use oncoact_common::knowledge::{EfficacyEvidence, EvidenceDirection, EvidenceLevel, Indication};
use oncoact_common::profile::DriverId;

use crate::actionability::{ActionabilityMatch, ActionabilityMatches, TrialMatch};
use crate::applicability::{CancerTypeApplicability, CancerTypeResolver};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentEvidence {
    pub treatment: String,
    pub drug_classes: BTreeSet<String>,
    pub level: EvidenceLevel,
    pub direction: EvidenceDirection,
    pub source: String,
    pub source_event: String,
    pub indication: Indication,
    pub applicability: CancerTypeApplicability,
}

impl TreatmentEvidence {
    fn from_evidence(evidence: &EfficacyEvidence, applicability: CancerTypeApplicability) -> Self {
        Self {
            treatment: evidence.treatment.name.clone(),
            drug_classes: evidence.treatment.drug_classes.clone(),
            level: evidence.level,
            direction: evidence.direction,
            source: evidence.source.clone(),
            source_event: evidence.criterion.source_event().to_string(),
            indication: evidence.indication.clone(),
            applicability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibleTrial {
    pub nct_id: String,
    pub title: String,
    pub acronym: Option<String>,
    pub therapy_names: Vec<String>,
    pub countries: BTreeSet<String>,
    pub on_label: bool,
    /// Indices into the trial's criteria list.
    pub matched_criteria: BTreeSet<usize>,
    pub matched_events: BTreeSet<String>,
    pub drivers: BTreeSet<DriverId>,
}

impl EligibleTrial {
    fn from_match(driver: DriverId, trial_match: &TrialMatch, resolver: &CancerTypeResolver) -> Self {
        let trial = &trial_match.trial;
        Self {
            nct_id: trial.nct_id.clone(),
            title: trial.title.clone(),
            acronym: trial.acronym.clone(),
            therapy_names: trial.therapy_names.clone(),
            countries: trial.countries.clone(),
            on_label: trial.indications.iter().any(|i| resolver.is_on_label(i)),
            matched_criteria: trial_match.criteria.clone(),
            matched_events: trial_match.matched_criteria().map(|c| c.source_event().to_string()).collect(),
            drivers: BTreeSet::from([driver]),
        }
    }

    fn merge(&mut self, other: EligibleTrial) {
        self.matched_criteria.extend(other.matched_criteria);
        self.matched_events.extend(other.matched_events);
        self.drivers.extend(other.drivers);
    }
}

/// Clinical evidence credited to a single driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClinicalEvidence {
    pub on_label: Vec<TreatmentEvidence>,
    pub off_label: Vec<TreatmentEvidence>,
    /// Sorted by trial id.
    pub eligible_trials: Vec<EligibleTrial>,
}

impl ClinicalEvidence {
    pub fn is_empty(&self) -> bool {
        self.on_label.is_empty() && self.off_label.is_empty() && self.eligible_trials.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverClinicalEvidence {
    pub driver: DriverId,
    pub evidence: ClinicalEvidence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientClinicalView {
    /// One entry per matched driver, in driver order.
    pub per_driver: Vec<DriverClinicalEvidence>,
    pub on_label_trials: Vec<EligibleTrial>,
    pub off_label_trials: Vec<EligibleTrial>,
}

impl PatientClinicalView {
    pub fn get(&self, driver: DriverId) -> Option<&ClinicalEvidence> {
        self.per_driver
            .iter()
            .find(|entry| entry.driver == driver)
            .map(|entry| &entry.evidence)
    }
}

pub struct ClinicalEvidenceAssembler;

impl ClinicalEvidenceAssembler {
    pub fn assemble(matches: &ActionabilityMatches, resolver: &CancerTypeResolver) -> PatientClinicalView {
        let per_driver: Vec<DriverClinicalEvidence> = matches
            .iter()
            .map(|(&driver, matched)| DriverClinicalEvidence {
                driver,
                evidence: Self::for_driver(driver, matched, resolver),
            })
            .collect();

        let mut trials: BTreeMap<String, EligibleTrial> = BTreeMap::new();
        for entry in &per_driver {
            for trial in &entry.evidence.eligible_trials {
                match trials.get_mut(&trial.nct_id) {
                    Some(existing) => existing.merge(trial.clone()),
                    None => {
                        trials.insert(trial.nct_id.clone(), trial.clone());
                    }
                }
            }
        }
        let (on_label_trials, off_label_trials): (Vec<_>, Vec<_>) = trials.into_values().partition(|t| t.on_label);

        debug!(
            drivers = per_driver.len(),
            on_label_trials = on_label_trials.len(),
            off_label_trials = off_label_trials.len(),
            "Clinical evidence assembled"
        );

        PatientClinicalView { per_driver, on_label_trials, off_label_trials }
    }

    fn for_driver(driver: DriverId, matched: &ActionabilityMatch, resolver: &CancerTypeResolver) -> ClinicalEvidence {
        let mut on_label = Vec::new();
        let mut off_label = Vec::new();
        for evidence in &matched.evidences {
            let applicability = resolver.resolve(&evidence.indication);
            let treatment = TreatmentEvidence::from_evidence(evidence, applicability);
            if applicability.is_on_label() {
                on_label.push(treatment);
            } else {
                off_label.push(treatment);
            }
        }

        // `trials` is keyed by id, so this is already sorted.
        let eligible_trials = matched
            .trials
            .values()
            .map(|trial_match| EligibleTrial::from_match(driver, trial_match, resolver))
            .collect();

        ClinicalEvidence {
            on_label: dedup_first(on_label),
            off_label: dedup_first(off_label),
            eligible_trials,
        }
    }
}

fn dedup_first(evidence: Vec<TreatmentEvidence>) -> Vec<TreatmentEvidence> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(evidence.len());
    for item in evidence {
        let key = (item.treatment.clone(), item.level, item.direction);
        if seen.insert(key) {
            kept.push(item);
        }
    }
    kept
}
