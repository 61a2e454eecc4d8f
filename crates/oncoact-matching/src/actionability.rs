//! Actionability matching across the whole knowledge base.
//!
//! Runs the criterion evaluator for every evidence record and for every
//! criterion of every trial, and folds the outcomes into a per-driver map of
//! matched evidence and trials. The fold produces a fresh value per call, so a
//! single matcher can serve any number of patients concurrently.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use oncoact_common::knowledge::{ActionableTrial, Criterion, EfficacyEvidence};
use oncoact_common::profile::{DriverId, MolecularProfile};
use oncoact_common::{KnowledgeBase, MatchingConfig};

use crate::criterion::evaluate_criterion;
use crate::outcome::MatchOutcome;

/// A trial together with the indices of its criteria that matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialMatch {
    pub trial: ActionableTrial,
    pub criteria: BTreeSet<usize>,
}

impl TrialMatch {
    pub fn matched_criteria(&self) -> impl Iterator<Item = &Criterion> + '_ {
        self.criteria.iter().filter_map(|&i| self.trial.criteria.get(i))
    }

    fn merge(&mut self, other: TrialMatch) {
        self.criteria.extend(other.criteria);
    }
}

/// Everything one driver instance has been credited with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionabilityMatch {
    /// Matched evidence in knowledge-base order.
    pub evidences: Vec<EfficacyEvidence>,
    /// Matched trials keyed by external trial id.
    pub trials: BTreeMap<String, TrialMatch>,
}

impl ActionabilityMatch {
    fn merge(&mut self, other: ActionabilityMatch) {
        self.evidences.extend(other.evidences);
        for (nct_id, trial_match) in other.trials {
            match self.trials.get_mut(&nct_id) {
                Some(existing) => existing.merge(trial_match),
                None => {
                    self.trials.insert(nct_id, trial_match);
                }
            }
        }
    }
}

/// Per-driver match map for one patient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionabilityMatches {
    by_driver: BTreeMap<DriverId, ActionabilityMatch>,
}

impl ActionabilityMatches {
    pub fn get(&self, driver: DriverId) -> Option<&ActionabilityMatch> {
        self.by_driver.get(&driver)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DriverId, &ActionabilityMatch)> {
        self.by_driver.iter()
    }

    pub fn drivers(&self) -> impl Iterator<Item = DriverId> + '_ {
        self.by_driver.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_driver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_driver.is_empty()
    }

    pub fn evidence_count(&self) -> usize {
        self.by_driver.values().map(|m| m.evidences.len()).sum()
    }

    pub fn trial_count(&self) -> usize {
        self.by_driver.values().map(|m| m.trials.len()).sum()
    }

    fn credit_evidence(mut self, drivers: &[DriverId], evidence: &EfficacyEvidence) -> Self {
        for driver in drivers {
            self.by_driver.entry(*driver).or_default().evidences.push(evidence.clone());
        }
        self
    }

    fn credit_trial(mut self, drivers: &[DriverId], trial: &ActionableTrial, criterion_index: usize) -> Self {
        for driver in drivers {
            self.by_driver
                .entry(*driver)
                .or_default()
                .trials
                .entry(trial.nct_id.clone())
                .or_insert_with(|| TrialMatch { trial: trial.clone(), criteria: BTreeSet::new() })
                .criteria
                .insert(criterion_index);
        }
        self
    }

    /// Merge two independently computed match maps. Evidence lists are
    /// appended (`self` first) and trial criteria are unioned.
    pub fn union(mut self, other: ActionabilityMatches) -> Self {
        for (driver, matched) in other.by_driver {
            self.by_driver.entry(driver).or_default().merge(matched);
        }
        self
    }
}

/// Matches molecular profiles against a shared, read-only knowledge base.
#[derive(Debug, Clone)]
pub struct ActionabilityMatcher {
    knowledge_base: Arc<KnowledgeBase>,
    config: MatchingConfig,
}

impl ActionabilityMatcher {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, config: MatchingConfig) -> Self {
        Self { knowledge_base, config }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Match every evidence record and every trial criterion against `profile`.
    pub fn match_profile(&self, profile: &MolecularProfile) -> ActionabilityMatches {
        let matches = self.match_evidence_only(profile).union(self.match_trials_only(profile));
        info!(
            sample = %profile.sample_id,
            drivers = matches.len(),
            evidences = matches.evidence_count(),
            trials = matches.trial_count(),
            "Actionability matching complete"
        );
        matches
    }

    pub fn match_evidence_only(&self, profile: &MolecularProfile) -> ActionabilityMatches {
        self.knowledge_base
            .evidences()
            .iter()
            .fold(ActionabilityMatches::default(), |acc, evidence| {
                match evaluate_criterion(&evidence.criterion, profile, &self.config) {
                    MatchOutcome::Success(drivers) => {
                        debug!(
                            event = evidence.criterion.source_event(),
                            treatment = %evidence.treatment.name,
                            contributors = drivers.len(),
                            "Evidence criterion satisfied"
                        );
                        acc.credit_evidence(&drivers, evidence)
                    }
                    MatchOutcome::Failure => acc,
                }
            })
    }

    pub fn match_trials_only(&self, profile: &MolecularProfile) -> ActionabilityMatches {
        self.knowledge_base
            .trials()
            .iter()
            .flat_map(|trial| trial.criteria.iter().enumerate().map(move |(i, c)| (trial, i, c)))
            .fold(ActionabilityMatches::default(), |acc, (trial, index, criterion)| {
                match evaluate_criterion(criterion, profile, &self.config) {
                    MatchOutcome::Success(drivers) => {
                        debug!(
                            trial = %trial.nct_id,
                            criterion = index,
                            contributors = drivers.len(),
                            "Trial criterion satisfied"
                        );
                        acc.credit_trial(&drivers, trial, index)
                    }
                    MatchOutcome::Failure => acc,
                }
            })
    }

    /// Match many patients in parallel; output order follows input order.
    pub fn match_cohort(&self, profiles: &[MolecularProfile]) -> Vec<ActionabilityMatches> {
        profiles.par_iter().map(|profile| self.match_profile(profile)).collect()
    }
}
