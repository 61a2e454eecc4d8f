//! Criterion conjunction evaluation.
//! A criterion holds only if every predicate is satisfied by some driver in
//! the profile; when it holds, every driver satisfying any predicate is credited.

use std::collections::BTreeSet;

use oncoact_common::profile::{DriverId, MolecularProfile};
use oncoact_common::{Criterion, LeafPredicate, MatchingConfig};

use crate::leaf::SatisfiedBy;
use crate::outcome::MatchOutcome;

/// Boolean/set view of a criterion evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionMatch {
    pub satisfied: bool,
    pub contributors: BTreeSet<DriverId>,
}

impl From<MatchOutcome<DriverId>> for CriterionMatch {
    fn from(outcome: MatchOutcome<DriverId>) -> Self {
        match outcome {
            MatchOutcome::Success(drivers) => Self { satisfied: true, contributors: drivers.into_iter().collect() },
            MatchOutcome::Failure => Self { satisfied: false, contributors: BTreeSet::new() },
        }
    }
}

/// Drivers in `profile` satisfying a single predicate, in profile order.
pub fn satisfying_drivers(
    predicate: &LeafPredicate,
    profile: &MolecularProfile,
    config: &MatchingConfig,
) -> Vec<DriverId> {
    profile
        .drivers()
        .filter(|(_, driver)| predicate.satisfied_by(*driver, config))
        .map(|(id, _)| id)
        .collect()
}

/// Evaluate a criterion against the whole profile. All-or-nothing: a single
/// unsatisfied predicate fails the criterion and credits nobody.
pub fn evaluate_criterion(
    criterion: &Criterion,
    profile: &MolecularProfile,
    config: &MatchingConfig,
) -> MatchOutcome<DriverId> {
    let per_predicate = criterion
        .predicates()
        .iter()
        .map(|predicate| MatchOutcome::from_matches(satisfying_drivers(predicate, profile, config)));

    match MatchOutcome::combine(per_predicate) {
        MatchOutcome::Success(drivers) => {
            // Credit each driver once, in profile order.
            let unique: BTreeSet<DriverId> = drivers.into_iter().collect();
            MatchOutcome::Success(unique.into_iter().collect())
        }
        MatchOutcome::Failure => MatchOutcome::Failure,
    }
}
