//! Result algebra for partial matches.
//!
//! `Success` carries the payload gathered so far; `Failure` means a required
//! part had no match at all. Joint results fail as soon as any part fails,
//! while independent streams are unioned.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchOutcome<T> {
    Success(Vec<T>),
    Failure,
}

impl<T> MatchOutcome<T> {
    pub fn empty() -> Self {
        MatchOutcome::Success(Vec::new())
    }

    /// `Success` for a non-empty payload, `Failure` otherwise.
    pub fn from_matches(matches: Vec<T>) -> Self {
        if matches.is_empty() {
            MatchOutcome::Failure
        } else {
            MatchOutcome::Success(matches)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MatchOutcome::Success(_))
    }

    /// Joint combination: no inputs is an empty success, any failure fails,
    /// otherwise payloads are concatenated in input order.
    pub fn combine<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = MatchOutcome<T>>,
    {
        outcomes.into_iter().fold(Self::empty(), |acc, next| match (acc, next) {
            (MatchOutcome::Success(mut left), MatchOutcome::Success(right)) => {
                left.extend(right);
                MatchOutcome::Success(left)
            }
            _ => MatchOutcome::Failure,
        })
    }

    /// Independent combination: a failing side contributes nothing.
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (MatchOutcome::Success(mut left), MatchOutcome::Success(right)) => {
                left.extend(right);
                MatchOutcome::Success(left)
            }
            (MatchOutcome::Success(left), MatchOutcome::Failure) => MatchOutcome::Success(left),
            (MatchOutcome::Failure, MatchOutcome::Success(right)) => MatchOutcome::Success(right),
            (MatchOutcome::Failure, MatchOutcome::Failure) => MatchOutcome::Failure,
        }
    }

    pub fn into_matches(self) -> Vec<T> {
        match self {
            MatchOutcome::Success(matches) => matches,
            MatchOutcome::Failure => Vec::new(),
        }
    }
}
