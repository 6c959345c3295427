//! Goal hypotheses.
//!
//! A goal hypothesis is the fact set an observed agent is conjectured to be
//! pursuing. It is supplied by the caller and immutable for the lifetime of
//! one recognition request.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlanrecResult, ValidationError};
use crate::fluent::FluentId;
use crate::problem::Problem;

/// An immutable conjunction of goal facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalHypothesis {
    facts: BTreeSet<FluentId>,
}

impl GoalHypothesis {
    /// Creates a hypothesis over fluents of the given base problem.
    ///
    /// # Errors
    /// - [`ValidationError::EmptyGoalHypothesis`] if no facts are given.
    /// - [`ValidationError::UnknownFluent`] if a fact is not registered in
    ///   the base problem.
    pub fn new<I>(base: &Problem, facts: I) -> PlanrecResult<Self>
    where
        I: IntoIterator<Item = FluentId>,
    {
        let facts: BTreeSet<FluentId> = facts.into_iter().collect();
        if facts.is_empty() {
            return Err(ValidationError::EmptyGoalHypothesis.into());
        }
        for f in &facts {
            if !base.contains_fluent(*f) {
                return Err(ValidationError::UnknownFluent { index: f.raw() }.into());
            }
        }
        Ok(Self { facts })
    }

    /// Iterates the goal facts in ascending id order.
    pub fn facts(&self) -> impl Iterator<Item = FluentId> + '_ {
        self.facts.iter().copied()
    }

    /// Returns the number of goal facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// A hypothesis is never empty; this exists for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns true if the fluent is part of the hypothesis.
    #[must_use]
    pub fn contains(&self, fluent: FluentId) -> bool {
        self.facts.contains(&fluent)
    }
}

impl fmt::Display for GoalHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{fact}")?;
        }
        write!(f, "}}")
    }
}
