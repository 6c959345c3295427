//! Scripted planner for tests.
//!
//! Maps problem tags to prescribed outcomes so coordination and likelihood
//! logic can be exercised with pinned costs and without real search.

use std::collections::HashMap;

use crate::error::{ExecutionError, PlanrecResult};
use crate::problem::Problem;
use crate::solver::{Planner, SolveOutcome};

/// A planner that replays prescribed outcomes, keyed by problem tag.
#[derive(Debug, Default)]
pub struct FixedOutcomePlanner {
    outcomes: HashMap<String, SolveOutcome>,
}

impl FixedOutcomePlanner {
    /// Creates an empty scripted planner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prescribes the outcome returned for problems carrying `tag`.
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, outcome: SolveOutcome) -> Self {
        self.outcomes.insert(tag.into(), outcome);
        self
    }

    /// Prescribes a solved outcome of the given cost (empty plan).
    #[must_use]
    pub fn with_cost(self, tag: impl Into<String>, cost: f64) -> Self {
        self.with(
            tag,
            SolveOutcome::Solved {
                cost,
                plan: Vec::new(),
            },
        )
    }

    /// Prescribes an unsolvable outcome.
    #[must_use]
    pub fn with_unsolvable(self, tag: impl Into<String>) -> Self {
        self.with(tag, SolveOutcome::Unsolvable)
    }
}

impl Planner for FixedOutcomePlanner {
    fn solve(&self, problem: &Problem) -> PlanrecResult<SolveOutcome> {
        self.outcomes
            .get(problem.tag())
            .cloned()
            .ok_or_else(|| {
                ExecutionError::UnscriptedProblem {
                    tag: problem.tag().to_string(),
                }
                .into()
            })
    }
}
