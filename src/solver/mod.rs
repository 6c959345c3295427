//! Planner interface.
//!
//! Optimal STRIPS solving is a service consumed behind a narrow trait. The
//! crate ships two implementations: [`search::BlindSearchPlanner`], an
//! embedded cost-optimal search, and [`fixed::FixedOutcomePlanner`], which
//! replays scripted outcomes for tests.
//!
//! "Unsolvable" is a normal outcome, never an error: it becomes an infinite
//! cost and zero probability mass downstream.

pub mod fixed;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::action::ActionId;
use crate::error::PlanrecResult;
use crate::problem::Problem;

/// Result of solving one planning problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SolveOutcome {
    /// An optimal plan was found.
    Solved {
        /// Total plan cost (sum of unit action costs).
        cost: f64,
        /// One optimal plan, as action ids of the solved problem.
        plan: Vec<ActionId>,
    },

    /// No plan reaches the goal. A normal outcome, not a fault.
    Unsolvable,
}

impl SolveOutcome {
    /// Returns the plan cost, infinite when unsolvable.
    #[must_use]
    pub fn cost(&self) -> f64 {
        match self {
            Self::Solved { cost, .. } => *cost,
            Self::Unsolvable => f64::INFINITY,
        }
    }

    /// Returns true if a plan was found.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

/// An optimal/heuristic STRIPS planner.
pub trait Planner: Send + Sync {
    /// Solves the problem to optimality.
    ///
    /// # Errors
    /// Implementation-specific resource errors (e.g. an exceeded search
    /// bound). Unsolvability is **not** an error.
    fn solve(&self, problem: &Problem) -> PlanrecResult<SolveOutcome>;
}
