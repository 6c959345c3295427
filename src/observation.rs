//! Observation sequences.
//!
//! An observation sequence is the time-ordered list of grounded actions the
//! observed agent was seen to execute. Every entry must refer to an action
//! already registered in the base problem; referencing anything else is a
//! usage-contract violation and fails fast at construction time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionId;
use crate::error::{ExecutionError, PlanrecResult};
use crate::problem::Problem;
use crate::world::operator::Operator;

/// An immutable, time-ordered sequence of observed grounded actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSequence {
    steps: Vec<ActionId>,
}

impl ObservationSequence {
    /// Creates a sequence over actions of the given base problem.
    ///
    /// An empty sequence is legal: the compiled compliant problem then
    /// carries a single checkpoint that is both asserted at init and
    /// required at goal, constraining nothing.
    ///
    /// # Errors
    /// Returns [`ExecutionError::UnknownAction`] if a step refers to an
    /// action the base problem has not registered.
    pub fn new(base: &Problem, steps: Vec<ActionId>) -> PlanrecResult<Self> {
        for id in &steps {
            if !base.contains_action(*id) {
                return Err(ExecutionError::UnknownAction { index: id.raw() }.into());
            }
        }
        Ok(Self { steps })
    }

    /// Creates a sequence from operator instances, in the order given.
    ///
    /// # Errors
    /// - [`ExecutionError::ActionNotGrounded`] if an operator has not been
    ///   grounded via `make_strips_action` yet.
    /// - [`ExecutionError::UnknownAction`] if an operator was grounded into
    ///   a different problem.
    pub fn from_operators<'a, I>(base: &Problem, operators: I) -> PlanrecResult<Self>
    where
        I: IntoIterator<Item = &'a Operator>,
    {
        let mut steps = Vec::new();
        for operator in operators {
            let id = operator.action_id().ok_or_else(|| {
                ExecutionError::ActionNotGrounded {
                    signature: operator.signature().to_string(),
                }
            })?;
            steps.push(id);
        }
        Self::new(base, steps)
    }

    /// Returns the observed action ids in temporal order.
    #[must_use]
    pub fn steps(&self) -> &[ActionId] {
        &self.steps
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates `(position, action)` pairs, positions starting at 1 to
    /// match checkpoint numbering.
    pub fn positions(&self) -> impl Iterator<Item = (usize, ActionId)> + '_ {
        self.steps.iter().enumerate().map(|(i, id)| (i + 1, *id))
    }
}

impl fmt::Display for ObservationSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, id) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "]")
    }
}
