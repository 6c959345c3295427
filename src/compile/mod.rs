//! Observation compilation.
//!
//! For one (base domain, goal hypothesis, observation sequence) triple the
//! compiler derives two independent planning problems:
//!
//! - the **observation-compliant** problem, whose solutions must execute
//!   the observed actions in exactly the observed order (interleaved with
//!   arbitrary other actions) en route to the goal, and
//! - the **not-observation-compliant** problem, a pure "reach the goal"
//!   baseline that ignores the observations entirely.
//!
//! Order enforcement works through checkpoint fluents: for a sequence of
//! length n the compliant problem carries n+1 fluents `(observed 0)` ..
//! `(observed n)`, where `(observed i)` means "the first i observed actions
//! have occurred, in order". The action matching observation i is replaced
//! by a variant additionally requiring `(observed i-1)` and adding
//! `(observed i)`; checkpoints are never deleted, so progression is
//! monotonic. The checkpoint coupling is the only structural difference
//! between the two problems.

use std::collections::HashMap;

use tracing::debug;

use crate::action::ActionId;
use crate::error::{ExecutionError, PlanrecResult};
use crate::fluent::FluentId;
use crate::hypothesis::GoalHypothesis;
use crate::observation::ObservationSequence;
use crate::problem::{ActionSpec, Problem};

/// Diagnostic tag of the compliant derived problem.
pub const COMPLIANT_TAG: &str = "obs-compliant";
/// Diagnostic tag of the not-compliant derived problem.
pub const NOT_COMPLIANT_TAG: &str = "not-obs-compliant";

/// The two derived problems plus the compliant problem's checkpoint chain.
#[derive(Debug, Clone)]
pub struct CompiledProblems {
    /// Problem whose plans must reproduce the observations in order.
    pub compliant: Problem,
    /// Problem that reaches the goal ignoring the observations.
    pub not_compliant: Problem,
    /// Checkpoint fluent ids `(observed 0)` .. `(observed n)` in the
    /// compliant problem.
    pub checkpoints: Vec<FluentId>,
}

/// Derives the comparison problems for one recognition request.
#[derive(Debug)]
pub struct ObservationCompiler<'a> {
    base: &'a Problem,
    hypothesis: &'a GoalHypothesis,
    observations: &'a ObservationSequence,
}

impl<'a> ObservationCompiler<'a> {
    /// Creates a compiler for one (base, hypothesis, observations) triple.
    ///
    /// # Errors
    /// Returns [`ExecutionError::UnknownAction`] if the sequence refers to
    /// an action not registered in this base problem (a sequence built
    /// against a different problem, for instance).
    pub fn new(
        base: &'a Problem,
        hypothesis: &'a GoalHypothesis,
        observations: &'a ObservationSequence,
    ) -> PlanrecResult<Self> {
        for (_, id) in observations.positions() {
            if !base.contains_action(id) {
                return Err(ExecutionError::UnknownAction { index: id.raw() }.into());
            }
        }
        Ok(Self {
            base,
            hypothesis,
            observations,
        })
    }

    /// Produces the two derived problems.
    ///
    /// Each target starts as a single clone of the base, taken before any
    /// compliance fact exists, so the shared domain is never touched.
    pub fn compile(&self) -> PlanrecResult<CompiledProblems> {
        let not_compliant = self.compile_not_compliant()?;
        let (compliant, checkpoints) = self.compile_compliant()?;

        debug!(
            base = self.base.tag(),
            observations = self.observations.len(),
            compliant_fluents = compliant.fluent_count(),
            compliant_actions = compliant.action_count(),
            not_compliant_actions = not_compliant.action_count(),
            "compiled observation problems"
        );

        Ok(CompiledProblems {
            compliant,
            not_compliant,
            checkpoints,
        })
    }

    fn compile_not_compliant(&self) -> PlanrecResult<Problem> {
        let mut problem = self.base.clone();
        problem.set_tag(NOT_COMPLIANT_TAG);
        problem.set_goal(self.hypothesis.facts().collect())?;
        Ok(problem)
    }

    fn compile_compliant(&self) -> PlanrecResult<(Problem, Vec<FluentId>)> {
        let mut problem = self.base.clone();
        problem.set_tag(COMPLIANT_TAG);

        // Checkpoint chain: (observed 0) .. (observed n).
        let n = self.observations.len();
        let mut checkpoints = Vec::with_capacity(n + 1);
        for i in 0..=n {
            checkpoints.push(problem.add_fluent(format!("(observed {i})"))?);
        }

        // Positions (1-indexed) at which each base action was observed.
        let mut occurrences: HashMap<ActionId, Vec<usize>> = HashMap::new();
        for (position, id) in self.observations.positions() {
            occurrences.entry(id).or_default().push(position);
        }

        problem.map_actions(|action| match occurrences.get(&action.id()) {
            None => vec![ActionSpec::of(action)],
            Some(positions) => positions
                .iter()
                .map(|&i| {
                    let mut spec = ActionSpec::of(action);
                    spec.signature = format!("{} [obs {i}]", action.signature());
                    spec.pre.push(checkpoints[i - 1]);
                    spec.add.push(checkpoints[i]);
                    spec
                })
                .collect(),
        });

        let mut init = self.base.initial_state().clone();
        init.insert(checkpoints[0]);
        problem.set_initial_state(init)?;

        let mut goal: Vec<FluentId> = self.hypothesis.facts().collect();
        goal.push(checkpoints[n]);
        problem.set_goal(goal)?;

        Ok((problem, checkpoints))
    }
}
