//! Relaxed-reachability pre-check.
//!
//! Before a problem is handed to the full planner, a delete-free closure
//! decides whether every goal fact is reachable at all. Reachability under
//! the relaxation is a necessary condition for solvability, so a failed
//! check certifies the problem unsolvable without any search.

use std::collections::BTreeSet;

use crate::fluent::FluentId;
use crate::problem::Problem;

/// Decides goal reachability for a problem. The production implementation
/// is the relaxed closure below; tests substitute scripted oracles to force
/// a branch unsolvable.
pub trait ReachabilityOracle: Send + Sync {
    /// Returns false only if the problem is certainly unsolvable.
    fn is_goal_reachable(&self, problem: &Problem) -> bool;
}

/// Delete-free reachability closure.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelaxedReachability;

impl ReachabilityOracle for RelaxedReachability {
    fn is_goal_reachable(&self, problem: &Problem) -> bool {
        let reached = reachable_fluents(problem);
        problem.goal().iter().all(|f| reached.contains(f))
    }
}

/// Computes the set of fluents reachable from the initial state when delete
/// effects are ignored: repeatedly apply any action whose precondition is
/// already reachable and collect its add effects, to fixpoint.
#[must_use]
pub fn reachable_fluents(problem: &Problem) -> BTreeSet<FluentId> {
    let mut reached: BTreeSet<FluentId> = problem.initial_state().iter().collect();
    let mut applied = vec![false; problem.action_count()];

    loop {
        let mut grew = false;
        for action in problem.actions() {
            if applied[action.id().index()] {
                continue;
            }
            if action.pre().iter().all(|f| reached.contains(f)) {
                applied[action.id().index()] = true;
                grew = true;
                for f in action.add() {
                    reached.insert(*f);
                }
            }
        }
        if !grew {
            break;
        }
    }

    reached
}
