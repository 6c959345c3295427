//! Embedded cost-optimal planner.
//!
//! A blind uniform-cost search over full states. With unit action costs
//! this is breadth-first search, and the first time the goal is generated
//! the plan is cost-optimal. The frontier is bounded by a configurable
//! expansion limit; exceeding the limit is a typed error, because running
//! out of budget proves nothing about solvability. Exhausting the frontier
//! does, and yields [`SolveOutcome::Unsolvable`].

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::action::ActionId;
use crate::error::{ExecutionError, PlanrecResult};
use crate::problem::Problem;
use crate::solver::{Planner, SolveOutcome};
use crate::state::State;

/// Configuration for [`BlindSearchPlanner`].
#[derive(Debug, Clone)]
pub struct BlindSearchConfig {
    /// Maximum number of states dequeued for expansion before the search
    /// gives up with an error.
    pub max_expanded_states: usize,
}

impl Default for BlindSearchConfig {
    fn default() -> Self {
        Self {
            max_expanded_states: 250_000,
        }
    }
}

/// Breadth-first cost-optimal planner over unit-cost STRIPS problems.
#[derive(Debug, Default)]
pub struct BlindSearchPlanner {
    config: BlindSearchConfig,
}

impl BlindSearchPlanner {
    /// Creates a planner with the given configuration.
    #[must_use]
    pub fn new(config: BlindSearchConfig) -> Self {
        Self { config }
    }

    fn extract_plan(
        parents: &HashMap<State, Option<(State, ActionId)>>,
        mut state: State,
    ) -> Vec<ActionId> {
        let mut plan = Vec::new();
        while let Some(Some((parent, action))) = parents.get(&state) {
            plan.push(*action);
            state = parent.clone();
        }
        plan.reverse();
        plan
    }
}

impl Planner for BlindSearchPlanner {
    fn solve(&self, problem: &Problem) -> PlanrecResult<SolveOutcome> {
        let init = problem.initial_state().clone();
        if init.satisfies(problem.goal()) {
            return Ok(SolveOutcome::Solved {
                cost: 0.0,
                plan: Vec::new(),
            });
        }

        let mut parents: HashMap<State, Option<(State, ActionId)>> = HashMap::new();
        parents.insert(init.clone(), None);

        let mut frontier: VecDeque<State> = VecDeque::new();
        frontier.push_back(init);

        let mut expanded = 0usize;
        while let Some(state) = frontier.pop_front() {
            expanded += 1;
            if expanded > self.config.max_expanded_states {
                return Err(ExecutionError::SearchLimitExceeded {
                    limit: self.config.max_expanded_states,
                }
                .into());
            }

            for action in problem.actions() {
                if !state.enables(action) {
                    continue;
                }
                let successor = state.apply(action);
                if parents.contains_key(&successor) {
                    continue;
                }
                parents.insert(successor.clone(), Some((state.clone(), action.id())));

                if successor.satisfies(problem.goal()) {
                    let plan = Self::extract_plan(&parents, successor);
                    let cost: f64 = plan
                        .iter()
                        .filter_map(|id| problem.action(*id))
                        .map(crate::action::Action::cost)
                        .sum();
                    debug!(
                        tag = problem.tag(),
                        expanded,
                        cost,
                        plan_len = plan.len(),
                        "search found optimal plan"
                    );
                    return Ok(SolveOutcome::Solved { cost, plan });
                }
                frontier.push_back(successor);
            }
        }

        debug!(tag = problem.tag(), expanded, "search exhausted frontier");
        Ok(SolveOutcome::Unsolvable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two rooms, one ball in the far room; agent starts in the kitchen.
    fn ferry_problem(goal: &[&str]) -> Problem {
        let mut p = Problem::new("ferry");
        let at_kitchen = p.add_fluent("(agent-at kitchen)").unwrap();
        let at_hall = p.add_fluent("(agent-at hall)").unwrap();
        let ball_hall = p.add_fluent("(item-at ball hall)").unwrap();
        let ball_kitchen = p.add_fluent("(item-at ball kitchen)").unwrap();
        let carrying = p.add_fluent("(carrying ball)").unwrap();

        p.add_action(
            "(move-to kitchen hall)",
            vec![at_kitchen],
            vec![at_hall],
            vec![at_kitchen],
        );
        p.add_action(
            "(move-to hall kitchen)",
            vec![at_hall],
            vec![at_kitchen],
            vec![at_hall],
        );
        p.add_action(
            "(pick-up ball hall)",
            vec![at_hall, ball_hall],
            vec![carrying],
            vec![ball_hall],
        );
        p.add_action(
            "(drop-off ball kitchen)",
            vec![at_kitchen, carrying],
            vec![ball_kitchen],
            vec![carrying],
        );

        p.set_initial_state([at_kitchen, ball_hall].into_iter().collect())
            .unwrap();
        p.set_goal(goal.iter().map(|n| p.fluent_named(n).unwrap()).collect())
            .unwrap();
        p
    }

    #[test]
    fn test_finds_optimal_plan() {
        // move, pick-up, move back, drop-off: cost 4.
        let p = ferry_problem(&["(item-at ball kitchen)"]);
        let outcome = BlindSearchPlanner::default().solve(&p).unwrap();
        let SolveOutcome::Solved { cost, plan } = outcome else {
            panic!("expected a plan");
        };
        assert!((cost - 4.0).abs() < f64::EPSILON);
        assert_eq!(plan.len(), 4);

        // Replaying the plan from init must reach the goal.
        let mut state = p.initial_state().clone();
        for id in &plan {
            let action = p.action(*id).unwrap();
            assert!(state.enables(action), "plan step {action} not enabled");
            state = state.apply(action);
        }
        assert!(state.satisfies(p.goal()));
    }

    #[test]
    fn test_trivial_goal_costs_zero() {
        let p = ferry_problem(&["(agent-at kitchen)"]);
        let outcome = BlindSearchPlanner::default().solve(&p).unwrap();
        assert_eq!(
            outcome,
            SolveOutcome::Solved {
                cost: 0.0,
                plan: vec![]
            }
        );
    }

    #[test]
    fn test_unsolvable_goal_reported_as_outcome() {
        // Nothing ever makes the ball be in two places; asking for a fluent
        // no action adds while it is false at init is unsolvable.
        let mut p = ferry_problem(&["(item-at ball kitchen)"]);
        let phantom = p.add_fluent("(carrying cup)").unwrap();
        p.set_goal(vec![phantom]).unwrap();

        let outcome = BlindSearchPlanner::default().solve(&p).unwrap();
        assert_eq!(outcome, SolveOutcome::Unsolvable);
    }

    #[test]
    fn test_expansion_bound_is_an_error() {
        let p = ferry_problem(&["(item-at ball kitchen)"]);
        let planner = BlindSearchPlanner::new(BlindSearchConfig {
            max_expanded_states: 1,
        });
        let err = planner.solve(&p).unwrap_err();
        assert!(err.is_execution());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_determinism() {
        let p = ferry_problem(&["(item-at ball kitchen)"]);
        let planner = BlindSearchPlanner::default();
        let a = planner.solve(&p).unwrap();
        let b = planner.solve(&p).unwrap();
        assert_eq!(a, b);
    }
}
