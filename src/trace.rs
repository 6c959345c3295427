//! Diagnostic text renderings.
//!
//! Human-readable dumps of states, actions, plans, and problem summaries,
//! emitted through `tracing` at debug level. These are tracing aids only,
//! not part of the functional contract.

use std::fmt::Write as _;

use tracing::debug;

use crate::action::{Action, ActionId};
use crate::fluent::FluentId;
use crate::problem::Problem;
use crate::state::State;

/// Renders a fluent set by name, e.g. `{(agent-at kitchen) (carrying ball)}`.
#[must_use]
pub fn render_fluents<'a, I>(problem: &Problem, fluents: I) -> String
where
    I: IntoIterator<Item = &'a FluentId>,
{
    let mut out = String::from("{");
    for (i, id) in fluents.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match problem.fluent(*id) {
            Some(fluent) => out.push_str(fluent.name()),
            None => {
                let _ = write!(out, "{id}?");
            }
        }
    }
    out.push('}');
    out
}

/// Renders a state by fluent names.
#[must_use]
pub fn render_state(problem: &Problem, state: &State) -> String {
    let facts: Vec<FluentId> = state.iter().collect();
    render_fluents(problem, facts.iter())
}

/// Renders an action with its three fluent sets.
#[must_use]
pub fn render_action(problem: &Problem, action: &Action) -> String {
    format!(
        "{} pre={} add={} del={}",
        action.signature(),
        render_fluents(problem, action.pre()),
        render_fluents(problem, action.add()),
        render_fluents(problem, action.del()),
    )
}

/// Renders a plan as one signature per line, prefixed by its step number.
#[must_use]
pub fn render_plan(problem: &Problem, plan: &[ActionId]) -> String {
    let mut out = String::new();
    for (step, id) in plan.iter().enumerate() {
        let signature = problem
            .action(*id)
            .map_or("<unknown action>", Action::signature);
        let _ = writeln!(out, "{}: {}", step + 1, signature);
    }
    out
}

/// Dumps a problem's init, goal, and action table at debug level.
pub fn log_problem(problem: &Problem) {
    debug!(
        tag = problem.tag(),
        init = %render_state(problem, problem.initial_state()),
        goal = %render_fluents(problem, problem.goal()),
        "problem summary"
    );
    for action in problem.actions() {
        debug!(tag = problem.tag(), action = %render_action(problem, action), "action");
    }
}
