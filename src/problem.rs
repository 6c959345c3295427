//! STRIPS planning problems.
//!
//! A [`Problem`] owns a fluent registry, an action table, one initial
//! state, and a goal condition. Problems are plain values: `Clone` yields a
//! fully independent copy, which is what the observation compiler relies on
//! to keep its derived problems isolated from the shared base domain.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionId};
use crate::error::{PlanrecResult, ValidationError};
use crate::fluent::{Fluent, FluentId};
use crate::state::State;

/// A complete STRIPS planning problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    tag: String,
    fluents: Vec<Fluent>,
    actions: Vec<Action>,
    init: State,
    goal: Vec<FluentId>,
}

impl Problem {
    /// Creates an empty problem carrying a short diagnostic tag
    /// (e.g. `"base"`, `"obs-compliant"`).
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fluents: Vec::new(),
            actions: Vec::new(),
            init: State::empty(),
            goal: Vec::new(),
        }
    }

    /// Returns the diagnostic tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Registers a new fluent under the given name.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateFluent`] if the name is taken.
    pub fn add_fluent(&mut self, name: impl Into<String>) -> PlanrecResult<FluentId> {
        let name = name.into();
        if self.fluents.iter().any(|f| f.name() == name) {
            return Err(ValidationError::DuplicateFluent { name }.into());
        }
        let id = FluentId::from_index(u32::try_from(self.fluents.len()).expect("fluent registry overflow"));
        self.fluents.push(Fluent::new(id, name));
        Ok(id)
    }

    /// Looks up a fluent by id.
    #[must_use]
    pub fn fluent(&self, id: FluentId) -> Option<&Fluent> {
        self.fluents.get(id.index())
    }

    /// Looks up a fluent id by name.
    #[must_use]
    pub fn fluent_named(&self, name: &str) -> Option<FluentId> {
        self.fluents.iter().find(|f| f.name() == name).map(Fluent::id)
    }

    /// Returns the fluent registry in id order.
    #[must_use]
    pub fn fluents(&self) -> &[Fluent] {
        &self.fluents
    }

    /// Returns the number of registered fluents.
    #[must_use]
    pub fn fluent_count(&self) -> usize {
        self.fluents.len()
    }

    /// Returns true if the id refers to a registered fluent.
    #[must_use]
    pub fn contains_fluent(&self, id: FluentId) -> bool {
        id.index() < self.fluents.len()
    }

    /// Registers a grounded action and returns its id.
    ///
    /// Invariants (fatal on violation, per domain-modeling policy):
    /// `pre`, `add`, `del` are each non-empty, and every referenced fluent
    /// is registered in this problem.
    pub fn add_action(
        &mut self,
        signature: impl Into<String>,
        pre: Vec<FluentId>,
        add: Vec<FluentId>,
        del: Vec<FluentId>,
    ) -> ActionId {
        let signature = signature.into();
        for f in pre.iter().chain(add.iter()).chain(del.iter()) {
            assert!(
                self.contains_fluent(*f),
                "action '{signature}' references unregistered fluent {f}"
            );
        }
        let id = ActionId::from_index(u32::try_from(self.actions.len()).expect("action table overflow"));
        let action = Action::new(id, signature, pre, add, del);
        self.actions.push(action);
        id
    }

    /// Looks up an action by id.
    #[must_use]
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.index())
    }

    /// Returns the action table in id order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the id refers to a registered action.
    #[must_use]
    pub fn contains_action(&self, id: ActionId) -> bool {
        id.index() < self.actions.len()
    }

    /// Sets the initial state.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownFluent`] if the state mentions a
    /// fluent this problem has not registered.
    pub fn set_initial_state(&mut self, init: State) -> PlanrecResult<()> {
        for f in init.iter() {
            if !self.contains_fluent(f) {
                return Err(ValidationError::UnknownFluent { index: f.raw() }.into());
            }
        }
        self.init = init;
        Ok(())
    }

    /// Returns the initial state.
    #[must_use]
    pub fn initial_state(&self) -> &State {
        &self.init
    }

    /// Sets the goal condition (conjunction of fluents).
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownFluent`] if the goal mentions a
    /// fluent this problem has not registered.
    pub fn set_goal(&mut self, mut goal: Vec<FluentId>) -> PlanrecResult<()> {
        for f in &goal {
            if !self.contains_fluent(*f) {
                return Err(ValidationError::UnknownFluent { index: f.raw() }.into());
            }
        }
        goal.sort_unstable();
        goal.dedup();
        self.goal = goal;
        Ok(())
    }

    /// Returns the goal condition (sorted).
    #[must_use]
    pub fn goal(&self) -> &[FluentId] {
        &self.goal
    }

    /// Rebuilds the action table by expanding each action into zero or more
    /// replacements. Ids are reassigned sequentially; used by the
    /// observation compiler when it weaves checkpoint fluents into matched
    /// actions.
    pub(crate) fn map_actions<F>(&mut self, mut f: F)
    where
        F: FnMut(&Action) -> Vec<ActionSpec>,
    {
        let specs: Vec<ActionSpec> = self.actions.iter().flat_map(|a| f(a)).collect();
        self.actions.clear();
        for spec in specs {
            self.add_action(spec.signature, spec.pre, spec.add, spec.del);
        }
    }
}

/// Unregistered action data used when rebuilding an action table.
#[derive(Debug, Clone)]
pub(crate) struct ActionSpec {
    pub signature: String,
    pub pre: Vec<FluentId>,
    pub add: Vec<FluentId>,
    pub del: Vec<FluentId>,
}

impl ActionSpec {
    pub(crate) fn of(action: &Action) -> Self {
        Self {
            signature: action.signature().to_string(),
            pre: action.pre().to_vec(),
            add: action.add().to_vec(),
            del: action.del().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_problem() -> Problem {
        let mut p = Problem::new("test");
        let at_kitchen = p.add_fluent("(agent-at kitchen)").unwrap();
        let at_hall = p.add_fluent("(agent-at hall)").unwrap();
        p.add_action(
            "(move-to kitchen hall)",
            vec![at_kitchen],
            vec![at_hall],
            vec![at_kitchen],
        );
        p.set_initial_state([at_kitchen].into_iter().collect()).unwrap();
        p.set_goal(vec![at_hall]).unwrap();
        p
    }

    #[test]
    fn test_fluent_registration_and_lookup() {
        let mut p = Problem::new("test");
        let a = p.add_fluent("(carrying ball)").unwrap();
        assert_eq!(p.fluent(a).unwrap().name(), "(carrying ball)");
        assert_eq!(p.fluent_named("(carrying ball)"), Some(a));
        assert_eq!(p.fluent_named("(carrying cup)"), None);
        assert_eq!(p.fluent_count(), 1);
    }

    #[test]
    fn test_duplicate_fluent_rejected() {
        let mut p = Problem::new("test");
        p.add_fluent("(carrying ball)").unwrap();
        let err = p.add_fluent("(carrying ball)").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_action_registration() {
        let p = two_room_problem();
        assert_eq!(p.action_count(), 1);
        let action = &p.actions()[0];
        assert_eq!(action.signature(), "(move-to kitchen hall)");
        assert_eq!(p.action(action.id()).unwrap().id(), action.id());
    }

    #[test]
    #[should_panic(expected = "unregistered fluent")]
    fn test_action_with_foreign_fluent_is_fatal() {
        let mut p = Problem::new("test");
        let a = p.add_fluent("(agent-at kitchen)").unwrap();
        p.add_action(
            "(broken)",
            vec![a],
            vec![FluentId::from_index(99)],
            vec![a],
        );
    }

    #[test]
    fn test_init_rejects_unknown_fluent() {
        let mut p = Problem::new("test");
        p.add_fluent("(agent-at kitchen)").unwrap();
        let state: State = [FluentId::from_index(7)].into_iter().collect();
        assert!(p.set_initial_state(state).is_err());
    }

    #[test]
    fn test_goal_sorted_and_deduped() {
        let mut p = Problem::new("test");
        let a = p.add_fluent("(x)").unwrap();
        let b = p.add_fluent("(y)").unwrap();
        p.set_goal(vec![b, a, b]).unwrap();
        assert_eq!(p.goal(), &[a, b]);
    }

    #[test]
    fn test_clone_is_independent() {
        let base = two_room_problem();
        let mut derived = base.clone();
        derived.set_tag("derived");
        derived.add_fluent("(observed 0)").unwrap();
        derived
            .set_goal(vec![derived.fluent_named("(observed 0)").unwrap()])
            .unwrap();

        assert_eq!(base.tag(), "test");
        assert_eq!(base.fluent_count(), 2);
        assert_eq!(derived.fluent_count(), 3);
        assert_ne!(base.goal(), derived.goal());
    }

    #[test]
    fn test_map_actions_reassigns_ids() {
        let mut p = two_room_problem();
        p.map_actions(|a| {
            let mut first = ActionSpec::of(a);
            first.signature = format!("{} [obs 1]", a.signature());
            let second = ActionSpec::of(a);
            vec![first, second]
        });
        assert_eq!(p.action_count(), 2);
        assert_eq!(p.actions()[0].id().index(), 0);
        assert_eq!(p.actions()[1].id().index(), 1);
        assert!(p.actions()[0].signature().ends_with("[obs 1]"));
    }

    #[test]
    fn test_problem_serialization_roundtrip() {
        let p = two_room_problem();
        let json = serde_json::to_string(&p).unwrap();
        let back: Problem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tag(), p.tag());
        assert_eq!(back.fluent_count(), p.fluent_count());
        assert_eq!(back.goal(), p.goal());
    }
}
