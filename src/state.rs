//! Planning states.
//!
//! A state is the set of fluents that are currently true. Everything not in
//! the set is false (closed-world). States are ordered sets so that
//! iteration, hashing, and diagnostics are deterministic.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::fluent::FluentId;

/// A set of true fluents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    facts: BTreeSet<FluentId>,
}

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the fluent holds in this state.
    #[must_use]
    pub fn contains(&self, fluent: FluentId) -> bool {
        self.facts.contains(&fluent)
    }

    /// Asserts a fluent in this state.
    pub fn insert(&mut self, fluent: FluentId) {
        self.facts.insert(fluent);
    }

    /// Returns the number of true fluents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no fluent holds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns true if every fluent in `condition` holds here.
    #[must_use]
    pub fn satisfies<'a, I>(&self, condition: I) -> bool
    where
        I: IntoIterator<Item = &'a FluentId>,
    {
        condition.into_iter().all(|f| self.facts.contains(f))
    }

    /// Returns true if the action's precondition holds here.
    #[must_use]
    pub fn enables(&self, action: &Action) -> bool {
        self.satisfies(action.pre())
    }

    /// Produces the successor state: delete effects removed, add effects
    /// asserted. Deletes are applied before adds, so an action that both
    /// deletes and adds the same fluent leaves it true.
    #[must_use]
    pub fn apply(&self, action: &Action) -> Self {
        let mut facts = self.facts.clone();
        for f in action.del() {
            facts.remove(f);
        }
        for f in action.add() {
            facts.insert(*f);
        }
        Self { facts }
    }

    /// Iterates the true fluents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = FluentId> + '_ {
        self.facts.iter().copied()
    }
}

impl FromIterator<FluentId> for State {
    fn from_iter<T: IntoIterator<Item = FluentId>>(iter: T) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, fluent) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{fluent}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;

    fn ids(raw: &[u32]) -> Vec<FluentId> {
        raw.iter().map(|&i| FluentId::from_index(i)).collect()
    }

    fn action(pre: &[u32], add: &[u32], del: &[u32]) -> Action {
        Action::new(ActionId::from_index(0), "(test)", ids(pre), ids(add), ids(del))
    }

    #[test]
    fn test_satisfies_subset() {
        let state: State = ids(&[0, 1, 2]).into_iter().collect();
        assert!(state.satisfies(&ids(&[0, 2])));
        assert!(!state.satisfies(&ids(&[0, 3])));
        assert!(state.satisfies(&[]));
    }

    #[test]
    fn test_apply_add_and_delete() {
        let state: State = ids(&[0, 1]).into_iter().collect();
        let a = action(&[0], &[2], &[1]);
        assert!(state.enables(&a));

        let next = state.apply(&a);
        assert!(next.contains(FluentId::from_index(0)));
        assert!(!next.contains(FluentId::from_index(1)));
        assert!(next.contains(FluentId::from_index(2)));

        // Predecessor is untouched.
        assert!(state.contains(FluentId::from_index(1)));
    }

    #[test]
    fn test_apply_delete_before_add() {
        // An action deleting and re-adding the same fluent leaves it true.
        let state: State = ids(&[0]).into_iter().collect();
        let a = action(&[0], &[0, 1], &[0]);
        let next = state.apply(&a);
        assert!(next.contains(FluentId::from_index(0)));
        assert!(next.contains(FluentId::from_index(1)));
    }

    #[test]
    fn test_enables_checks_precondition() {
        let state: State = ids(&[0]).into_iter().collect();
        let a = action(&[0, 1], &[2], &[0]);
        assert!(!state.enables(&a));
    }

    #[test]
    fn test_display_is_deterministic() {
        let state: State = ids(&[2, 0, 1]).into_iter().collect();
        assert_eq!(format!("{state}"), "{f0 f1 f2}");
    }

    #[test]
    fn test_state_equality_and_hash() {
        use std::collections::HashSet;

        let a: State = ids(&[1, 2]).into_iter().collect();
        let b: State = ids(&[2, 1]).into_iter().collect();
        assert_eq!(a, b);

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
    }
}
