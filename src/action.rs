//! Grounded STRIPS actions.
//!
//! An action is immutable once registered: a signature naming the concrete
//! operator instance, three fluent sets (precondition, add, delete), and an
//! implicit unit cost. Domain policy requires all three sets to be
//! non-empty; a violation is a modeling bug and fails a hard assertion at
//! registration time, never at solve time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fluent::FluentId;

/// Dense, stable index of an action within one problem's action table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActionId(u32);

impl ActionId {
    #[must_use]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw index as `u32`.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A grounded STRIPS action: signature plus precondition/add/delete sets.
///
/// Fluent ids are kept sorted and deduplicated so that set comparisons and
/// diagnostics are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    signature: String,
    pre: Vec<FluentId>,
    add: Vec<FluentId>,
    del: Vec<FluentId>,
}

impl Action {
    /// Invariant: `pre`, `add`, and `del` must each be non-empty. An empty
    /// set here is a domain-modeling bug, so this asserts rather than
    /// returning an error.
    pub(crate) fn new(
        id: ActionId,
        signature: impl Into<String>,
        mut pre: Vec<FluentId>,
        mut add: Vec<FluentId>,
        mut del: Vec<FluentId>,
    ) -> Self {
        let signature = signature.into();
        assert!(
            !pre.is_empty(),
            "action '{signature}' registered with empty precondition set"
        );
        assert!(
            !add.is_empty(),
            "action '{signature}' registered with empty add set"
        );
        assert!(
            !del.is_empty(),
            "action '{signature}' registered with empty delete set"
        );

        pre.sort_unstable();
        pre.dedup();
        add.sort_unstable();
        add.dedup();
        del.sort_unstable();
        del.dedup();

        Self {
            id,
            signature,
            pre,
            add,
            del,
        }
    }

    /// Returns the action's id within its problem.
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Returns the action's signature, e.g. `"(pick-up ball kitchen)"`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the precondition fluents (sorted).
    #[must_use]
    pub fn pre(&self) -> &[FluentId] {
        &self.pre
    }

    /// Returns the add-effect fluents (sorted).
    #[must_use]
    pub fn add(&self) -> &[FluentId] {
        &self.add
    }

    /// Returns the delete-effect fluents (sorted).
    #[must_use]
    pub fn del(&self) -> &[FluentId] {
        &self.del
    }

    /// Returns the action's cost. All actions carry unit cost.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        1.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature)
    }
}
