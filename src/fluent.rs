//! Fluents—the atomic propositions a planning domain is built from.
//!
//! A fluent is a single ground boolean proposition such as
//! `(agent-at kitchen)`. Its truth value lives only inside a [`State`];
//! the fluent itself is just a stable index paired with a readable name.
//!
//! [`State`]: crate::state::State

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense, stable index of a fluent within one problem's registry.
///
/// Fluent ids are assigned sequentially at registration time and never
/// change afterwards. Ids are only meaningful relative to the problem
/// (or its clones) that issued them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FluentId(u32);

impl FluentId {
    /// Creates a fluent id from a raw registry index.
    #[must_use]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw registry index.
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

impl fmt::Display for FluentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// A registered fluent: stable index plus human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fluent {
    id: FluentId,
    name: String,
}

impl Fluent {
    pub(crate) fn new(id: FluentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the fluent's id.
    #[must_use]
    pub const fn id(&self) -> FluentId {
        self.id
    }

    /// Returns the fluent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Fluent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
