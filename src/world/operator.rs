//! Grounded operators.
//!
//! An operator is an application-level action bound to concrete world
//! entities. Operator kinds form a closed tagged variant; each kind
//! supplies its own precondition check, world-side effect, and STRIPS
//! encoding. Grounding (`make_strips_action`) runs exactly once per
//! operator instance and caches the registered action id; only grounded
//! operators may be executed or observed.

use serde::{Deserialize, Serialize};

use crate::action::ActionId;
use crate::error::{PlanrecResult, ValidationError};
use crate::fluent::FluentId;
use crate::problem::Problem;
use crate::world::{ItemId, RoomId, World};

/// The closed set of operator kinds in the home domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorKind {
    /// Take an item from the room the agent stands in.
    PickUp {
        /// The item to take.
        item: ItemId,
        /// The room it currently lies in.
        room: RoomId,
    },

    /// Put a carried item down in the room the agent stands in.
    DropOff {
        /// The item to put down.
        item: ItemId,
        /// The room to leave it in.
        room: RoomId,
    },

    /// Walk from one room to another (rooms are pairwise connected).
    MoveTo {
        /// The room the agent leaves.
        from: RoomId,
        /// The room the agent enters.
        to: RoomId,
    },
}

/// An operator instance: a kind bound to world entities, plus the cached
/// grounded action once `make_strips_action` has run.
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
    signature: String,
    action: Option<ActionId>,
}

impl Operator {
    /// Creates a pick-up operator.
    ///
    /// # Errors
    /// Validation errors for foreign room/item ids.
    pub fn pick_up(world: &World, item: ItemId, room: RoomId) -> PlanrecResult<Self> {
        world.check_item(item)?;
        world.check_room(room)?;
        let signature = format!(
            "(pick-up {} {})",
            world.item_name(item).unwrap_or_default(),
            world.room_name(room).unwrap_or_default()
        );
        Ok(Self {
            kind: OperatorKind::PickUp { item, room },
            signature,
            action: None,
        })
    }

    /// Creates a drop-off operator.
    ///
    /// # Errors
    /// Validation errors for foreign room/item ids.
    pub fn drop_off(world: &World, item: ItemId, room: RoomId) -> PlanrecResult<Self> {
        world.check_item(item)?;
        world.check_room(room)?;
        let signature = format!(
            "(drop-off {} {})",
            world.item_name(item).unwrap_or_default(),
            world.room_name(room).unwrap_or_default()
        );
        Ok(Self {
            kind: OperatorKind::DropOff { item, room },
            signature,
            action: None,
        })
    }

    /// Creates a move operator between two distinct rooms.
    ///
    /// # Errors
    /// Validation errors for foreign room ids or `from == to`.
    pub fn move_to(world: &World, from: RoomId, to: RoomId) -> PlanrecResult<Self> {
        world.check_room(from)?;
        world.check_room(to)?;
        if from == to {
            return Err(ValidationError::IdenticalRooms {
                room: world.room_name(from).unwrap_or_default().to_string(),
            }
            .into());
        }
        let signature = format!(
            "(move-to {} {})",
            world.room_name(from).unwrap_or_default(),
            world.room_name(to).unwrap_or_default()
        );
        Ok(Self {
            kind: OperatorKind::MoveTo { from, to },
            signature,
            action: None,
        })
    }

    /// Returns the operator kind.
    #[must_use]
    pub const fn kind(&self) -> OperatorKind {
        self.kind
    }

    /// Returns the operator's signature, e.g. `"(pick-up ball kitchen)"`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the grounded action id, if `make_strips_action` has run.
    #[must_use]
    pub const fn action_id(&self) -> Option<ActionId> {
        self.action
    }

    /// Pure predicate: does the operator's precondition hold in the live
    /// world right now? Callable any number of times, no side effects.
    #[must_use]
    pub fn check_precondition(&self, world: &World) -> bool {
        match self.kind {
            OperatorKind::PickUp { item, room } => {
                world.agent_room() == Some(room) && world.room_contains(room, item)
            }
            OperatorKind::DropOff { item, room } => {
                world.agent_room() == Some(room) && world.is_carrying(item)
            }
            OperatorKind::MoveTo { from, .. } => world.agent_room() == Some(from),
        }
    }

    /// Applies the operator's real-world effect and signals completion
    /// tagged with the grounded action id (recorded in the world's
    /// execution log).
    ///
    /// Contract: the caller checks `check_precondition` first; executing
    /// with a false precondition, or before grounding, is fatal.
    pub fn execute(&self, world: &mut World) -> ActionId {
        assert!(
            self.check_precondition(world),
            "operator '{}' executed with false precondition",
            self.signature
        );
        let action = self.action.unwrap_or_else(|| {
            panic!(
                "operator '{}' executed before make_strips_action",
                self.signature
            )
        });

        match self.kind {
            OperatorKind::PickUp { item, room } => world.take_item_from_room(item, room),
            OperatorKind::DropOff { item, room } => world.put_item_in_room(item, room),
            OperatorKind::MoveTo { to, .. } => world.relocate_agent(to),
        }
        world.record_execution(action, &self.signature);
        action
    }

    /// Grounds the operator: derives precondition/add/delete sets from the
    /// world's fluent bindings, registers the action in the given problem,
    /// and caches the id. Runs exactly once per instance; grounding twice
    /// is fatal. The registered action's pre/add/del sets are each
    /// non-empty by construction (enforced at registration).
    pub fn make_strips_action(&mut self, world: &World, problem: &mut Problem) -> ActionId {
        assert!(
            self.action.is_none(),
            "operator '{}' grounded twice",
            self.signature
        );

        let (pre, add, del): (Vec<FluentId>, Vec<FluentId>, Vec<FluentId>) = match self.kind {
            OperatorKind::PickUp { item, room } => (
                vec![
                    world.agent_at_fluent(room),
                    world.item_at_fluent(item, room),
                ],
                vec![world.carrying_fluent(item)],
                vec![world.item_at_fluent(item, room)],
            ),
            OperatorKind::DropOff { item, room } => (
                vec![world.agent_at_fluent(room), world.carrying_fluent(item)],
                vec![world.item_at_fluent(item, room)],
                vec![world.carrying_fluent(item)],
            ),
            OperatorKind::MoveTo { from, to } => (
                vec![world.agent_at_fluent(from)],
                vec![world.agent_at_fluent(to)],
                vec![world.agent_at_fluent(from)],
            ),
        };

        let id = problem.add_action(self.signature.clone(), pre, add, del);
        self.action = Some(id);
        id
    }
}
