//! The live simulated environment.
//!
//! The world is an arena of named entities (one agent, rooms, items)
//! addressed by dense ids, with explicit relation tables instead of
//! cross-referencing entity objects: which room holds which items, what
//! the agent carries, where the agent stands. Operators read and mutate
//! the world through these tables; the planning side sees the world only
//! through fluent bindings and state snapshots.

pub mod operator;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::action::ActionId;
use crate::error::{PlanrecResult, ValidationError};
use crate::fluent::FluentId;
use crate::observation::ObservationSequence;
use crate::problem::Problem;
use crate::state::State;

/// Dense id of a room in the world arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(u32);

impl RoomId {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Dense id of an item in the world arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Fluent ids the world registered in the base problem: one agent-location
/// fluent per room, one item-location fluent per (item, room) pair, one
/// carrying fluent per item.
#[derive(Debug, Clone)]
pub(crate) struct FluentBindings {
    pub agent_at: Vec<FluentId>,
    pub item_at: Vec<Vec<FluentId>>,
    pub carrying: Vec<FluentId>,
}

/// The simulated home: entities, relations, fluent bindings, and the
/// execution log of grounded actions observed so far.
#[derive(Debug)]
pub struct World {
    agent: String,
    rooms: Vec<String>,
    items: Vec<String>,
    agent_room: Option<RoomId>,
    room_items: Vec<BTreeSet<ItemId>>,
    inventory: BTreeSet<ItemId>,
    bindings: Option<FluentBindings>,
    log: Vec<ActionId>,
}

impl World {
    /// Creates an empty world for the named agent.
    #[must_use]
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            rooms: Vec::new(),
            items: Vec::new(),
            agent_room: None,
            room_items: Vec::new(),
            inventory: BTreeSet::new(),
            bindings: None,
            log: Vec::new(),
        }
    }

    /// Returns the agent's name.
    #[must_use]
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Adds a room.
    #[must_use]
    pub fn add_room(&mut self, name: impl Into<String>) -> RoomId {
        let id = RoomId(u32::try_from(self.rooms.len()).expect("room arena overflow"));
        self.rooms.push(name.into());
        self.room_items.push(BTreeSet::new());
        id
    }

    /// Adds an item and places it in a room.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownRoom`] for a foreign room id.
    pub fn add_item(&mut self, name: impl Into<String>, room: RoomId) -> PlanrecResult<ItemId> {
        self.check_room(room)?;
        let id = ItemId(u32::try_from(self.items.len()).expect("item arena overflow"));
        self.items.push(name.into());
        self.room_items[room.index()].insert(id);
        Ok(id)
    }

    /// Places the agent in a room.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownRoom`] for a foreign room id.
    pub fn place_agent(&mut self, room: RoomId) -> PlanrecResult<()> {
        self.check_room(room)?;
        self.agent_room = Some(room);
        Ok(())
    }

    /// Returns the room the agent currently stands in.
    #[must_use]
    pub fn agent_room(&self) -> Option<RoomId> {
        self.agent_room
    }

    /// Returns a room's name.
    #[must_use]
    pub fn room_name(&self, room: RoomId) -> Option<&str> {
        self.rooms.get(room.index()).map(String::as_str)
    }

    /// Returns an item's name.
    #[must_use]
    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.items.get(item.index()).map(String::as_str)
    }

    /// Returns the number of rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the room currently contains the item.
    #[must_use]
    pub fn room_contains(&self, room: RoomId, item: ItemId) -> bool {
        self.room_items
            .get(room.index())
            .is_some_and(|items| items.contains(&item))
    }

    /// Returns true if the agent currently carries the item.
    #[must_use]
    pub fn is_carrying(&self, item: ItemId) -> bool {
        self.inventory.contains(&item)
    }

    pub(crate) fn check_room(&self, room: RoomId) -> PlanrecResult<()> {
        if room.index() >= self.rooms.len() {
            return Err(ValidationError::UnknownRoom { index: room.0 }.into());
        }
        Ok(())
    }

    pub(crate) fn check_item(&self, item: ItemId) -> PlanrecResult<()> {
        if item.index() >= self.items.len() {
            return Err(ValidationError::UnknownItem { index: item.0 }.into());
        }
        Ok(())
    }

    /// Registers this world's fluents in the base problem and remembers the
    /// bindings. Must run exactly once, after all entities exist and the
    /// agent is placed; both are construction invariants and fatal when
    /// violated.
    ///
    /// # Errors
    /// Returns a validation error if fluent names collide (duplicate
    /// room/item names).
    pub fn bind_fluents(&mut self, problem: &mut Problem) -> PlanrecResult<()> {
        assert!(
            self.bindings.is_none(),
            "world fluents bound twice into a problem"
        );
        assert!(
            self.agent_room.is_some(),
            "world has no agent placement; call place_agent before bind_fluents"
        );

        let mut agent_at = Vec::with_capacity(self.rooms.len());
        for room in &self.rooms {
            agent_at.push(problem.add_fluent(format!("(agent-at {room})"))?);
        }

        let mut item_at = Vec::with_capacity(self.items.len());
        let mut carrying = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let mut per_room = Vec::with_capacity(self.rooms.len());
            for room in &self.rooms {
                per_room.push(problem.add_fluent(format!("(item-at {item} {room})"))?);
            }
            item_at.push(per_room);
            carrying.push(problem.add_fluent(format!("(carrying {item})"))?);
        }

        self.bindings = Some(FluentBindings {
            agent_at,
            item_at,
            carrying,
        });
        Ok(())
    }

    pub(crate) fn bindings(&self) -> &FluentBindings {
        self.bindings
            .as_ref()
            .expect("world fluents not bound; call bind_fluents first")
    }

    /// Returns the fluent "the agent is in `room`".
    #[must_use]
    pub fn agent_at_fluent(&self, room: RoomId) -> FluentId {
        self.bindings().agent_at[room.index()]
    }

    /// Returns the fluent "`item` lies in `room`".
    #[must_use]
    pub fn item_at_fluent(&self, item: ItemId, room: RoomId) -> FluentId {
        self.bindings().item_at[item.index()][room.index()]
    }

    /// Returns the fluent "the agent carries `item`".
    #[must_use]
    pub fn carrying_fluent(&self, item: ItemId) -> FluentId {
        self.bindings().carrying[item.index()]
    }

    /// Produces the planning state matching the live relation tables.
    #[must_use]
    pub fn snapshot_state(&self) -> State {
        let bindings = self.bindings();
        let mut state = State::empty();
        if let Some(room) = self.agent_room {
            state.insert(bindings.agent_at[room.index()]);
        }
        for (room_index, items) in self.room_items.iter().enumerate() {
            for item in items {
                state.insert(bindings.item_at[item.index()][room_index]);
            }
        }
        for item in &self.inventory {
            state.insert(bindings.carrying[item.index()]);
        }
        state
    }

    /// Builds the observation sequence recorded by executed operators.
    ///
    /// # Errors
    /// Returns an execution error if the log refers to actions the given
    /// problem does not register (a log replayed against the wrong
    /// problem).
    pub fn observations(&self, base: &Problem) -> PlanrecResult<ObservationSequence> {
        ObservationSequence::new(base, self.log.clone())
    }

    /// Returns the raw execution log.
    #[must_use]
    pub fn execution_log(&self) -> &[ActionId] {
        &self.log
    }

    /// Completion signal of an executed operator: appended to the log and
    /// surfaced as a structured event.
    pub(crate) fn record_execution(&mut self, action: ActionId, signature: &str) {
        info!(%action, signature, "operator executed");
        self.log.push(action);
    }

    pub(crate) fn take_item_from_room(&mut self, item: ItemId, room: RoomId) {
        self.room_items[room.index()].remove(&item);
        self.inventory.insert(item);
    }

    pub(crate) fn put_item_in_room(&mut self, item: ItemId, room: RoomId) {
        self.inventory.remove(&item);
        self.room_items[room.index()].insert(item);
    }

    pub(crate) fn relocate_agent(&mut self, room: RoomId) {
        self.agent_room = Some(room);
    }
}
