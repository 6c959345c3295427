//! # planrec - Goal Recognition as Planning
//!
//! planrec estimates how well a candidate goal explains an observed action
//! sequence. For each recognition request it derives two STRIPS problems
//! from a shared base domain - one whose plans must reproduce the
//! observations in order, one that ignores them - solves both concurrently,
//! and converts the cost gap into a likelihood pair through a
//! Boltzmann-style model parameterized by a rationality constant beta.
//!
//! ## Core Concepts
//!
//! - **Fluent**: an atomic boolean proposition; truth lives only in a state
//! - **Action**: a grounded STRIPS triple (precondition/add/delete), unit cost
//! - **Problem**: fluent registry + action table + initial state + goal
//! - **ObservationSequence**: time-ordered grounded actions seen so far
//! - **GoalRecognizer**: compiles, dispatches both solves, joins the pair
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use planrec::{
//!     GoalHypothesis, GoalRecognizer, ObservationSequence, Operator, Problem,
//!     RecognizerConfig, World,
//! };
//! use planrec::solver::search::BlindSearchPlanner;
//!
//! // Build the world and its base problem.
//! let mut world = World::new("observer");
//! let kitchen = world.add_room("kitchen");
//! let ball = world.add_item("ball", kitchen)?;
//! world.place_agent(kitchen)?;
//!
//! let mut base = Problem::new("base");
//! world.bind_fluents(&mut base)?;
//! let mut pick_up = Operator::pick_up(&world, ball, kitchen)?;
//! pick_up.make_strips_action(&world, &mut base);
//! base.set_initial_state(world.snapshot_state())?;
//!
//! // Observe the agent act, then evaluate a hypothesis.
//! pick_up.execute(&mut world);
//! let hypothesis = GoalHypothesis::new(&base, [world.carrying_fluent(ball)])?;
//! let observations = world.observations(&base)?;
//!
//! let recognizer = GoalRecognizer::new(
//!     Arc::new(BlindSearchPlanner::default()),
//!     RecognizerConfig::default(),
//! );
//! let pair = recognizer
//!     .evaluate_likelihoods(&base, &hypothesis, &observations)?
//!     .join()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod action;
pub mod error;
pub mod fluent;
pub mod hypothesis;
pub mod likelihood;
pub mod observation;
pub mod problem;
pub mod state;

// Compilation, solving, and coordination
pub mod compile;
pub mod reachability;
pub mod recognizer;
pub mod solver;

// Simulated environment and diagnostics
pub mod trace;
pub mod world;

// Re-export primary types at crate root for convenience
pub use action::{Action, ActionId};
pub use compile::{CompiledProblems, ObservationCompiler};
pub use error::{ExecutionError, PlanrecError, PlanrecResult, ValidationError};
pub use fluent::{Fluent, FluentId};
pub use hypothesis::GoalHypothesis;
pub use likelihood::{likelihood_pair, Beta, Likelihoods};
pub use observation::ObservationSequence;
pub use problem::Problem;
pub use reachability::{ReachabilityOracle, RelaxedReachability};
pub use recognizer::{Branch, GoalRecognizer, RecognitionHandle, RecognizerConfig, RequestId};
pub use solver::{Planner, SolveOutcome};
pub use state::State;
pub use world::operator::{Operator, OperatorKind};
pub use world::{ItemId, RoomId, World};
