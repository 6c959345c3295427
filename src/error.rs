//! Error types for planrec.
//!
//! All recoverable errors are strongly typed using thiserror. Domain-modeling
//! bugs (empty effect sets, executing an operator whose precondition is false)
//! are fatal assertions, never error values; see the individual modules.

use thiserror::Error;

/// Validation errors that occur while constructing domains and requests.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Rationality parameter beta must be finite and > 0, got {value}")]
    BetaNotPositive {
        value: f64,
    },

    #[error("Goal hypothesis must contain at least one fact")]
    EmptyGoalHypothesis,

    #[error("Fluent index {index} is not registered in this problem")]
    UnknownFluent {
        index: u32,
    },

    #[error("Fluent '{name}' is already registered")]
    DuplicateFluent {
        name: String,
    },

    #[error("Room index {index} does not exist in this world")]
    UnknownRoom {
        index: u32,
    },

    #[error("Item index {index} does not exist in this world")]
    UnknownItem {
        index: u32,
    },

    #[error("Move operator requires two distinct rooms, got '{room}' twice")]
    IdenticalRooms {
        room: String,
    },
}

/// Execution errors that occur while compiling, solving, or coordinating.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Action index {index} is not registered in this problem")]
    UnknownAction {
        index: u32,
    },

    #[error("Operator '{signature}' has not been grounded into a STRIPS action")]
    ActionNotGrounded {
        signature: String,
    },

    #[error("Search expanded {limit} states without exhausting the frontier")]
    SearchLimitExceeded {
        limit: usize,
    },

    #[error("No scripted outcome for problem tag '{tag}'")]
    UnscriptedProblem {
        tag: String,
    },

    #[error("Solve queue is full (capacity: {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Solve workers disconnected before the request completed")]
    Disconnected,

    #[error("Recognition request timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for planrec.
///
/// This enum encompasses all recoverable errors that can occur when
/// compiling recognition problems or evaluating likelihoods.
#[derive(Debug, Error)]
pub enum PlanrecError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PlanrecError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Validation errors never change on retry. Of the execution errors,
    /// only transient coordination conditions (full queue, timeout) are
    /// worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
        }
    }
}

/// Result type alias for planrec operations.
pub type PlanrecResult<T> = Result<T, PlanrecError>;
