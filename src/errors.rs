//! Error types for persona sessions
//!
//! `ActionError` values from the environment stay recoverable inside an attempt;
//! only navigation failure ends a session early.

use action_primitives::ActionError;
use thiserror::Error;

use crate::game::SlotGroup;

/// Anything that can cut one attempt short.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// A plan addressed a slot the group does not have
    #[error("slot {index} is outside {group} (capacity {capacity})")]
    SlotOutOfRange {
        group: SlotGroup,
        index: usize,
        capacity: usize,
    },

    /// A bounded UI action failed
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Failures that end a session without entering the attempt loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The level could not be reached
    #[error("navigation failed: {0}")]
    Navigation(ActionError),

    /// The per-session log file could not be created
    #[error("session log unavailable: {0}")]
    Log(#[from] std::io::Error),
}
