use thiserror::Error;

use crate::env::State;

/// Errors produced by the hallway model, the solvers and the simulator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("state {state} is outside the hallway [0, {max}]")]
    InvalidState { state: State, max: State },

    #[error("unknown action `{0}`, expected LEFT or RIGHT")]
    InvalidAction(String),

    #[error("discount factor must be a non-negative number, got {0}")]
    InvalidDiscount(f64),

    #[error("no scenario with id `{0}`")]
    UnknownScenario(String),

    #[error("invalid scenario `{id}`: {reason}")]
    InvalidScenario { id: String, reason: String },

    #[error("policy has no action for non-goal state {0}")]
    PolicyMismatch(State),
}

pub type Result<T> = std::result::Result<T, Error>;
