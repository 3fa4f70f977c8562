use thiserror::Error;

use crate::session::WorkoutState;

/// Rejected workout configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a workout needs at least one round")]
    NoRounds,
    #[error("round duration must be at least one second")]
    EmptyRound,
    #[error("no moves are left after applying punch variety and move filters")]
    EmptyMovePool,
}

/// Timer operation called from a state that does not allow it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot {operation} a workout that is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: WorkoutState,
    },
}
