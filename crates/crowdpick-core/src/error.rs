use crowdpick_agent::{ArenaError, TuningError};
use thiserror::Error;

use crate::orchestrator::Phase;

/// Rejected roster edits.
#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("no contestant at index {index} (roster has {len})")]
    UnknownIndex { index: usize, len: usize },
    #[error("roster can only grow or shrink while idle (session is {0})")]
    SessionActive(Phase),
}

/// A session configuration the core refuses to run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid arena: {0}")]
    Arena(#[from] ArenaError),
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
}
