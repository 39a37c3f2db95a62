//! Selection sequencing for crowdpick
//!
//! This crate implements:
//! - The roster of participants and their racers
//! - The race/lock/lift/float session state machine
//! - Spotlight tracking, lift curves and overlay pulses
//! - A frame driver producing render snapshots
//! - The spinning-wheel picker

pub mod animation;
pub mod error;
pub mod lift;
pub mod orchestrator;
pub mod overlay;
pub mod roster;
pub mod stage;
pub mod wheel;

pub use error::{ConfigError, RosterError};
pub use lift::LiftTuning;
pub use orchestrator::{Advance, Contestant, Orchestrator, Phase, SessionConfig, SessionTimings};
pub use overlay::{GroundHalo, OverlayTuning, SelectionOverlay, Spotlight};
pub use roster::{Participant, PhotoRef, ANONYMOUS};
pub use stage::{ContestantFrame, FrameClock, FrameSnapshot, Stage};
pub use wheel::{Wheel, WheelOutcome, WheelTuning};

pub use crowdpick_agent as agent;
