//! Racers for crowdpick
//!
//! This crate implements:
//! - The square arena and its wall geometry
//! - Wander, jitter and wall-avoidance steering
//! - Heading/speed integration with a hard boundary clamp
//! - Procedural gait (limb swing, bounce, lean, squash-stretch, facing)

pub mod agent;
pub mod arena;
pub mod locomotion;
pub mod math;
pub mod steering;
pub mod tuning;
pub mod types;

pub use agent::{Agent, AgentTransform, LimbRotations, StepContext};
pub use arena::{Arena, ArenaError, Wall};
pub use locomotion::{GaitState, LimbPose, Pose};
pub use steering::SteeringState;
pub use tuning::{AgentTuning, GaitTuning, MotionTuning, SteeringTuning, TuningError};
pub use types::AgentId;
