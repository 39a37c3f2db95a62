//! # crowdpick - random participant picker
//!
//! A crowd of racers runs around a square arena; on trigger one is chosen,
//! a spotlight locks on and the winner is lifted away. A spinning wheel
//! offers the same selection without any 3D.
//!
//! This crate hosts the outer surfaces: layered configuration and the
//! headless runner on native targets, the `wasm-bindgen` handle in browsers.

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod runner;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use crowdpick_core::{Participant, SessionConfig, WheelOutcome, WheelTuning};
