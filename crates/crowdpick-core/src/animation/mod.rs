//! Eased tweens and the spotlight tracker.
//!
//! Provides `AnimatedValue<T>` for eased interpolation and `SpotTracker` for
//! the scan-then-lock spotlight aim.

mod tracker;
mod tweens;

pub use tracker::{scan_point, ScanTuning, SpotTracker};
pub use tweens::{AnimatedValue, EaseType, Tweenable, TIMER_EPSILON};
