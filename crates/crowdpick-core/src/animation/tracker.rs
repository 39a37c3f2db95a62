//! Aim point for the spotlight: free scanning over the crowd, then an eased
//! lock onto the chosen racer.

use crowdpick_agent::tuning::{finite, non_negative, TuningError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::tweens::{AnimatedValue, EaseType};

/// How the aim roams while the race is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanTuning {
    /// Follow time constant in seconds; ~63% of the gap closes per constant
    pub follow_smoothness: f32,
    /// Angular frequencies of the Lissajous sweep on X and Z (rad/sec)
    pub sweep_frequency: (f32, f32),
    /// Sweep radius as a fraction of the arena half extent
    pub sweep_fraction: f32,
}

impl Default for ScanTuning {
    fn default() -> Self {
        Self {
            follow_smoothness: 0.25,
            sweep_frequency: (0.7, 1.1),
            sweep_fraction: 0.35,
        }
    }
}

impl ScanTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        non_negative("scan.follow_smoothness", self.follow_smoothness)?;
        finite("scan.sweep_frequency", self.sweep_frequency.0)?;
        finite("scan.sweep_frequency", self.sweep_frequency.1)?;
        finite("scan.sweep_fraction", self.sweep_fraction)?;
        Ok(())
    }
}

/// Point the scan heads for at time `t`: crowd centroid plus a slow sweep.
pub fn scan_point(
    positions: impl IntoIterator<Item = Vec3>,
    t: f32,
    half_extent: f32,
    tuning: &ScanTuning,
) -> Vec3 {
    let (sum, count) = positions
        .into_iter()
        .fold((Vec3::ZERO, 0u32), |(sum, n), p| (sum + p, n + 1));
    let centroid = if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    };
    let radius = half_extent * tuning.sweep_fraction;
    let sweep = Vec3::new(
        (t * tuning.sweep_frequency.0).sin() * radius,
        0.0,
        (t * tuning.sweep_frequency.1).sin() * radius,
    );
    let point = centroid + sweep;
    Vec3::new(
        point.x.clamp(-half_extent, half_extent),
        centroid.y,
        point.z.clamp(-half_extent, half_extent),
    )
}

/// Spotlight aim with exponential follow and eased lock-on.
#[derive(Debug, Clone)]
pub struct SpotTracker {
    aim: AnimatedValue<Vec3>,
    follow_smoothness: f32,
}

impl SpotTracker {
    pub fn new(initial: Vec3) -> Self {
        Self {
            aim: AnimatedValue::new(initial),
            follow_smoothness: ScanTuning::default().follow_smoothness,
        }
    }

    pub fn set_follow_smoothness(&mut self, smoothness: f32) {
        self.follow_smoothness = smoothness.max(0.001);
    }

    /// Exponential follow; frame-rate independent.
    pub fn follow(&mut self, target: Vec3, dt: f32) {
        let t = 1.0 - (-dt.max(0.0) / self.follow_smoothness).exp();
        let next = self.aim.value().lerp(target, t);
        self.aim.set_immediate(next);
    }

    /// Start an ease-out-cubic glide from the current aim to `target`.
    pub fn lock_on(&mut self, target: Vec3, duration: f32) {
        self.aim.animate_to(target, duration, EaseType::CubicOut);
    }

    /// Keep the lock destination on a target that may still move.
    pub fn track(&mut self, target: Vec3) {
        self.aim.retarget(target);
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.aim.update(dt)
    }

    pub fn snap(&mut self, target: Vec3) {
        self.aim.set_immediate(target);
    }

    pub fn aim(&self) -> Vec3 {
        self.aim.value()
    }

    pub fn is_locking(&self) -> bool {
        self.aim.is_animating()
    }
}
