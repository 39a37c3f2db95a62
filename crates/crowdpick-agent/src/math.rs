//! Small numeric helpers shared by steering and gait.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Below this squared length a planar vector counts as degenerate.
pub const DEGENERATE_LENGTH_SQUARED: f32 = 1e-12;

/// Project onto the XZ plane and normalize, or return `None` when degenerate.
pub fn planar_unit(v: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let len_sq = flat.length_squared();
    if !len_sq.is_finite() || len_sq < DEGENERATE_LENGTH_SQUARED {
        None
    } else {
        Some(flat / len_sq.sqrt())
    }
}

/// Planar normalization with a fallback for degenerate input.
pub fn planar_unit_or(v: Vec3, fallback: Vec3) -> Vec3 {
    planar_unit(v).unwrap_or(fallback)
}

/// Frame-rate independent blend factor for exponential smoothing.
pub fn exp_blend(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `from` to `to`.
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Ease-out quadratic proximity falloff: 1 at contact, 0 at `margin` and beyond.
pub fn proximity_falloff(distance: f32, margin: f32) -> f32 {
    if margin <= 0.0 {
        return 0.0;
    }
    let t = (distance / margin).clamp(0.0, 1.0);
    (1.0 - t) * (1.0 - t)
}

/// Critically damped scalar spring, used to filter heading jitter per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CriticallyDamped {
    pub value: f32,
    pub rate: f32,
}

impl CriticallyDamped {
    pub fn new(value: f32) -> Self {
        Self { value, rate: 0.0 }
    }

    /// Advance toward `target` with natural frequency `omega`.
    pub fn update(&mut self, target: f32, omega: f32, dt: f32) -> f32 {
        let offset = self.value - target;
        let decay = (-omega * dt).exp();
        let temp = (self.rate + omega * offset) * dt;
        self.rate = (self.rate - omega * temp) * decay;
        self.value = target + (offset + temp) * decay;
        self.value
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.rate = 0.0;
    }
}
