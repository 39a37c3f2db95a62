//! Eased interpolation for selection choreography.

use keyframe::{ease, functions};

/// Slack when comparing accumulated frame time against a duration, so that
/// `n` steps of `duration / n` finish on step `n`.
pub const TIMER_EPSILON: f32 = 1e-4;

/// Easing curve applied to normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EaseType {
    /// Constant speed interpolation
    #[default]
    Linear,
    /// Quadratic ease in (slow start)
    QuadIn,
    /// Quadratic ease out (slow end)
    QuadOut,
    /// Cubic ease out, used for locking and lifting
    CubicOut,
}

impl EaseType {
    /// Map `t` in 0.0..=1.0 through the curve. Input outside the range is clamped.
    pub fn apply(&self, t: f32) -> f32 {
        let t = f64::from(t).clamp(0.0, 1.0);
        let result = match self {
            EaseType::Linear => ease(functions::Linear, 0.0, 1.0, t),
            EaseType::QuadIn => ease(functions::EaseInQuad, 0.0, 1.0, t),
            EaseType::QuadOut => ease(functions::EaseOutQuad, 0.0, 1.0, t),
            EaseType::CubicOut => ease(functions::EaseOutCubic, 0.0, 1.0, t),
        };
        result as f32
    }
}

/// Trait for types that can be interpolated (tweened).
pub trait Tweenable: Copy {
    /// Linear interpolation between two values.
    /// `t` should be 0.0 to 1.0, where 0.0 returns `a` and 1.0 returns `b`.
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Tweenable for f32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Tweenable for glam::Vec2 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Tweenable for glam::Vec3 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

/// A value easing from a start toward a target over a fixed duration.
///
/// The target may move mid-animation (see [`AnimatedValue::retarget`]); the
/// eased fraction is always applied between the original start and the
/// latest target.
#[derive(Debug, Clone)]
pub struct AnimatedValue<T: Tweenable> {
    /// Current interpolated value
    current: T,
    /// Value the current animation started from
    start: T,
    /// Value to animate toward
    target: T,
    /// Seconds into the current animation
    elapsed: f32,
    /// Total seconds of the current animation
    duration: f32,
    /// Easing function to apply
    easing: EaseType,
}

impl<T: Tweenable> AnimatedValue<T> {
    /// Create a value resting at `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            start: initial,
            target: initial,
            elapsed: 0.0,
            duration: 0.0,
            easing: EaseType::Linear,
        }
    }

    /// Begin easing from the current value toward `target`.
    ///
    /// # Arguments
    /// * `target` - The value to animate toward
    /// * `duration` - How long the animation should take (seconds)
    /// * `easing` - The easing function to use
    pub fn animate_to(&mut self, target: T, duration: f32, easing: EaseType) {
        self.start = self.current;
        self.target = target;
        self.elapsed = 0.0;
        self.duration = duration.max(0.0);
        self.easing = easing;
    }

    /// Move the destination without restarting the clock.
    pub fn retarget(&mut self, target: T) {
        self.target = target;
        if !self.is_animating() {
            self.current = target;
        }
    }

    /// Jump to `value` and cancel any animation.
    pub fn set_immediate(&mut self, value: T) {
        self.current = value;
        self.start = value;
        self.target = value;
        self.elapsed = 0.0;
        self.duration = 0.0;
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns `true` if the animation is still in progress, `false` if complete.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.duration <= 0.0 {
            self.current = self.target;
            return false;
        }

        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        if self.elapsed + TIMER_EPSILON >= self.duration {
            self.elapsed = self.duration;
            self.current = self.target;
            return false;
        }

        let eased = self.easing.apply(self.elapsed / self.duration);
        self.current = T::lerp(self.start, self.target, eased);
        true
    }

    /// Get the current interpolated value.
    pub fn value(&self) -> T {
        self.current
    }

    /// Get the target value.
    pub fn target(&self) -> T {
        self.target
    }

    /// Check if the animation is currently in progress.
    pub fn is_animating(&self) -> bool {
        self.duration > 0.0 && self.elapsed < self.duration
    }

    /// Normalized progress through the current animation, 1.0 when idle.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}
