//! Tuning table for agent steering, motion and gait.
//!
//! Every constant that shapes how a racer moves lives here so that variants
//! differ only in data. All sections deserialize with per-field defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tuning value that would stall or crash the simulation.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}

/// Finite value check.
pub fn finite(field: &'static str, value: f32) -> Result<f32, TuningError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TuningError::NotFinite { field, value })
    }
}

/// Finite and `>= 0`.
pub fn non_negative(field: &'static str, value: f32) -> Result<f32, TuningError> {
    if finite(field, value)? < 0.0 {
        return Err(TuningError::Negative { field, value });
    }
    Ok(value)
}

/// Finite and `> 0`.
pub fn positive(field: &'static str, value: f32) -> Result<f32, TuningError> {
    if finite(field, value)? <= 0.0 {
        return Err(TuningError::NotPositive { field, value });
    }
    Ok(value)
}

/// Finite `(min, max)` pair with `min <= max`.
pub fn ordered_span(
    field: &'static str,
    (min, max): (f32, f32),
) -> Result<(f32, f32), TuningError> {
    finite(field, min)?;
    finite(field, max)?;
    if min > max {
        return Err(TuningError::InvertedRange { field, min, max });
    }
    Ok((min, max))
}

/// Complete per-agent tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    pub steering: SteeringTuning,
    pub motion: MotionTuning,
    pub gait: GaitTuning,
}

impl AgentTuning {
    /// Check every section; deserialized tables are otherwise trusted as-is.
    pub fn validate(&self) -> Result<(), TuningError> {
        self.steering.validate()?;
        self.motion.validate()?;
        self.gait.validate()
    }
}

/// Desired-direction shaping (wander, jitter, wall avoidance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringTuning {
    /// Seconds until the first wander retarget after a race starts (min, max)
    pub first_retarget_secs: (f32, f32),
    /// Seconds between later wander retargets (min, max)
    pub retarget_secs: (f32, f32),
    /// Wander target radius as a fraction of the half extent (min, max)
    pub target_radius_fraction: (f32, f32),
    /// Max angular deviation of a new target from the agent's radial bearing (degrees)
    pub target_spread_degrees: f32,
    /// Magnitude of the random unit vector added each tick
    pub jitter_strength: f32,
    /// Extra jitter multiplier reached right at a wall
    pub wall_threat_boost: f32,
    /// Weight of the pull toward the wander target
    pub target_weight: f32,
    /// Weight of the current heading in the target blend
    pub heading_persistence: f32,
    /// Radius of the central zone, as a fraction of the half extent
    pub center_zone_fraction: f32,
    /// Strength of the push out of the central zone
    pub center_push: f32,
    /// Distance from a wall at which reactive avoidance starts
    pub wall_margin: f32,
    /// Weight of the reactive wall force
    pub wall_weight: f32,
    /// Look-ahead distance along the heading for predictive steering
    pub look_ahead: f32,
    /// Distance from a wall at which the look-ahead point counts as threatened
    pub predict_margin: f32,
    /// Weight of the predictive direct repulsion
    pub predict_weight: f32,
    /// Weight of the predictive tangential slide
    pub slide_weight: f32,
    /// Wall distance below which any component into the wall is removed
    pub hard_zone: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            first_retarget_secs: (0.8, 1.6),
            retarget_secs: (4.5, 7.3),
            target_radius_fraction: (0.80, 0.98),
            target_spread_degrees: 54.0,
            jitter_strength: 0.12,
            wall_threat_boost: 1.5,
            target_weight: 1.0,
            heading_persistence: 0.6,
            center_zone_fraction: 0.35,
            center_push: 0.8,
            wall_margin: 2.0,
            wall_weight: 2.5,
            look_ahead: 2.5,
            predict_margin: 1.5,
            predict_weight: 1.5,
            slide_weight: 1.2,
            hard_zone: 0.4,
        }
    }
}

impl SteeringTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let (min, _) = ordered_span("steering.first_retarget_secs", self.first_retarget_secs)?;
        non_negative("steering.first_retarget_secs", min)?;
        let (min, _) = ordered_span("steering.retarget_secs", self.retarget_secs)?;
        non_negative("steering.retarget_secs", min)?;
        let radius = ordered_span("steering.target_radius_fraction", self.target_radius_fraction)?;
        non_negative("steering.target_radius_fraction", radius.0)?;
        finite("steering.target_spread_degrees", self.target_spread_degrees)?;
        non_negative("steering.jitter_strength", self.jitter_strength)?;
        non_negative("steering.wall_threat_boost", self.wall_threat_boost)?;
        finite("steering.target_weight", self.target_weight)?;
        finite("steering.heading_persistence", self.heading_persistence)?;
        non_negative("steering.center_zone_fraction", self.center_zone_fraction)?;
        finite("steering.center_push", self.center_push)?;
        non_negative("steering.wall_margin", self.wall_margin)?;
        finite("steering.wall_weight", self.wall_weight)?;
        non_negative("steering.look_ahead", self.look_ahead)?;
        non_negative("steering.predict_margin", self.predict_margin)?;
        finite("steering.predict_weight", self.predict_weight)?;
        finite("steering.slide_weight", self.slide_weight)?;
        non_negative("steering.hard_zone", self.hard_zone)?;
        Ok(())
    }
}

/// Heading smoothing, speed and integration limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Range `max_speed` is drawn from at construction (units/sec)
    pub max_speed_range: (f32, f32),
    /// Fraction of `max_speed` an agent has right after starting
    pub start_speed_fraction: f32,
    /// Exponential rate at which heading follows the desired direction (1/sec)
    pub responsiveness: f32,
    /// Angular frequency of the critically damped heading filter (rad/sec)
    pub heading_filter_omega: f32,
    /// Exponential rate at which speed approaches cruise speed (1/sec)
    pub acceleration: f32,
    /// Fractional depth of the slow speed wobble below `max_speed`
    pub speed_wobble: f32,
    /// Angular frequency of the speed wobble (rad/sec)
    pub speed_wobble_frequency: f32,
    /// Upper bound on a single tick's `dt` (seconds)
    pub max_dt: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            max_speed_range: (2.6, 4.2),
            start_speed_fraction: 0.6,
            responsiveness: 4.0,
            heading_filter_omega: 18.0,
            acceleration: 3.0,
            speed_wobble: 0.045,
            speed_wobble_frequency: 0.7,
            max_dt: 0.05,
        }
    }
}

impl MotionTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let (min, _) = ordered_span("motion.max_speed_range", self.max_speed_range)?;
        non_negative("motion.max_speed_range", min)?;
        non_negative("motion.start_speed_fraction", self.start_speed_fraction)?;
        non_negative("motion.responsiveness", self.responsiveness)?;
        non_negative("motion.heading_filter_omega", self.heading_filter_omega)?;
        non_negative("motion.acceleration", self.acceleration)?;
        non_negative("motion.speed_wobble", self.speed_wobble)?;
        finite("motion.speed_wobble_frequency", self.speed_wobble_frequency)?;
        positive("motion.max_dt", self.max_dt)?;
        Ok(())
    }
}

/// Procedural gait amplitudes and rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitTuning {
    /// Base gait angular frequency at full speed (rad/sec of run phase)
    pub stride_frequency: f32,
    /// Frequency multiplier gained per unit of speed ratio
    pub frequency_gain: f32,
    /// Frequency multiplier bounds (min, max)
    pub frequency_multiplier: (f32, f32),
    /// Leg swing amplitude at walk and run pace (radians)
    pub leg_swing: (f32, f32),
    /// Arm swing amplitude at walk and run pace (radians)
    pub arm_swing: (f32, f32),
    /// Peak vertical bounce at full speed
    pub bounce_height: f32,
    /// Forward lean at full speed (radians)
    pub max_lean: f32,
    /// Exponential rate of lean smoothing (1/sec)
    pub lean_response: f32,
    /// Squash-stretch depth `k` in `s = 1 + k sin(phase)`
    pub squash: f32,
    /// Exponential rate at which facing turns toward velocity (1/sec)
    pub turn_response: f32,
    /// Exponential rate at which amplitudes relax when stopped (1/sec)
    pub relax_rate: f32,
    /// Exponential rate at which the gait blend follows the speed ratio (1/sec)
    pub blend_response: f32,
    /// Speeds below this count as standing still
    pub moving_epsilon: f32,
}

impl Default for GaitTuning {
    fn default() -> Self {
        Self {
            stride_frequency: 11.0,
            frequency_gain: 1.3,
            frequency_multiplier: (0.4, 1.25),
            leg_swing: (0.35, 0.9),
            arm_swing: (0.25, 0.7),
            bounce_height: 0.18,
            max_lean: 0.22,
            lean_response: 6.0,
            squash: 0.08,
            turn_response: 10.0,
            relax_rate: 6.0,
            blend_response: 8.0,
            moving_epsilon: 0.01,
        }
    }
}

impl GaitTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        finite("gait.stride_frequency", self.stride_frequency)?;
        finite("gait.frequency_gain", self.frequency_gain)?;
        ordered_span("gait.frequency_multiplier", self.frequency_multiplier)?;
        ordered_span("gait.leg_swing", self.leg_swing)?;
        ordered_span("gait.arm_swing", self.arm_swing)?;
        finite("gait.bounce_height", self.bounce_height)?;
        finite("gait.max_lean", self.max_lean)?;
        non_negative("gait.lean_response", self.lean_response)?;
        finite("gait.squash", self.squash)?;
        non_negative("gait.turn_response", self.turn_response)?;
        non_negative("gait.relax_rate", self.relax_rate)?;
        non_negative("gait.blend_response", self.blend_response)?;
        non_negative("gait.moving_epsilon", self.moving_epsilon)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges_are_ordered() {
        let tuning = AgentTuning::default();
        let s = &tuning.steering;
        assert!(s.first_retarget_secs.0 < s.first_retarget_secs.1);
        assert!(s.retarget_secs.0 < s.retarget_secs.1);
        assert!(s.target_radius_fraction.1 < 1.0);
        assert!(tuning.motion.max_speed_range.0 > 0.0);
        assert!(tuning.motion.speed_wobble > 0.03 && tuning.motion.speed_wobble < 0.06);
        assert_eq!(tuning.motion.max_dt, 0.05);
        assert_eq!(tuning.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_values_that_would_panic() {
        let mut tuning = AgentTuning::default();
        tuning.motion.max_dt = -1.0;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                field: "motion.max_dt",
                value: -1.0
            })
        );

        let mut tuning = AgentTuning::default();
        tuning.gait.frequency_multiplier.0 = f32::NAN;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotFinite {
                field: "gait.frequency_multiplier",
                ..
            })
        ));

        let mut tuning = AgentTuning::default();
        tuning.steering.target_spread_degrees = f32::INFINITY;
        assert!(tuning.validate().is_err());

        let mut tuning = AgentTuning::default();
        tuning.steering.retarget_secs = (3.0, 1.0);
        assert_eq!(
            tuning.validate(),
            Err(TuningError::InvertedRange {
                field: "steering.retarget_secs",
                min: 3.0,
                max: 1.0
            })
        );
    }
}
