//! Lift-away curve for the chosen racer.
//!
//! Independent of steering: the orchestrator samples these curves by phase
//! time and pushes the result onto the agent with `Agent::set_lift`.

use crowdpick_agent::tuning::{finite, non_negative, TuningError};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::EaseType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftTuning {
    /// Seconds of the crouch before take-off
    pub squat_secs: f32,
    /// How far the body dips during the crouch
    pub squat_depth: f32,
    /// Seconds from ground to lift height
    pub rise_secs: f32,
    /// Height above ground where the rise ends and floating begins
    pub lift_height: f32,
    /// Vertical bob around `lift_height` while floating
    pub bob_amplitude: f32,
    /// Bob angular frequency (rad/sec)
    pub bob_frequency: f32,
    /// Peak tilt about each axis while floating (radians)
    pub tilt_amplitude: f32,
    /// Tilt angular frequencies about X and Z (rad/sec)
    pub tilt_frequency: (f32, f32),
}

impl Default for LiftTuning {
    fn default() -> Self {
        Self {
            squat_secs: 0.3,
            squat_depth: 0.12,
            rise_secs: 1.2,
            lift_height: 2.0,
            bob_amplitude: 0.12,
            bob_frequency: 2.2,
            tilt_amplitude: 0.08,
            tilt_frequency: (1.3, 0.9),
        }
    }
}

impl LiftTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        non_negative("lift.squat_secs", self.squat_secs)?;
        finite("lift.squat_depth", self.squat_depth)?;
        non_negative("lift.rise_secs", self.rise_secs)?;
        finite("lift.lift_height", self.lift_height)?;
        finite("lift.bob_amplitude", self.bob_amplitude)?;
        finite("lift.bob_frequency", self.bob_frequency)?;
        finite("lift.tilt_amplitude", self.tilt_amplitude)?;
        finite("lift.tilt_frequency", self.tilt_frequency.0)?;
        finite("lift.tilt_frequency", self.tilt_frequency.1)?;
        Ok(())
    }

    pub fn total_secs(&self) -> f32 {
        self.squat_secs.max(0.0) + self.rise_secs.max(0.0)
    }

    /// Height above ground `elapsed` seconds into the lift.
    ///
    /// Eases down into the crouch and back up, then rises cubic-out to
    /// `lift_height`. No rotation is applied while lifting.
    pub fn lifting_elevation(&self, elapsed: f32) -> f32 {
        let elapsed = elapsed.max(0.0);
        let squat = self.squat_secs.max(0.0);
        if elapsed < squat {
            let half = squat * 0.5;
            let dip = if elapsed < half {
                EaseType::QuadIn.apply(elapsed / half)
            } else {
                1.0 - EaseType::QuadOut.apply((elapsed - half) / half)
            };
            return -self.squat_depth * dip;
        }

        let rise = self.rise_secs.max(0.0);
        if rise <= 0.0 {
            return self.lift_height;
        }
        let t = ((elapsed - squat) / rise).min(1.0);
        self.lift_height * EaseType::CubicOut.apply(t)
    }

    /// Height and tilt `elapsed` seconds into floating.
    pub fn floating_pose(&self, elapsed: f32) -> (f32, Vec2) {
        let bob = (elapsed * self.bob_frequency).sin();
        let elevation = self.lift_height + self.bob_amplitude * bob;
        let tilt = Vec2::new(
            self.tilt_amplitude * (elapsed * self.tilt_frequency.0).sin(),
            self.tilt_amplitude * (elapsed * self.tilt_frequency.1).sin(),
        );
        (elevation, tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squat_dips_then_recovers() {
        let lift = LiftTuning::default();
        assert!(lift.lifting_elevation(0.0).abs() < 1e-6);
        assert!((lift.lifting_elevation(0.15) + lift.squat_depth).abs() < 1e-5);
        assert!(lift.lifting_elevation(0.1) < 0.0);
        assert!(lift.lifting_elevation(0.3).abs() < 1e-5);
    }

    #[test]
    fn test_rise_reaches_height_monotonically() {
        let lift = LiftTuning::default();
        let mut last = lift.lifting_elevation(lift.squat_secs);
        for i in 1..=60 {
            let h = lift.lifting_elevation(lift.squat_secs + i as f32 * 0.02);
            assert!(h >= last - 1e-6);
            last = h;
        }
        assert!((lift.lifting_elevation(lift.total_secs()) - lift.lift_height).abs() < 1e-5);
        assert!((lift.lifting_elevation(10.0) - lift.lift_height).abs() < 1e-5);
    }

    #[test]
    fn test_floating_starts_at_lift_height() {
        let lift = LiftTuning::default();
        let (h, tilt) = lift.floating_pose(0.0);
        assert_eq!(h, lift.lift_height);
        assert_eq!(tilt, Vec2::ZERO);
        for i in 0..200 {
            let (h, tilt) = lift.floating_pose(i as f32 * 0.05);
            assert!((h - lift.lift_height).abs() <= lift.bob_amplitude + 1e-6);
            assert!(tilt.x.abs() <= lift.tilt_amplitude + 1e-6);
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(LiftTuning::default().validate(), Ok(()));
        let lift = LiftTuning {
            rise_secs: f32::NAN,
            ..LiftTuning::default()
        };
        assert!(matches!(
            lift.validate(),
            Err(TuningError::NotFinite {
                field: "lift.rise_secs",
                ..
            })
        ));
        let lift = LiftTuning {
            squat_secs: -0.1,
            ..LiftTuning::default()
        };
        assert!(lift.validate().is_err());
    }
}
