//! Procedural gait: limb swing, bounce, lean, squash-stretch and facing.
//!
//! The animator only shapes how an agent looks. It is driven by speed,
//! run state and `dt`, and never feeds back into steering.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::{exp_blend, planar_unit, shortest_angle, wrap_angle};
use crate::tuning::GaitTuning;

/// Swing angles about each limb's lateral axis (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LimbPose {
    pub left_leg: f32,
    pub right_leg: f32,
    pub left_arm: f32,
    pub right_arm: f32,
}

impl LimbPose {
    fn relax(&mut self, k: f32) {
        self.left_leg -= self.left_leg * k;
        self.right_leg -= self.right_leg * k;
        self.left_arm -= self.left_arm * k;
        self.right_arm -= self.right_arm * k;
    }

    pub fn max_abs(&self) -> f32 {
        self.left_leg
            .abs()
            .max(self.right_leg.abs())
            .max(self.left_arm.abs())
            .max(self.right_arm.abs())
    }
}

/// Visual pose offsets produced each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub limbs: LimbPose,
    /// Vertical offset above resting height
    pub bounce: f32,
    /// Forward lean about the lateral axis (radians)
    pub lean: f32,
    /// Yaw, `atan2(x, z)` convention (radians)
    pub facing: f32,
    /// Non-uniform body scale, volume preserving
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            limbs: LimbPose::default(),
            bounce: 0.0,
            lean: 0.0,
            facing: 0.0,
            scale: Vec3::ONE,
        }
    }
}

/// Inputs the animator reads each tick.
#[derive(Debug, Clone, Copy)]
pub struct GaitInput {
    pub speed: f32,
    pub max_speed: f32,
    pub is_running: bool,
    pub velocity: Vec3,
    pub dt: f32,
}

/// Gait accumulators carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaitState {
    /// Gait cycle accumulator; only advances while moving
    pub run_phase: f32,
    /// 0 at rest, follows the speed ratio while moving
    pub blend: f32,
    /// Vertical stretch factor `s`; the other axes get `1/sqrt(s)`
    stretch: f32,
    pub pose: Pose,
}

impl GaitState {
    pub fn new(facing: f32) -> Self {
        Self {
            run_phase: 0.0,
            blend: 0.0,
            stretch: 1.0,
            pose: Pose {
                facing,
                ..Pose::default()
            },
        }
    }

    /// Drop the cycle immediately; amplitudes fade on later ticks.
    pub fn stop(&mut self) {
        self.run_phase = 0.0;
    }

    pub fn update(&mut self, input: &GaitInput, tuning: &GaitTuning) -> Pose {
        let dt = input.dt.max(0.0);
        let ratio = if input.max_speed > 0.0 {
            (input.speed / input.max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if input.velocity.length_squared() > tuning.moving_epsilon * tuning.moving_epsilon {
            if let Some(dir) = planar_unit(input.velocity) {
                let target = dir.x.atan2(dir.z);
                let turn = shortest_angle(self.pose.facing, target);
                self.pose.facing =
                    wrap_angle(self.pose.facing + turn * exp_blend(tuning.turn_response, dt));
            }
        }

        let moving = input.is_running && input.speed > tuning.moving_epsilon;
        if moving {
            let (min_mult, max_mult) = tuning.frequency_multiplier;
            let multiplier =
                (ratio * tuning.frequency_gain).clamp(min_mult, max_mult.max(min_mult));
            self.run_phase += dt * tuning.stride_frequency * multiplier;
            self.blend += (ratio - self.blend) * exp_blend(tuning.blend_response, dt);

            let leg = lerp(tuning.leg_swing.0, tuning.leg_swing.1, ratio) * self.blend;
            let arm = lerp(tuning.arm_swing.0, tuning.arm_swing.1, ratio) * self.blend;
            let swing = self.run_phase.sin();
            self.pose.limbs = LimbPose {
                left_leg: swing * leg,
                right_leg: -swing * leg,
                left_arm: -swing * arm,
                right_arm: swing * arm,
            };
            self.pose.bounce = swing.abs() * tuning.bounce_height * self.blend;
            self.pose.lean +=
                (ratio * tuning.max_lean - self.pose.lean) * exp_blend(tuning.lean_response, dt);
            self.stretch = 1.0 + tuning.squash * self.blend * (2.0 * self.run_phase).sin();
        } else {
            self.run_phase = 0.0;
            let k = exp_blend(tuning.relax_rate, dt);
            self.blend -= self.blend * k;
            self.pose.limbs.relax(k);
            self.pose.bounce -= self.pose.bounce * k;
            self.pose.lean -= self.pose.lean * k;
            self.stretch += (1.0 - self.stretch) * k;
        }

        let stretch = self.stretch.max(0.1);
        let squeeze = 1.0 / stretch.sqrt();
        self.pose.scale = Vec3::new(squeeze, stretch, squeeze);
        self.pose
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
