//! A single racer: steering, heading/speed integration, hard clamp and gait.
//!
//! `Agent` is a small `Copy` value. [`Agent::step`] consumes the previous state
//! and returns the next one, so steering, integration and animation always
//! run in the same order.

use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::locomotion::{GaitInput, GaitState, LimbPose, Pose};
use crate::math::{exp_blend, planar_unit, planar_unit_or, CriticallyDamped};
use crate::steering::{sample_span, SteeringContext, SteeringState, FORWARD};
use crate::tuning::{AgentTuning, MotionTuning};
use crate::types::AgentId;

/// Everything an agent reads from the outside world during a tick.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub arena: &'a Arena,
    pub tuning: &'a AgentTuning,
    /// Raw frame delta in seconds; clamped to `tuning.motion.max_dt`
    pub dt: f32,
}

/// Autonomous racer state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading: Vec3,
    pub desired_direction: Vec3,
    pub is_running: bool,
    /// Current scalar speed (units/sec)
    pub speed: f32,
    max_speed: f32,
    /// Phase of the slow speed wobble
    speed_clock: f32,
    heading_filter: [CriticallyDamped; 2],
    pub steering: SteeringState,
    pub gait: GaitState,
    /// Height above ground imposed from outside (selection lift)
    elevation: f32,
    /// Tilt about X and Z imposed from outside (radians)
    tilt: Vec2,
}

impl Agent {
    /// Agent standing at `position` facing `heading`.
    pub fn new(position: Vec3, max_speed: f32, heading: Vec3) -> Self {
        let heading = planar_unit_or(heading, FORWARD);
        Self {
            id: AgentId::new(),
            position,
            velocity: Vec3::ZERO,
            heading,
            desired_direction: heading,
            is_running: false,
            speed: 0.0,
            max_speed: max_speed.max(0.0),
            speed_clock: 0.0,
            heading_filter: [
                CriticallyDamped::new(heading.x),
                CriticallyDamped::new(heading.z),
            ],
            steering: SteeringState::default(),
            gait: GaitState::new(heading.x.atan2(heading.z)),
            elevation: 0.0,
            tilt: Vec2::ZERO,
        }
    }

    /// Agent at a random spot in the inner half of the arena with a random top speed.
    pub fn spawn<R: Rng + ?Sized>(arena: &Arena, tuning: &MotionTuning, rng: &mut R) -> Self {
        let spread = arena.size * 0.5;
        let position = Vec3::new(
            (rng.gen::<f32>() - 0.5) * spread,
            arena.ground_height(),
            (rng.gen::<f32>() - 0.5) * spread,
        );
        let max_speed = sample_span(rng, tuning.max_speed_range);
        let angle = rng.gen_range(0.0..TAU);
        let mut agent = Self::new(position, max_speed, Vec3::new(angle.sin(), 0.0, angle.cos()));
        agent.clamp_to(arena);
        agent
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn run_phase(&self) -> f32 {
        self.gait.run_phase
    }

    pub fn pose(&self) -> &Pose {
        &self.gait.pose
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Set off in a random direction at a fraction of top speed.
    pub fn start_running<R: Rng + ?Sized>(&mut self, tuning: &MotionTuning, rng: &mut R) {
        let angle = rng.gen_range(0.0..TAU);
        let heading = Vec3::new(angle.cos(), 0.0, angle.sin());
        self.heading = heading;
        self.desired_direction = heading;
        self.heading_filter[0].reset(heading.x);
        self.heading_filter[1].reset(heading.z);
        self.speed_clock = rng.gen_range(0.0..TAU);
        self.speed = self.max_speed * tuning.start_speed_fraction.clamp(0.0, 1.0);
        self.velocity = heading * self.speed;
        self.steering.restart();
        self.is_running = true;
    }

    /// Halt immediately. Safe to call repeatedly.
    pub fn stop_running(&mut self) {
        self.is_running = false;
        self.speed = 0.0;
        self.velocity = Vec3::ZERO;
        self.gait.stop();
    }

    /// Move the agent, keeping it inside the arena and on its current height.
    pub fn place(&mut self, arena: &Arena, x: f32, z: f32) {
        self.position = Vec3::new(x, arena.ground_height() + self.elevation, z);
        self.clamp_to(arena);
    }

    /// Lift offset and tilt imposed by the selection sequence.
    pub fn set_lift(&mut self, arena: &Arena, elevation: f32, tilt: Vec2) {
        self.elevation = elevation;
        self.tilt = tilt;
        self.position.y = arena.ground_height() + elevation;
    }

    pub fn clear_lift(&mut self, arena: &Arena) {
        self.set_lift(arena, 0.0, Vec2::ZERO);
    }

    /// Advance one tick and return the next state.
    pub fn step<R: Rng + ?Sized>(mut self, ctx: &StepContext<'_>, rng: &mut R) -> Self {
        let motion = &ctx.tuning.motion;
        let dt = if ctx.dt.is_finite() {
            ctx.dt.clamp(0.0, motion.max_dt)
        } else {
            0.0
        };

        if self.is_running {
            let steering = SteeringContext {
                position: self.position,
                heading: self.heading,
                desired: self.desired_direction,
                arena: ctx.arena,
                tuning: &ctx.tuning.steering,
                dt,
            };
            self.desired_direction = self.steering.steer(&steering, rng);
            self.integrate_heading(motion, dt);

            self.speed_clock += dt * motion.speed_wobble_frequency;
            let wobble = motion.speed_wobble.clamp(0.0, 0.5);
            let cruise = self.max_speed * (1.0 - wobble + wobble * self.speed_clock.sin());
            self.speed += (cruise - self.speed) * exp_blend(motion.acceleration, dt);
            self.speed = self.speed.clamp(0.0, self.max_speed);
            self.velocity = self.heading * self.speed;

            self.position.x += self.velocity.x * dt;
            self.position.z += self.velocity.z * dt;
            self.enforce_bounds(ctx.arena);
        } else {
            self.speed = 0.0;
            self.velocity = Vec3::ZERO;
        }

        self.gait.update(
            &GaitInput {
                speed: self.speed,
                max_speed: self.max_speed,
                is_running: self.is_running,
                velocity: self.velocity,
                dt,
            },
            &ctx.tuning.gait,
        );
        self.position.y = ctx.arena.ground_height() + self.elevation;
        self
    }

    fn integrate_heading(&mut self, motion: &MotionTuning, dt: f32) {
        let blended = self
            .heading
            .lerp(self.desired_direction, exp_blend(motion.responsiveness, dt));
        let smoothed = planar_unit_or(blended, self.desired_direction);
        let x = self.heading_filter[0].update(smoothed.x, motion.heading_filter_omega, dt);
        let z = self.heading_filter[1].update(smoothed.z, motion.heading_filter_omega, dt);
        self.heading = planar_unit_or(Vec3::new(x, 0.0, z), smoothed);
    }

    /// Hard backstop: clamp into the arena and turn the desired direction away
    /// from any wall that was crossed.
    fn enforce_bounds(&mut self, arena: &Arena) {
        let half = arena.half_extent();
        if self.position.x.abs() > half {
            let side = self.position.x.signum();
            self.position.x = side * half;
            if self.desired_direction.x * side > 0.0 {
                self.desired_direction.x = -self.desired_direction.x;
            }
        }
        if self.position.z.abs() > half {
            let side = self.position.z.signum();
            self.position.z = side * half;
            if self.desired_direction.z * side > 0.0 {
                self.desired_direction.z = -self.desired_direction.z;
            }
        }
        self.desired_direction = planar_unit(self.desired_direction).unwrap_or(self.heading);
    }

    fn clamp_to(&mut self, arena: &Arena) {
        let half = arena.half_extent();
        self.position.x = self.position.x.clamp(-half, half);
        self.position.z = self.position.z.clamp(-half, half);
    }

    /// Snapshot for the render collaborator.
    pub fn transform(&self) -> AgentTransform {
        let pose = &self.gait.pose;
        AgentTransform {
            position: self.position + Vec3::Y * pose.bounce,
            rotation: Quat::from_euler(
                EulerRot::YXZ,
                pose.facing,
                pose.lean + self.tilt.x,
                self.tilt.y,
            ),
            scale: pose.scale,
            limbs: LimbRotations::from(pose.limbs),
        }
    }
}

/// Local rotation of each limb about its hip or shoulder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimbRotations {
    pub left_leg: Quat,
    pub right_leg: Quat,
    pub left_arm: Quat,
    pub right_arm: Quat,
}

impl From<LimbPose> for LimbRotations {
    fn from(limbs: LimbPose) -> Self {
        Self {
            left_leg: Quat::from_rotation_x(limbs.left_leg),
            right_leg: Quat::from_rotation_x(limbs.right_leg),
            left_arm: Quat::from_rotation_x(limbs.left_arm),
            right_arm: Quat::from_rotation_x(limbs.right_arm),
        }
    }
}

/// Writable per-agent transform read by the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub limbs: LimbRotations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    const DT: f32 = 1.0 / 60.0;

    fn ctx<'a>(arena: &'a Arena, tuning: &'a AgentTuning) -> StepContext<'a> {
        StepContext {
            arena,
            tuning,
            dt: DT,
        }
    }

    #[test]
    fn test_start_running_sets_bounded_speed() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut agent = Agent::spawn(&arena, &tuning.motion, &mut rng);
        agent.start_running(&tuning.motion, &mut rng);
        assert!(agent.is_running);
        let v = agent.velocity.length();
        assert!(v > 0.0 && v <= agent.max_speed());
        assert!(agent.max_speed() >= 2.6 && agent.max_speed() <= 4.2);
    }

    #[test]
    fn test_stop_running_twice_is_idempotent() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut agent = Agent::spawn(&arena, &tuning.motion, &mut rng);
        agent.start_running(&tuning.motion, &mut rng);
        for _ in 0..30 {
            agent = agent.step(&ctx(&arena, &tuning), &mut rng);
        }
        assert!(agent.run_phase() > 0.0);
        agent.stop_running();
        agent.stop_running();
        assert_eq!(agent.velocity, Vec3::ZERO);
        assert_eq!(agent.run_phase(), 0.0);
        assert!(!agent.is_running);

        let after = agent.step(&ctx(&arena, &tuning), &mut rng);
        assert_eq!(after.velocity, Vec3::ZERO);
        assert_eq!(after.position.x, agent.position.x);
        assert_eq!(after.run_phase(), 0.0);
    }

    #[test]
    fn test_boundary_regression() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let half = arena.half_extent();
        let start = Vec3::new(half - 0.001, arena.ground_height(), 0.0);
        let mut agent = Agent::new(start, 4.0, Vec3::X);
        agent.is_running = true;
        agent.speed = 4.0;
        agent.desired_direction = Vec3::X;
        let next = agent.step(&ctx(&arena, &tuning), &mut rng);
        assert!(next.position.x <= half);
    }

    #[test]
    fn test_clamp_flips_desired_component() {
        let arena = Arena::default();
        let half = arena.half_extent();
        let mut agent = Agent::new(Vec3::new(half + 0.3, 0.5, 0.0), 4.0, Vec3::X);
        agent.desired_direction = Vec3::new(0.6, 0.0, 0.8);
        agent.enforce_bounds(&arena);
        assert_eq!(agent.position.x, half);
        assert!(agent.desired_direction.x < 0.0);
        assert!((agent.desired_direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_headings_stay_unit_while_running() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut agent = Agent::spawn(&arena, &tuning.motion, &mut rng);
        agent.start_running(&tuning.motion, &mut rng);
        for _ in 0..600 {
            agent = agent.step(&ctx(&arena, &tuning), &mut rng);
            assert!((agent.heading.length() - 1.0).abs() <= 1e-6);
            assert!((agent.desired_direction.length() - 1.0).abs() <= 1e-6);
            assert!(arena.contains(agent.position));
            assert!(agent.speed <= agent.max_speed());
        }
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        let mut agent = Agent::new(Vec3::new(0.0, 0.5, 0.0), 4.0, Vec3::X);
        agent.start_running(&tuning.motion, &mut rng);
        let before = agent.position;
        let stalled = StepContext {
            dt: 3.0,
            ..ctx(&arena, &tuning)
        };
        let next = agent.step(&stalled, &mut rng);
        let moved = (next.position - before).length();
        assert!(moved <= agent.max_speed() * tuning.motion.max_dt + 1e-5);
    }

    #[test]
    fn test_lift_sets_height_and_survives_step() {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        let mut agent = Agent::new(Vec3::new(1.0, 0.5, 1.0), 3.0, Vec3::Z);
        agent.set_lift(&arena, 2.0, Vec2::new(0.1, -0.1));
        let agent = agent.step(&ctx(&arena, &tuning), &mut rng);
        assert!((agent.position.y - (arena.ground_height() + 2.0)).abs() < 1e-6);
        assert_eq!(agent.elevation(), 2.0);
    }

    #[test]
    fn test_transform_reflects_facing() {
        let agent = Agent::new(Vec3::new(0.0, 0.5, 0.0), 3.0, Vec3::X);
        let t = agent.transform();
        let forward = t.rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
