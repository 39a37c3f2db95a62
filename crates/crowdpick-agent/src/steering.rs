//! Desired-direction steering for a single racer.
//!
//! Each running tick blends, in order: wander retargeting, random jitter,
//! attraction to the wander target, a push out of the arena centre, reactive
//! wall repulsion and predictive look-ahead steering. Every additive blend is
//! renormalized, so the result is always a unit vector on the XZ plane.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::arena::{Arena, Wall};
use crate::math::{planar_unit, planar_unit_or, proximity_falloff};
use crate::tuning::SteeringTuning;

/// Default forward direction used when every other fallback is degenerate.
pub const FORWARD: Vec3 = Vec3::Z;

/// Per-tick steering inputs.
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    pub position: Vec3,
    pub heading: Vec3,
    pub desired: Vec3,
    pub arena: &'a Arena,
    pub tuning: &'a SteeringTuning,
    pub dt: f32,
}

/// Wander bookkeeping carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringState {
    pub wander_target: Vec3,
    /// Seconds until the next retarget
    pub wander_timer: f32,
    /// Whether the short first interval has been used up
    retargeted: bool,
}

impl Default for SteeringState {
    fn default() -> Self {
        Self {
            wander_target: Vec3::ZERO,
            wander_timer: 0.0,
            retargeted: false,
        }
    }
}

impl SteeringState {
    /// Forget the wander plan; the next running tick picks a fresh target.
    pub fn restart(&mut self) {
        self.wander_timer = 0.0;
        self.retargeted = false;
    }

    /// Compute the new desired direction.
    pub fn steer<R: Rng + ?Sized>(&mut self, ctx: &SteeringContext<'_>, rng: &mut R) -> Vec3 {
        let tuning = ctx.tuning;
        let arena = ctx.arena;
        let half = arena.half_extent();
        let position = Vec3::new(ctx.position.x, 0.0, ctx.position.z);
        let heading = planar_unit_or(ctx.heading, FORWARD);

        self.wander_timer -= ctx.dt;
        if self.wander_timer <= 0.0 {
            self.retarget(position, half, tuning, rng);
        }

        let mut desired = planar_unit_or(ctx.desired, heading);

        let threat = wall_threat(arena, position, tuning.wall_margin);
        let jitter =
            random_unit(rng) * tuning.jitter_strength * (1.0 + tuning.wall_threat_boost * threat);
        desired = planar_unit_or(desired + jitter, desired);

        if let Some(to_target) = planar_unit(self.wander_target - position) {
            let pull = to_target * tuning.target_weight + heading * tuning.heading_persistence;
            desired = planar_unit_or(desired + pull, desired);
        }

        let center_radius = half * tuning.center_zone_fraction;
        let center_distance = position.length();
        if center_radius > 0.0 && center_distance < center_radius {
            let away = planar_unit(position).unwrap_or(heading);
            let push = away * tuning.center_push * (1.0 - center_distance / center_radius);
            desired = planar_unit_or(desired + push, desired);
        }

        let reactive = Wall::ALL.iter().fold(Vec3::ZERO, |acc, &wall| {
            let force = proximity_falloff(arena.distance_to(wall, position), tuning.wall_margin);
            acc + wall.inward_normal() * force
        });
        if reactive != Vec3::ZERO {
            desired = planar_unit_or(desired + reactive * tuning.wall_weight, desired);
        }

        let predictive = predictive_force(arena, position, heading, tuning);
        if predictive != Vec3::ZERO {
            desired = planar_unit_or(desired + predictive, desired);
        }

        // Right at a wall, never keep pushing into it.
        for wall in Wall::ALL {
            if arena.distance_to(wall, position) < tuning.hard_zone {
                let normal = wall.inward_normal();
                let into = desired.dot(normal);
                if into < 0.0 {
                    desired -= normal * into;
                }
            }
        }

        planar_unit(desired)
            .or_else(|| planar_unit(-position))
            .unwrap_or(FORWARD)
    }

    fn retarget<R: Rng + ?Sized>(
        &mut self,
        position: Vec3,
        half: f32,
        tuning: &SteeringTuning,
        rng: &mut R,
    ) {
        let bearing = if position.length_squared() > 1e-6 {
            position.z.atan2(position.x)
        } else {
            rng.gen_range(0.0..TAU)
        };
        let spread = tuning.target_spread_degrees.abs().to_radians();
        let angle = bearing + rng.gen_range(-spread..=spread);
        let radius = half * sample_span(rng, tuning.target_radius_fraction);
        self.wander_target = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

        let interval = if self.retargeted {
            tuning.retarget_secs
        } else {
            tuning.first_retarget_secs
        };
        self.retargeted = true;
        self.wander_timer = sample_span(rng, interval);

        log::trace!(
            "Wander target ({:.2}, {:.2}), next retarget in {:.2}s",
            self.wander_target.x,
            self.wander_target.z,
            self.wander_timer
        );
    }
}

/// 0 in open space, approaching 1 right at the nearest wall.
pub fn wall_threat(arena: &Arena, position: Vec3, margin: f32) -> f32 {
    Wall::ALL
        .iter()
        .map(|&wall| proximity_falloff(arena.distance_to(wall, position), margin))
        .fold(0.0, f32::max)
}

/// Repulsion plus tangential slide for walls the look-ahead point is closing in on.
fn predictive_force(
    arena: &Arena,
    position: Vec3,
    heading: Vec3,
    tuning: &SteeringTuning,
) -> Vec3 {
    if tuning.predict_margin <= 0.0 {
        return Vec3::ZERO;
    }
    let ahead = position + heading * tuning.look_ahead;
    let mut force = Vec3::ZERO;
    for wall in Wall::ALL {
        let distance = arena.distance_to(wall, ahead);
        if distance >= tuning.predict_margin {
            continue;
        }
        let severity = (1.0 - distance / tuning.predict_margin).clamp(0.0, 1.0);
        let normal = wall.inward_normal();
        let tangent = Vec3::new(-normal.z, 0.0, normal.x);
        let side = if heading.dot(tangent) >= 0.0 { 1.0 } else { -1.0 };
        force += normal * severity * tuning.predict_weight
            + tangent * side * severity * tuning.slide_weight;
    }
    force
}

/// Uniform draw from an inclusive `(min, max)` span; degenerate spans return `min`.
pub fn sample_span<R: Rng + ?Sized>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn ctx<'a>(
        arena: &'a Arena,
        tuning: &'a SteeringTuning,
        position: Vec3,
        heading: Vec3,
    ) -> SteeringContext<'a> {
        SteeringContext {
            position,
            heading,
            desired: heading,
            arena,
            tuning,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_output_is_unit_and_planar() {
        let arena = Arena::default();
        let tuning = SteeringTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut state = SteeringState::default();
        for &(x, z) in &[(0.0, 0.0), (9.4, 9.4), (-9.5, 3.0), (2.0, -8.8)] {
            let c = ctx(&arena, &tuning, Vec3::new(x, 0.5, z), Vec3::X);
            let d = state.steer(&c, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-6);
            assert_eq!(d.y, 0.0);
        }
    }

    #[test]
    fn test_retarget_lands_in_outer_band_near_bearing() {
        let arena = Arena::default();
        let tuning = SteeringTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let position = Vec3::new(4.0, 0.0, 4.0);
        let bearing = position.z.atan2(position.x);
        for _ in 0..50 {
            let mut state = SteeringState::default();
            state.steer(&ctx(&arena, &tuning, position, Vec3::Z), &mut rng);
            let target = state.wander_target;
            let radius = target.length();
            let half = arena.half_extent();
            assert!(radius >= half * 0.80 - 1e-4 && radius <= half * 0.98 + 1e-4);
            let deviation = crate::math::shortest_angle(bearing, target.z.atan2(target.x));
            assert!(deviation.abs() <= 54f32.to_radians() + 1e-4);
            assert!(state.wander_timer >= 0.8 && state.wander_timer <= 1.6);
        }
    }

    #[test]
    fn test_second_retarget_uses_long_interval() {
        let arena = Arena::default();
        let tuning = SteeringTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut state = SteeringState::default();
        state.steer(&ctx(&arena, &tuning, Vec3::new(1.0, 0.0, 0.0), Vec3::X), &mut rng);
        state.wander_timer = 0.0;
        state.steer(&ctx(&arena, &tuning, Vec3::new(1.0, 0.0, 0.0), Vec3::X), &mut rng);
        assert!(state.wander_timer >= 4.5 - 1.0 / 60.0 && state.wander_timer <= 7.3);
    }

    #[test]
    fn test_hard_zone_removes_component_into_wall() {
        let arena = Arena::default();
        let tuning = SteeringTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut state = SteeringState::default();
        let position = Vec3::new(arena.half_extent() - 0.1, 0.0, 0.0);
        for _ in 0..20 {
            let d = state.steer(&ctx(&arena, &tuning, position, Vec3::X), &mut rng);
            assert!(d.x <= 1e-6, "desired {d:?} still points into the wall");
        }
    }

    #[test]
    fn test_corner_pushes_back_toward_center() {
        let arena = Arena::default();
        let tuning = SteeringTuning {
            jitter_strength: 0.0,
            target_weight: 0.0,
            heading_persistence: 0.0,
            ..SteeringTuning::default()
        };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut state = SteeringState::default();
        let half = arena.half_extent();
        let heading = Vec3::new(1.0, 0.0, 1.0).normalize();
        let d = state.steer(
            &ctx(&arena, &tuning, Vec3::new(half - 0.6, 0.0, half - 0.6), heading),
            &mut rng,
        );
        assert!(d.x < 0.0 && d.z < 0.0, "corner steering gave {d:?}");
    }

    #[test]
    fn test_center_push_points_outward() {
        let arena = Arena::default();
        let tuning = SteeringTuning {
            jitter_strength: 0.0,
            target_weight: 0.0,
            heading_persistence: 0.0,
            center_push: 10.0,
            ..SteeringTuning::default()
        };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut state = SteeringState::default();
        let c = SteeringContext {
            desired: Vec3::NEG_X,
            ..ctx(&arena, &tuning, Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X)
        };
        let d = state.steer(&c, &mut rng);
        assert!(d.x > 0.0);
    }

    #[test]
    fn test_wall_threat_grows_near_walls() {
        let arena = Arena::default();
        assert_eq!(wall_threat(&arena, Vec3::ZERO, 2.0), 0.0);
        let near = wall_threat(&arena, Vec3::new(9.0, 0.0, 0.0), 2.0);
        let nearer = wall_threat(&arena, Vec3::new(9.4, 0.0, 0.0), 2.0);
        assert!(near > 0.0 && nearer > near && nearer <= 1.0);
    }

    #[test]
    fn test_same_seed_same_direction() {
        let arena = Arena::default();
        let tuning = SteeringTuning::default();
        let run = |seed| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let mut state = SteeringState::default();
            let steering = ctx(&arena, &tuning, Vec3::new(3.0, 0.0, -2.0), Vec3::X);
            (0..30)
                .map(|_| state.steer(&steering, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
