//! Per-tick invariants over randomized starting states.
//!
//! Every running tick must leave heading and desired direction at unit length
//! and the agent centre inside the clamp boundary, regardless of where the
//! agent starts, which way it faces, or how uneven the frame timing is.

use crowdpick_agent::{Agent, AgentTuning, Arena, StepContext};
use glam::Vec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const EPSILON: f32 = 1e-6;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unit_headings_and_containment(
        seed in any::<u64>(),
        x in -1.0f32..=1.0,
        z in -1.0f32..=1.0,
        angle in 0.0f32..std::f32::consts::TAU,
        dt in 0.001f32..0.2,
        size in 4.0f32..40.0,
    ) {
        let arena = Arena::new(size, 0.5).unwrap();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let half = arena.half_extent();

        let mut agent = Agent::new(
            Vec3::new(x * half, arena.ground_height(), z * half),
            3.5,
            Vec3::new(angle.sin(), 0.0, angle.cos()),
        );
        agent.start_running(&tuning.motion, &mut rng);

        let ctx = StepContext { arena: &arena, tuning: &tuning, dt };
        for _ in 0..300 {
            agent = agent.step(&ctx, &mut rng);
            prop_assert!((agent.heading.length() - 1.0).abs() <= EPSILON);
            prop_assert!((agent.desired_direction.length() - 1.0).abs() <= EPSILON);
            prop_assert!(agent.position.x.abs() <= half);
            prop_assert!(agent.position.z.abs() <= half);
            prop_assert_eq!(agent.velocity.y, 0.0);
        }
    }

    #[test]
    fn pointing_at_a_wall_never_escapes(seed in any::<u64>(), offset in 0.0f32..0.01) {
        let arena = Arena::default();
        let tuning = AgentTuning::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let half = arena.half_extent();

        let start = Vec3::new(half - offset, arena.ground_height(), 0.0);
        let mut agent = Agent::new(start, 4.2, Vec3::X);
        agent.is_running = true;
        agent.speed = agent.max_speed();
        agent.desired_direction = Vec3::X;

        let ctx = StepContext { arena: &arena, tuning: &tuning, dt: 0.05 };
        for _ in 0..20 {
            agent = agent.step(&ctx, &mut rng);
            prop_assert!(agent.position.x <= half);
        }
    }
}

#[test]
fn same_seed_same_trajectory() {
    let arena = Arena::default();
    let tuning = AgentTuning::default();
    let run = |seed: u64| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut agent = Agent::spawn(&arena, &tuning.motion, &mut rng);
        agent.start_running(&tuning.motion, &mut rng);
        let ctx = StepContext { arena: &arena, tuning: &tuning, dt: 1.0 / 60.0 };
        (0..240)
            .map(|_| {
                agent = agent.step(&ctx, &mut rng);
                agent.position
            })
            .collect::<Vec<_>>()
    };
    let a = run(99);
    let b = run(99);
    for (p, q) in a.iter().zip(&b) {
        assert!((*p - *q).length() < 1e-6);
    }
    assert_ne!(run(99), run(100));
}
