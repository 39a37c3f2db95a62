//! Spinning-wheel picker: the same selection semantics as the race, without
//! any 3D.
//!
//! The wheel is simulated on a fixed reference step (60 Hz by default) fed
//! from a `dt` accumulator, so the spin plays out identically at any frame
//! rate. Angles follow canvas conventions: radians, clockwise, with the
//! pointer at the top (3π/2).

use std::f32::consts::{PI, TAU};

use crowdpick_agent::tuning::{finite, non_negative, ordered_span, positive, TuningError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::roster::Participant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTuning {
    /// Reference frames per second
    pub reference_hz: f32,
    /// Initial angular speed in radians per reference frame
    pub initial_speed: (f32, f32),
    /// Seconds at full speed before the slowdown starts
    pub full_speed_secs: (f32, f32),
    /// Per-frame speed factor once slowing down
    pub decay: f32,
    /// How much the factor itself shrinks each frame
    pub decay_step: f32,
    /// Below this speed (radians per frame) the wheel stops
    pub stop_speed: f32,
    /// Fraction of a slice around a boundary that counts as a tie
    pub tie_epsilon: f32,
    /// Pointer position in canvas angle
    pub pointer_angle: f32,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            reference_hz: 60.0,
            initial_speed: (0.3, 0.6),
            full_speed_secs: (0.5, 2.0),
            decay: 0.99,
            decay_step: 0.005,
            stop_speed: 0.002,
            tie_epsilon: 0.001,
            pointer_angle: 3.0 * PI / 2.0,
        }
    }
}

impl WheelTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("wheel.reference_hz", self.reference_hz)?;
        let (min, _) = ordered_span("wheel.initial_speed", self.initial_speed)?;
        non_negative("wheel.initial_speed", min)?;
        let (min, _) = ordered_span("wheel.full_speed_secs", self.full_speed_secs)?;
        non_negative("wheel.full_speed_secs", min)?;
        non_negative("wheel.decay", self.decay)?;
        non_negative("wheel.decay_step", self.decay_step)?;
        positive("wheel.stop_speed", self.stop_speed)?;
        non_negative("wheel.tie_epsilon", self.tie_epsilon)?;
        finite("wheel.pointer_angle", self.pointer_angle)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WheelOutcome {
    /// Pointer inside a slice; the winner has been taken off the wheel.
    Winner { index: usize, participant: Participant },
    /// Pointer on a boundary; both neighbours stay on the wheel.
    Tie { first: Participant, second: Participant },
}

#[derive(Debug, Clone, Default)]
struct Spin {
    /// Radians per reference frame
    speed: f32,
    decay: f32,
    full_speed_secs: f32,
    elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Wheel {
    tuning: WheelTuning,
    participants: Vec<Participant>,
    angle: f32,
    spin: Option<Spin>,
    accumulator: f32,
}

impl Wheel {
    pub fn new(tuning: WheelTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    /// Load the visible participants as equal slices and stop any spin.
    pub fn set_participants(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.participants = participants.into_iter().filter(|p| p.visible).collect();
        self.spin = None;
        self.accumulator = 0.0;
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    /// Start a spin. No-op with an empty wheel or while already spinning.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.participants.is_empty() || self.spin.is_some() {
            return false;
        }
        let speed = span(rng, self.tuning.initial_speed);
        let full_speed_secs = span(rng, self.tuning.full_speed_secs);
        log::debug!(
            "Wheel spin: {:.3} rad/frame, {:.2}s at full speed",
            speed,
            full_speed_secs
        );
        self.spin = Some(Spin {
            speed,
            decay: self.tuning.decay,
            full_speed_secs,
            elapsed: 0.0,
        });
        self.accumulator = 0.0;
        true
    }

    /// Advance by `dt` seconds. Returns the outcome on the frame the wheel stops.
    pub fn update(&mut self, dt: f32) -> Option<WheelOutcome> {
        if self.spin.is_none() {
            return None;
        }
        let frame = 1.0 / self.tuning.reference_hz.max(1.0);
        self.accumulator += if dt.is_finite() { dt.clamp(0.0, 1.0) } else { 0.0 };

        while self.accumulator >= frame {
            self.accumulator -= frame;
            let Some(spin) = self.spin.as_mut() else {
                break;
            };
            if spin.speed > self.tuning.stop_speed {
                self.angle = (self.angle + spin.speed).rem_euclid(TAU);
                if spin.elapsed > spin.full_speed_secs {
                    spin.speed *= spin.decay;
                    spin.decay = (spin.decay - self.tuning.decay_step).max(0.0);
                }
                spin.elapsed += frame;
            } else {
                self.spin = None;
                self.accumulator = 0.0;
                let outcome = self.settle();
                log::debug!("Wheel stopped at {:.3} rad: {:?}", self.angle, outcome);
                return outcome;
            }
        }
        None
    }

    /// Outcome if the wheel rested at `angle`, without touching the wheel.
    pub fn outcome_at(&self, angle: f32) -> Option<WheelOutcome> {
        let count = self.participants.len();
        if count == 0 {
            return None;
        }
        let slice = TAU / count as f32;
        let normalized = angle.rem_euclid(TAU);
        let relative = (self.tuning.pointer_angle - normalized).rem_euclid(TAU);
        let index = ((relative / slice).floor() as usize).min(count - 1);
        let remainder = ((relative - index as f32 * slice) / slice).clamp(0.0, 1.0);
        let eps = self.tuning.tie_epsilon;

        let tie = if count < 2 {
            None
        } else if remainder < eps {
            Some(((index + count - 1) % count, index))
        } else if remainder > 1.0 - eps {
            Some((index, (index + 1) % count))
        } else {
            None
        };

        Some(match tie {
            Some((a, b)) => WheelOutcome::Tie {
                first: self.participants[a].clone(),
                second: self.participants[b].clone(),
            },
            None => WheelOutcome::Winner {
                index,
                participant: self.participants[index].clone(),
            },
        })
    }

    fn settle(&mut self) -> Option<WheelOutcome> {
        let outcome = self.outcome_at(self.angle)?;
        if let WheelOutcome::Winner { index, .. } = &outcome {
            self.participants.remove(*index);
        }
        Some(outcome)
    }
}

fn span<R: Rng + ?Sized>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn wheel(names: &[&str]) -> Wheel {
        let mut wheel = Wheel::new(WheelTuning::default());
        wheel.set_participants(names.iter().map(|n| Participant::new(*n)));
        wheel
    }

    #[test]
    fn test_slice_under_pointer() {
        let wheel = wheel(&["a", "b", "c", "d"]);
        // Pointer sits in the middle of slice 3.
        match wheel.outcome_at(-PI / 4.0) {
            Some(WheelOutcome::Winner { index, participant }) => {
                assert_eq!(index, 3);
                assert_eq!(participant.name, "d");
            }
            other => panic!("expected a winner, got {:?}", other),
        }
        // A quarter turn further moves the pointer back by one slice.
        match wheel.outcome_at(PI / 4.0) {
            Some(WheelOutcome::Winner { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected a winner, got {:?}", other),
        }
    }

    #[test]
    fn test_boundary_is_a_tie() {
        let wheel = wheel(&["a", "b", "c", "d"]);
        match wheel.outcome_at(0.0) {
            Some(WheelOutcome::Tie { first, second }) => {
                assert_eq!(first.name, "c");
                assert_eq!(second.name, "d");
            }
            other => panic!("expected a tie, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_endless_spins() {
        assert_eq!(WheelTuning::default().validate(), Ok(()));
        let tuning = WheelTuning {
            stop_speed: 0.0,
            ..WheelTuning::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                field: "wheel.stop_speed",
                value: 0.0
            })
        );
        let tuning = WheelTuning {
            initial_speed: (0.6, f32::NAN),
            ..WheelTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_single_slice_never_ties() {
        let wheel = wheel(&["solo"]);
        assert!(matches!(
            wheel.outcome_at(0.0),
            Some(WheelOutcome::Winner { index: 0, .. })
        ));
    }

    #[test]
    fn test_hidden_and_empty() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut wheel = Wheel::new(WheelTuning::default());
        wheel.set_participants(vec![Participant::new("x").hidden()]);
        assert!(wheel.participants().is_empty());
        assert!(!wheel.spin(&mut rng));
        assert_eq!(wheel.outcome_at(1.0), None);
        assert_eq!(wheel.update(1.0), None);
    }

    #[test]
    fn test_spin_stops_and_removes_winner() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut wheel = wheel(&["a", "b", "c"]);
        assert!(wheel.spin(&mut rng));
        assert!(!wheel.spin(&mut rng));

        let mut outcome = None;
        for _ in 0..10_000 {
            outcome = wheel.update(1.0 / 60.0);
            if outcome.is_some() {
                break;
            }
        }
        assert!(!wheel.is_spinning());
        match outcome {
            Some(WheelOutcome::Winner { participant, .. }) => {
                assert_eq!(wheel.participants().len(), 2);
                assert!(!wheel.participants().contains(&participant));
            }
            Some(WheelOutcome::Tie { .. }) => assert_eq!(wheel.participants().len(), 3),
            None => panic!("wheel never stopped"),
        }
    }

    #[test]
    fn test_spin_is_frame_rate_independent() {
        let run = |dt: f32| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
            let mut wheel = wheel(&["a", "b", "c", "d", "e"]);
            wheel.spin(&mut rng);
            for _ in 0..(20.0 / dt) as usize {
                if wheel.update(dt).is_some() {
                    break;
                }
            }
            wheel.angle()
        };
        let coarse = run(1.0 / 30.0);
        let fine = run(1.0 / 120.0);
        assert!((coarse - fine).abs() < 1e-3);
    }
}
