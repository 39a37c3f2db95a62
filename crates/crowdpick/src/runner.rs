//! Headless races, wheel spins and selection tallies.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crowdpick_core::{Advance, Orchestrator, Participant, Phase, Stage, Wheel, WheelOutcome};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use web_time::Instant;

use crate::config::PickerConfig;

/// Simulated seconds a single race may take before the runner gives up.
const MAX_RACE_SECS: f64 = 120.0;

/// How frames are timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Fixed `1/fps` steps, as fast as possible
    Fixed,
    /// Sleep between frames and feed wall-clock timestamps
    Realtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    pub race: u64,
    pub chosen: Participant,
    /// Frames from the start of the race to dismissal
    pub frames: u32,
    pub remaining: usize,
}

/// Read a RON list of participants.
pub fn load_roster(path: &Path) -> Result<Vec<Participant>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("Failed to parse roster {}", path.display()))
}

/// Run up to `runner.races` full race cycles, dismissing each chosen racer.
pub fn run_races(
    config: &PickerConfig,
    participants: Vec<Participant>,
    pacing: Pacing,
) -> Result<Vec<RaceReport>> {
    let session =
        Orchestrator::with_roster(config.session.clone(), config.runner.seed, participants)
            .context("Failed to create session")?;
    let mut stage = Stage::new(session);
    let frame_secs = f64::from(config.frame_secs());
    let float_secs = f64::from(config.runner.float_secs.max(0.0));
    let mut clock = FrameTimer::new(pacing, frame_secs);
    let mut reports = Vec::new();

    for _ in 0..config.runner.races {
        if !matches!(stage.advance(), Advance::Started { .. }) {
            log::info!("Nobody left to race");
            break;
        }
        let start = clock.now();
        let mut frames = 0u32;
        let mut floating_since = None;

        let chosen = loop {
            let now = clock.next();
            stage.frame(now);
            frames += 1;

            if stage.session.phase() == Phase::Floating {
                let since = *floating_since.get_or_insert(now);
                if now - since >= float_secs {
                    match stage.advance() {
                        Advance::Dismissed { participant } => break participant,
                        other => bail!("Expected a dismissal, got {:?}", other),
                    }
                }
            }
            if now - start > MAX_RACE_SECS {
                bail!("Race did not finish within {}s", MAX_RACE_SECS);
            }
        };

        let report = RaceReport {
            race: stage.session.races(),
            chosen,
            frames,
            remaining: stage.session.contestants().len(),
        };
        log::debug!("{:?}", report);
        reports.push(report);
    }
    Ok(reports)
}

/// Resolve `races` choices on a fixed roster and count how often each
/// participant was picked.
pub fn tally(
    config: &PickerConfig,
    participants: Vec<Participant>,
    races: usize,
) -> Result<Vec<(String, u32)>> {
    let mut session =
        Orchestrator::with_roster(config.session.clone(), config.runner.seed, participants)
            .context("Failed to create session")?;
    if session.contestants().is_empty() {
        bail!("Cannot tally an empty roster");
    }

    let mut counts = vec![0u32; session.contestants().len()];
    let step = config.frame_secs();
    for _ in 0..races {
        let index = session
            .race_to_choice(step)
            .context("Race ended without a choice")?;
        counts[index] += 1;
        session.reset();
    }

    Ok(session
        .contestants()
        .iter()
        .zip(counts)
        .map(|(c, n)| (c.participant.display_name().to_owned(), n))
        .collect())
}

/// Spin the wheel up to `runner.races` times.
pub fn run_wheel(
    config: &PickerConfig,
    participants: Vec<Participant>,
) -> Result<Vec<WheelOutcome>> {
    config.wheel.validate().context("Invalid wheel tuning")?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.runner.seed);
    let mut wheel = Wheel::new(config.wheel.clone());
    wheel.set_participants(participants);
    let step = config.frame_secs();
    let max_frames = (MAX_RACE_SECS as f32 / step) as usize;
    let mut outcomes = Vec::new();

    for _ in 0..config.runner.races {
        if !wheel.spin(&mut rng) {
            log::info!("Wheel is empty");
            break;
        }
        let outcome = (0..max_frames)
            .find_map(|_| wheel.update(step))
            .context("Wheel never stopped")?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Timestamps for the frame loop.
struct FrameTimer {
    pacing: Pacing,
    frame_secs: f64,
    simulated: f64,
    origin: Instant,
}

impl FrameTimer {
    fn new(pacing: Pacing, frame_secs: f64) -> Self {
        Self {
            pacing,
            frame_secs,
            simulated: 0.0,
            origin: Instant::now(),
        }
    }

    fn now(&self) -> f64 {
        match self.pacing {
            Pacing::Fixed => self.simulated,
            Pacing::Realtime => self.origin.elapsed().as_secs_f64(),
        }
    }

    /// Wait for (or simulate) the next frame and return its timestamp.
    fn next(&mut self) -> f64 {
        self.simulated += self.frame_secs;
        if self.pacing == Pacing::Realtime {
            let elapsed = self.origin.elapsed().as_secs_f64();
            if self.simulated > elapsed {
                std::thread::sleep(Duration::from_secs_f64(self.simulated - elapsed));
            }
        }
        self.now()
    }
}
