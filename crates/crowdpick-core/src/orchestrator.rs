//! Selection session: Idle → Running → Locking → Lifting → Floating.
//!
//! The orchestrator owns the live crowd, the session RNG and the spotlight
//! tracker. Each frame it steps every agent first and only then advances its
//! own phase, so phase decisions always see this frame's positions.

use std::fmt;

use crowdpick_agent::tuning::{non_negative, TuningError};
use crowdpick_agent::{Agent, AgentTuning, Arena, StepContext};
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::animation::{scan_point, ScanTuning, SpotTracker, TIMER_EPSILON};
use crate::error::{ConfigError, RosterError};
use crate::lift::LiftTuning;
use crate::overlay::{OverlayTuning, SelectionOverlay};
use crate::roster::{Participant, PhotoRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Locking,
    Lifting,
    Floating,
}

impl Phase {
    /// Phases in which a racer is chosen and the overlay is shown.
    pub fn has_selection(self) -> bool {
        matches!(self, Phase::Locking | Phase::Lifting | Phase::Floating)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Locking => "locking",
            Phase::Lifting => "lifting",
            Phase::Floating => "floating",
        };
        f.write_str(name)
    }
}

/// Result of the single "advance" trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Started { contestants: usize },
    Dismissed { participant: Participant },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTimings {
    /// How long everyone runs before a racer is chosen
    pub race_secs: f32,
    /// Duration of the eased glide from scan point to the chosen racer
    pub lock_secs: f32,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            race_secs: 2.0,
            lock_secs: 0.8,
        }
    }
}

impl SessionTimings {
    pub fn validate(&self) -> Result<(), TuningError> {
        non_negative("timings.race_secs", self.race_secs)?;
        non_negative("timings.lock_secs", self.lock_secs)?;
        Ok(())
    }
}

/// The one configuration table for a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub arena: Arena,
    pub agent: AgentTuning,
    pub timings: SessionTimings,
    pub lift: LiftTuning,
    pub scan: ScanTuning,
    pub overlay: OverlayTuning,
}

impl SessionConfig {
    /// Check every table. Runs on each `Orchestrator::new`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        self.agent.validate()?;
        self.timings.validate()?;
        self.lift.validate()?;
        self.scan.validate()?;
        self.overlay.validate()?;
        Ok(())
    }
}

/// A participant together with the racer that represents them.
#[derive(Debug, Clone, PartialEq)]
pub struct Contestant {
    pub participant: Participant,
    pub agent: Agent,
}

#[derive(Debug)]
pub struct Orchestrator {
    config: SessionConfig,
    contestants: Vec<Contestant>,
    phase: Phase,
    /// Seconds spent in the current phase
    phase_elapsed: f32,
    chosen: Option<usize>,
    tracker: SpotTracker,
    /// Free-running clock for the scan sweep and overlay pulses
    clock: f32,
    rng: Xoshiro256PlusPlus,
    races: u64,
}

impl Orchestrator {
    pub fn new(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut tracker = SpotTracker::new(Vec3::new(0.0, config.arena.ground_height(), 0.0));
        tracker.set_follow_smoothness(config.scan.follow_smoothness);
        Ok(Self {
            config,
            contestants: Vec::new(),
            phase: Phase::Idle,
            phase_elapsed: 0.0,
            chosen: None,
            tracker,
            clock: 0.0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            races: 0,
        })
    }

    pub fn with_roster(
        config: SessionConfig,
        seed: u64,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Result<Self, ConfigError> {
        let mut session = Self::new(config, seed)?;
        session.rebuild_roster(participants);
        Ok(session)
    }

    // --- roster ---

    /// Replace the crowd. Hidden participants get no racer. Any running
    /// session is abandoned.
    pub fn rebuild_roster(&mut self, participants: impl IntoIterator<Item = Participant>) {
        if self.phase != Phase::Idle {
            log::debug!("Roster rebuilt during {}, resetting session", self.phase);
        }
        self.reset();
        let arena = &self.config.arena;
        let motion = &self.config.agent.motion;
        let rng = &mut self.rng;
        self.contestants = participants
            .into_iter()
            .filter(|p| p.visible)
            .map(|participant| Contestant {
                agent: Agent::spawn(arena, motion, &mut *rng),
                participant,
            })
            .collect();
        log::info!("Roster rebuilt with {} racers", self.contestants.len());
    }

    /// Add a racer. Only allowed while idle; hidden participants are skipped.
    pub fn push_participant(&mut self, participant: Participant) -> Result<(), RosterError> {
        self.ensure_idle()?;
        if !participant.visible {
            log::debug!("Skipping hidden participant {}", participant.display_name());
            return Ok(());
        }
        let agent = Agent::spawn(&self.config.arena, &self.config.agent.motion, &mut self.rng);
        self.contestants.push(Contestant { participant, agent });
        Ok(())
    }

    pub fn remove_participant(&mut self, index: usize) -> Result<Participant, RosterError> {
        self.ensure_idle()?;
        self.check_index(index)?;
        Ok(self.contestants.remove(index).participant)
    }

    /// Change a name in place; the racer keeps moving undisturbed.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), RosterError> {
        self.check_index(index)?;
        self.contestants[index].participant.name = name.into();
        Ok(())
    }

    pub fn set_photo(&mut self, index: usize, photo: Option<PhotoRef>) -> Result<(), RosterError> {
        self.check_index(index)?;
        self.contestants[index].participant.photo = photo;
        Ok(())
    }

    /// Put a racer at a given spot on the floor (clamped into the arena).
    pub fn place_agent(&mut self, index: usize, x: f32, z: f32) -> Result<(), RosterError> {
        self.check_index(index)?;
        self.contestants[index].agent.place(&self.config.arena, x, z);
        Ok(())
    }

    /// Direct access to the crowd. Structural edits made here are reconciled
    /// on the next update: a chosen index that no longer exists resets the
    /// session to idle.
    pub fn contestants_mut(&mut self) -> &mut Vec<Contestant> {
        &mut self.contestants
    }

    fn ensure_idle(&self) -> Result<(), RosterError> {
        if self.phase == Phase::Idle {
            Ok(())
        } else {
            log::warn!("Rejected roster edit while {}", self.phase);
            Err(RosterError::SessionActive(self.phase))
        }
    }

    fn check_index(&self, index: usize) -> Result<(), RosterError> {
        if index < self.contestants.len() {
            Ok(())
        } else {
            Err(RosterError::UnknownIndex {
                index,
                len: self.contestants.len(),
            })
        }
    }

    // --- session ---

    /// The single user trigger: start a race when idle, dismiss when floating.
    pub fn advance(&mut self) -> Advance {
        self.reconcile();
        match self.phase {
            Phase::Idle => {
                if self.start_race() {
                    Advance::Started {
                        contestants: self.contestants.len(),
                    }
                } else {
                    Advance::Ignored
                }
            }
            Phase::Floating => match self.dismiss() {
                Some(participant) => Advance::Dismissed { participant },
                None => Advance::Ignored,
            },
            _ => Advance::Ignored,
        }
    }

    /// Set every racer running. No-op unless idle with at least one racer.
    pub fn start_race(&mut self) -> bool {
        if self.phase != Phase::Idle || self.contestants.is_empty() {
            return false;
        }
        let arena = &self.config.arena;
        let motion = &self.config.agent.motion;
        for contestant in &mut self.contestants {
            contestant.agent.clear_lift(arena);
            contestant.agent.start_running(motion, &mut self.rng);
        }
        self.chosen = None;
        self.races += 1;
        let start = self.current_scan_point();
        self.tracker.snap(start);
        self.enter(Phase::Running);
        log::info!(
            "Race {} started with {} racers",
            self.races,
            self.contestants.len()
        );
        true
    }

    /// Remove the floating racer for good. No-op when nothing is chosen.
    pub fn dismiss(&mut self) -> Option<Participant> {
        if self.phase != Phase::Floating {
            return None;
        }
        let index = self.chosen.filter(|&i| i < self.contestants.len())?;
        let removed = self.contestants.remove(index).participant;
        self.chosen = None;
        self.enter(Phase::Idle);
        log::info!("Dismissed {}", removed.display_name());
        Some(removed)
    }

    /// Abandon the session: everyone stops and lands, nothing is chosen.
    pub fn reset(&mut self) {
        let arena = &self.config.arena;
        for contestant in &mut self.contestants {
            contestant.agent.stop_running();
            contestant.agent.clear_lift(arena);
        }
        self.chosen = None;
        self.enter(Phase::Idle);
    }

    /// Run a race to the moment of choice with a fixed step, skipping the
    /// spotlight choreography. Returns the chosen index.
    pub fn race_to_choice(&mut self, dt: f32) -> Option<usize> {
        let step = dt.clamp(0.0, self.config.agent.motion.max_dt);
        if step.is_nan() || step <= 0.0 || !self.start_race() {
            return None;
        }
        while self.phase == Phase::Running {
            self.update(step);
        }
        self.chosen()
    }

    /// One frame: agents first, then the phase machine.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.agent.motion.max_dt)
        } else {
            0.0
        };
        self.reconcile();

        let ctx = StepContext {
            arena: &self.config.arena,
            tuning: &self.config.agent,
            dt,
        };
        for contestant in &mut self.contestants {
            contestant.agent = contestant.agent.step(&ctx, &mut self.rng);
        }

        self.clock += dt;
        self.phase_elapsed += dt;
        match self.phase {
            Phase::Idle => {}
            Phase::Running => {
                let target = self.current_scan_point();
                self.tracker.follow(target, dt);
                if self.phase_elapsed + TIMER_EPSILON >= self.config.timings.race_secs {
                    self.finish_race();
                }
            }
            Phase::Locking => {
                if let Some(position) = self.chosen_position() {
                    self.tracker.track(position);
                }
                if !self.tracker.update(dt) {
                    self.enter(Phase::Lifting);
                }
            }
            Phase::Lifting => {
                let lift = &self.config.lift;
                let done = self.phase_elapsed + TIMER_EPSILON >= lift.total_secs();
                let elevation = if done {
                    lift.lift_height
                } else {
                    lift.lifting_elevation(self.phase_elapsed)
                };
                self.lift_chosen(elevation, Vec2::ZERO);
                if done {
                    self.enter(Phase::Floating);
                }
            }
            Phase::Floating => {
                let (elevation, tilt) = self.config.lift.floating_pose(self.phase_elapsed);
                self.lift_chosen(elevation, tilt);
            }
        }
    }

    fn finish_race(&mut self) {
        for contestant in &mut self.contestants {
            contestant.agent.stop_running();
        }
        if self.contestants.is_empty() {
            self.enter(Phase::Idle);
            return;
        }
        let index = self.rng.gen_range(0..self.contestants.len());
        self.chosen = Some(index);
        let position = self.contestants[index].agent.position;
        self.tracker.lock_on(position, self.config.timings.lock_secs);
        log::info!(
            "Chose #{} {}",
            index,
            self.contestants[index].participant.display_name()
        );
        self.enter(Phase::Locking);
    }

    fn lift_chosen(&mut self, elevation: f32, tilt: Vec2) {
        let Some(index) = self.chosen else { return };
        let arena = &self.config.arena;
        if let Some(contestant) = self.contestants.get_mut(index) {
            contestant.agent.set_lift(arena, elevation, tilt);
            self.tracker.snap(contestant.agent.position);
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("Session {} -> {}", self.phase, phase);
        }
        self.phase = phase;
        self.phase_elapsed = 0.0;
    }

    /// Fail safe to idle when the chosen racer vanished from under us.
    fn reconcile(&mut self) {
        let valid = match self.chosen {
            Some(index) => index < self.contestants.len(),
            None => !self.phase.has_selection(),
        };
        let stranded = self.phase == Phase::Running && self.contestants.is_empty();
        if !valid || stranded {
            log::warn!(
                "Chosen racer {:?} no longer in a crowd of {}, resetting",
                self.chosen,
                self.contestants.len()
            );
            self.reset();
        }
    }

    fn current_scan_point(&self) -> Vec3 {
        scan_point(
            self.contestants.iter().map(|c| c.agent.position),
            self.clock,
            self.config.arena.half_extent(),
            &self.config.scan,
        )
    }

    fn chosen_position(&self) -> Option<Vec3> {
        self.chosen_contestant().map(|c| c.agent.position)
    }

    // --- queries ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the chosen racer, if it still exists.
    pub fn chosen(&self) -> Option<usize> {
        self.chosen.filter(|&i| i < self.contestants.len())
    }

    pub fn chosen_contestant(&self) -> Option<&Contestant> {
        self.chosen().and_then(|i| self.contestants.get(i))
    }

    pub fn contestants(&self) -> &[Contestant] {
        &self.contestants
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn races(&self) -> u64 {
        self.races
    }

    pub fn aim(&self) -> Vec3 {
        self.tracker.aim()
    }

    /// Overlay state for this frame. Shown from locking until dismissal.
    pub fn overlay(&self) -> SelectionOverlay {
        let chosen = self.chosen();
        let visible = self.phase.has_selection() && chosen.is_some();
        let aim = self.tracker.aim();
        let tuning = &self.config.overlay;
        SelectionOverlay {
            chosen,
            aim,
            locked: matches!(self.phase, Phase::Lifting | Phase::Floating),
            visible,
            spotlight: tuning.spotlight(aim, self.clock),
            ground_halo: self
                .chosen_position()
                .filter(|_| visible)
                .map(|p| tuning.ground_halo(p, self.clock)),
        }
    }
}
