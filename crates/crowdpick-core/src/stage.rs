//! Frame driver: turns timestamps into clamped `dt`, runs the session and
//! produces the per-frame snapshot read by the render and overlay collaborators.

use crowdpick_agent::{AgentId, AgentTransform};
use serde::Serialize;

use crate::orchestrator::{Advance, Orchestrator, Phase};
use crate::overlay::SelectionOverlay;
use crate::roster::PhotoRef;

/// Converts monotonic timestamps (seconds) into a clamped frame delta.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Seconds since the previous tick, clamped to `0..=max_dt`. The first
    /// tick, and any tick where time runs backwards, yields 0.
    pub fn tick(&mut self, now_secs: f64) -> f32 {
        let dt = match self.last {
            Some(last) if now_secs.is_finite() => ((now_secs - last).max(0.0)) as f32,
            _ => 0.0,
        };
        if now_secs.is_finite() {
            self.last = Some(now_secs);
        }
        dt.min(self.max_dt)
    }

    /// Forget the previous timestamp, e.g. after the page was hidden.
    pub fn pause(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContestantFrame {
    pub id: AgentId,
    pub name: String,
    pub photo: Option<PhotoRef>,
    pub transform: AgentTransform,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: Phase,
    pub agents: Vec<ContestantFrame>,
    pub overlay: SelectionOverlay,
}

impl FrameSnapshot {
    pub fn capture(session: &Orchestrator) -> Self {
        Self {
            phase: session.phase(),
            agents: session
                .contestants()
                .iter()
                .map(|c| ContestantFrame {
                    id: c.agent.id,
                    name: c.participant.display_name().to_owned(),
                    photo: c.participant.photo.clone(),
                    transform: c.agent.transform(),
                })
                .collect(),
            overlay: session.overlay(),
        }
    }
}

/// A session plus its frame clock.
#[derive(Debug)]
pub struct Stage {
    pub session: Orchestrator,
    clock: FrameClock,
}

impl Stage {
    pub fn new(session: Orchestrator) -> Self {
        let max_dt = session.config().agent.motion.max_dt;
        Self {
            session,
            clock: FrameClock::new(max_dt),
        }
    }

    /// Advance to `now_secs` and capture the result.
    pub fn frame(&mut self, now_secs: f64) -> FrameSnapshot {
        let dt = self.clock.tick(now_secs);
        self.session.update(dt);
        FrameSnapshot::capture(&self.session)
    }

    pub fn advance(&mut self) -> Advance {
        self.session.advance()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::SessionConfig;
    use crate::roster::Participant;

    #[test]
    fn test_clock_first_tick_and_clamp() {
        let mut clock = FrameClock::new(0.05);
        assert_eq!(clock.tick(10.0), 0.0);
        assert!((clock.tick(10.016) - 0.016).abs() < 1e-6);
        assert_eq!(clock.tick(12.0), 0.05);
        assert_eq!(clock.tick(11.0), 0.0);
        clock.pause();
        assert_eq!(clock.tick(20.0), 0.0);
    }

    #[test]
    fn test_snapshot_lists_every_racer() {
        let session = Orchestrator::with_roster(
            SessionConfig::default(),
            3,
            vec![Participant::new(" "), Participant::new("Ada").with_photo("ada.png")],
        )
        .unwrap();
        let mut stage = Stage::new(session);
        let snap = stage.frame(0.0);
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.agents.len(), 2);
        assert_eq!(snap.agents[0].name, "Anonymous");
        assert_eq!(snap.agents[1].photo, Some(PhotoRef("ada.png".into())));
        assert!(!snap.overlay.visible);
    }
}
