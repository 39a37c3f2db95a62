//! Spotlight and ground halo handed to the overlay collaborator.

use crowdpick_agent::tuning::{finite, TuningError};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pulse shapes for the spotlight and the halo on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTuning {
    /// Spotlight height above the aim point
    pub spotlight_height: f32,
    /// Spotlight intensity at the middle of its pulse
    pub base_intensity: f32,
    /// Intensity added or removed at the pulse peaks
    pub intensity_swing: f32,
    /// Spotlight pulse angular frequency (rad/sec)
    pub pulse_rate: f32,
    /// Halo opacity at the pulse troughs
    pub halo_opacity: f32,
    /// Extra halo opacity at the pulse peaks
    pub halo_opacity_swing: f32,
    /// Ground halo radius before the scale pulse
    pub ground_radius: f32,
    /// Ground halo opacity at rest
    pub ground_opacity: f32,
    /// Ground halo opacity pulse (rad/sec)
    pub ground_fade_rate: f32,
    /// Ground halo scale pulse (rad/sec)
    pub ground_scale_rate: f32,
}

impl Default for OverlayTuning {
    fn default() -> Self {
        Self {
            spotlight_height: 7.0,
            base_intensity: 4.5,
            intensity_swing: 1.2,
            pulse_rate: 8.0,
            halo_opacity: 0.5,
            halo_opacity_swing: 0.4,
            ground_radius: 1.6,
            ground_opacity: 0.7,
            ground_fade_rate: 3.5,
            ground_scale_rate: 2.8,
        }
    }
}

/// Cone light aimed down at the tracking target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spotlight {
    /// Light origin, straight above the target
    pub position: Vec3,
    pub target: Vec3,
    pub intensity: f32,
    /// Opacity of the glow sprite around the light
    pub halo_opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundHalo {
    /// Center on the floor, under the chosen racer
    pub center: Vec3,
    /// Radius including the scale pulse
    pub scale: f32,
    pub opacity: f32,
}

/// Everything the overlay collaborator needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOverlay {
    pub chosen: Option<usize>,
    /// Current tracking target (scan point or locked racer)
    pub aim: Vec3,
    /// `true` once the aim has settled on the chosen racer
    pub locked: bool,
    pub visible: bool,
    pub spotlight: Spotlight,
    pub ground_halo: Option<GroundHalo>,
}

impl OverlayTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("overlay.spotlight_height", self.spotlight_height),
            ("overlay.base_intensity", self.base_intensity),
            ("overlay.intensity_swing", self.intensity_swing),
            ("overlay.pulse_rate", self.pulse_rate),
            ("overlay.halo_opacity", self.halo_opacity),
            ("overlay.halo_opacity_swing", self.halo_opacity_swing),
            ("overlay.ground_radius", self.ground_radius),
            ("overlay.ground_opacity", self.ground_opacity),
            ("overlay.ground_fade_rate", self.ground_fade_rate),
            ("overlay.ground_scale_rate", self.ground_scale_rate),
        ] {
            finite(field, value)?;
        }
        Ok(())
    }

    /// Spotlight state at pulse time `t`.
    pub fn spotlight(&self, aim: Vec3, t: f32) -> Spotlight {
        let wave = (t * self.pulse_rate).sin();
        Spotlight {
            position: aim + Vec3::Y * self.spotlight_height,
            target: aim,
            intensity: self.base_intensity + self.intensity_swing * wave,
            halo_opacity: self.halo_opacity + self.halo_opacity_swing * wave.abs(),
        }
    }

    /// Ground halo under `position` at pulse time `t`.
    pub fn ground_halo(&self, position: Vec3, t: f32) -> GroundHalo {
        GroundHalo {
            center: Vec3::new(position.x, 0.01, position.z),
            scale: self.ground_radius * (1.0 + 0.05 * (t * self.ground_scale_rate).sin()),
            opacity: self.ground_opacity - 0.03 * (1.0 + (t * self.ground_fade_rate).sin()),
        }
    }
}
