//! Square play area shared by soft steering and the hard boundary clamp.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building an arena from untrusted configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ArenaError {
    #[error("arena size must be positive and finite, got {0}")]
    InvalidSize(f32),
    #[error("agent radius {radius} does not fit inside an arena of size {size}")]
    RadiusTooLarge { size: f32, radius: f32 },
}

/// One of the four axis-aligned arena walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::PosX, Wall::NegX, Wall::PosZ, Wall::NegZ];

    /// Unit normal pointing from the wall back into the arena.
    pub fn inward_normal(self) -> Vec3 {
        match self {
            Wall::PosX => Vec3::NEG_X,
            Wall::NegX => Vec3::X,
            Wall::PosZ => Vec3::NEG_Z,
            Wall::NegZ => Vec3::Z,
        }
    }
}

/// Static arena description: a square of side `size` centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    /// Side length of the square play area
    pub size: f32,
    /// Nominal half-width of an agent, used for wall clamping
    pub agent_radius: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            size: 20.0,
            agent_radius: 0.5,
        }
    }
}

impl Arena {
    /// Create a validated arena.
    pub fn new(size: f32, agent_radius: f32) -> Result<Self, ArenaError> {
        let arena = Self { size, agent_radius };
        arena.validate()?;
        Ok(arena)
    }

    /// Check the invariants a deserialized arena may have broken.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ArenaError::InvalidSize(self.size));
        }
        if !self.agent_radius.is_finite()
            || self.agent_radius < 0.0
            || self.agent_radius * 2.0 >= self.size
        {
            return Err(ArenaError::RadiusTooLarge {
                size: self.size,
                radius: self.agent_radius,
            });
        }
        Ok(())
    }

    /// Largest |x| or |z| an agent centre may reach.
    pub fn half_extent(&self) -> f32 {
        self.size * 0.5 - self.agent_radius
    }

    /// Resting height of an agent centre above the floor.
    pub fn ground_height(&self) -> f32 {
        self.agent_radius
    }

    /// Distance from `position` to the given wall, measured on the clamp boundary.
    /// Negative when the point is already outside.
    pub fn distance_to(&self, wall: Wall, position: Vec3) -> f32 {
        let half = self.half_extent();
        match wall {
            Wall::PosX => half - position.x,
            Wall::NegX => position.x + half,
            Wall::PosZ => half - position.z,
            Wall::NegZ => position.z + half,
        }
    }

    /// Smallest distance to any wall.
    pub fn nearest_wall_distance(&self, position: Vec3) -> f32 {
        Wall::ALL
            .iter()
            .map(|&wall| self.distance_to(wall, position))
            .fold(f32::INFINITY, f32::min)
    }

    pub fn contains(&self, position: Vec3) -> bool {
        let half = self.half_extent();
        position.x.abs() <= half && position.z.abs() <= half
    }
}
