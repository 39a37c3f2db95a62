//! Picker configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `crowdpick.ron` in the working directory, or an explicit file
//! 3. Environment variables prefixed with `CROWDPICK_`
//!
//! Example environment variable: `CROWDPICK_SESSION__TIMINGS__RACE_SECS=3.5`

use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use crowdpick_core::{SessionConfig, WheelTuning};
use serde::{Deserialize, Serialize};

/// `CROWDPICK_` prefix, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix("CROWDPICK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Main picker configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PickerConfig {
    /// Arena, racer tuning and selection choreography
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub wheel: WheelTuning,

    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Headless runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Session RNG seed
    pub seed: u64,
    /// Simulated frames per second
    pub fps: f32,
    /// Races (or wheel spins) to run
    pub races: u32,
    /// How long the chosen racer floats before being dismissed
    pub float_secs: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            fps: 60.0,
            races: 1,
            float_secs: 1.0,
        }
    }
}

impl PickerConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `crowdpick.ron` (if exists) or `file` (must exist)
    /// 3. Environment variables prefixed with `CROWDPICK_` (highest priority)
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_layered(file, environment())
    }

    fn load_layered(file: Option<&Path>, env: Environment) -> Result<Self> {
        let source = match file {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("crowdpick")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults (tuning tables fall back to their serde defaults)
            .set_default("runner.seed", 0_i64)?
            .set_default("runner.fps", 60.0)?
            .set_default("runner.races", 1_i64)?
            .set_default("runner.float_secs", 1.0)?
            // Layer 2: Config file
            .add_source(source)
            // Layer 3: Environment variables (CROWDPICK_RUNNER__SEED, etc.)
            .add_source(env);

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session or wheel cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.session
            .validate()
            .context("Invalid session in configuration")?;
        self.wheel
            .validate()
            .context("Invalid wheel in configuration")?;
        if !self.runner.fps.is_finite() || self.runner.fps <= 0.0 {
            bail!("runner.fps must be positive, got {}", self.runner.fps);
        }
        if !self.runner.float_secs.is_finite() {
            bail!("runner.float_secs must be finite, got {}", self.runner.float_secs);
        }
        Ok(())
    }

    /// Frame step implied by `runner.fps`.
    pub fn frame_secs(&self) -> f32 {
        1.0 / self.runner.fps.max(1.0)
    }
}
