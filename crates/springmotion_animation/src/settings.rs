//! Motion settings
//!
//! Timesteps and settle thresholds for the two cadences, plus the default
//! spring, loadable from TOML:
//!
//! ```toml
//! [spring]
//! angular_frequency = 7.5
//! damping_ratio = 0.5
//!
//! [live]
//! timestep = 0.008
//! settle_threshold = 0.01
//!
//! [batch]
//! timestep = 0.001
//! settle_threshold = 0.001
//! max_steps = 200000
//! ```
//!
//! Every section and key is optional.

use crate::error::{MotionError, Result};
use crate::spring::SpringConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level motion settings
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MotionSettings {
    #[serde(default)]
    pub spring: SpringConfig,
    #[serde(default)]
    pub live: LiveCadence,
    #[serde(default)]
    pub batch: BatchCadence,
}

/// Continuous refresh cadence: one step per tick, settle checked live
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct LiveCadence {
    /// Simulated seconds per tick
    #[serde(default = "default_live_timestep")]
    pub timestep: f64,
    /// Motion stops once both velocity components fall below this
    #[serde(default = "default_live_threshold")]
    pub settle_threshold: f64,
}

fn default_live_timestep() -> f64 {
    0.008
}

fn default_live_threshold() -> f64 {
    0.01
}

impl Default for LiveCadence {
    fn default() -> Self {
        Self {
            timestep: default_live_timestep(),
            settle_threshold: default_live_threshold(),
        }
    }
}

impl LiveCadence {
    pub fn validate(&self) -> Result<()> {
        validate_timestep(self.timestep)?;
        validate_threshold(self.settle_threshold)
    }
}

/// Precomputed trajectory cadence: whole move generated up front
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct BatchCadence {
    /// Seconds between trajectory samples
    #[serde(default = "default_batch_timestep")]
    pub timestep: f64,
    /// The trajectory ends at the first state with both velocity
    /// components within this
    #[serde(default = "default_batch_threshold")]
    pub settle_threshold: f64,
    /// Longest trajectory generated before reporting a non-settling spring
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_batch_timestep() -> f64 {
    0.001
}

fn default_batch_threshold() -> f64 {
    0.001
}

fn default_max_steps() -> usize {
    200_000
}

impl Default for BatchCadence {
    fn default() -> Self {
        Self {
            timestep: default_batch_timestep(),
            settle_threshold: default_batch_threshold(),
            max_steps: default_max_steps(),
        }
    }
}

impl BatchCadence {
    pub fn validate(&self) -> Result<()> {
        validate_timestep(self.timestep)?;
        validate_threshold(self.settle_threshold)?;
        if self.max_steps == 0 {
            return Err(MotionError::InvalidStepLimit);
        }
        Ok(())
    }
}

fn validate_timestep(timestep: f64) -> Result<()> {
    // Timesteps become tick intervals and playback durations
    if timestep <= 0.0 || Duration::try_from_secs_f64(timestep).is_err() {
        return Err(MotionError::InvalidTimestep(timestep));
    }
    Ok(())
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(MotionError::InvalidSettleThreshold(threshold));
    }
    Ok(())
}

impl MotionSettings {
    /// Parse and validate settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: MotionSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.live.validate()?;
        self.batch.validate()
    }
}
