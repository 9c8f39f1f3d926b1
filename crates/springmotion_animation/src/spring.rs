//! Spring configuration and closed-form transition coefficients
//!
//! Instead of integrating forces frame by frame, each timestep applies the
//! exact solution of the damped harmonic oscillator. For a fixed spring and
//! timestep that solution is a 2x2 linear map from (offset, velocity) to
//! the next (offset, velocity); [`SpringCoefficients`] holds its four
//! entries.

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};

/// Below `omega * CRITICAL_EPSILON` the damped frequency is treated as zero
/// and the critically damped solution is used.
const CRITICAL_EPSILON: f64 = 1e-9;

/// Spring parameters.
///
/// Validated on construction and immutable afterwards; build a new value
/// to change either parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpringConfig", into = "RawSpringConfig")]
pub struct SpringConfig {
    angular_frequency: f64,
    damping_ratio: f64,
}

impl SpringConfig {
    /// Create a spring.
    ///
    /// `angular_frequency` controls how fast the spring moves towards its
    /// destination and must be positive. `damping_ratio` controls how fast
    /// oscillation decays: 0 never settles, 1 is critically damped (no
    /// overshoot). Overdamped springs are not supported.
    pub fn new(angular_frequency: f64, damping_ratio: f64) -> Result<Self> {
        if !angular_frequency.is_finite() || angular_frequency <= 0.0 {
            return Err(MotionError::InvalidAngularFrequency(angular_frequency));
        }
        if !(0.0..=1.0).contains(&damping_ratio) {
            // Also rejects NaN
            return Err(MotionError::InvalidDampingRatio(damping_ratio));
        }
        Ok(Self {
            angular_frequency,
            damping_ratio,
        })
    }

    pub fn angular_frequency(&self) -> f64 {
        self.angular_frequency
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn is_critically_damped(&self) -> bool {
        self.damping_ratio == 1.0
    }

    /// Slow, soft approach with a hint of overshoot
    pub const fn gentle() -> Self {
        Self {
            angular_frequency: 5.0,
            damping_ratio: 0.7,
        }
    }

    /// Quick approach, barely overshoots
    pub const fn snappy() -> Self {
        Self {
            angular_frequency: 12.0,
            damping_ratio: 0.8,
        }
    }

    /// Visible oscillation around the destination
    pub const fn bouncy() -> Self {
        Self {
            angular_frequency: 9.0,
            damping_ratio: 0.3,
        }
    }

    /// Fastest approach without overshoot
    pub const fn critical() -> Self {
        Self {
            angular_frequency: 7.5,
            damping_ratio: 1.0,
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            angular_frequency: default_angular_frequency(),
            damping_ratio: default_damping_ratio(),
        }
    }
}

/// Unvalidated wire form of [`SpringConfig`]
#[derive(Serialize, Deserialize)]
struct RawSpringConfig {
    #[serde(default = "default_angular_frequency")]
    angular_frequency: f64,
    #[serde(default = "default_damping_ratio")]
    damping_ratio: f64,
}

fn default_angular_frequency() -> f64 {
    7.5
}

fn default_damping_ratio() -> f64 {
    0.5
}

impl TryFrom<RawSpringConfig> for SpringConfig {
    type Error = MotionError;

    fn try_from(raw: RawSpringConfig) -> Result<Self> {
        SpringConfig::new(raw.angular_frequency, raw.damping_ratio)
    }
}

impl From<SpringConfig> for RawSpringConfig {
    fn from(config: SpringConfig) -> Self {
        Self {
            angular_frequency: config.angular_frequency,
            damping_ratio: config.damping_ratio,
        }
    }
}

/// Transition matrix of the spring for one timestep.
///
/// ```text
/// offset'   = pos_pos * offset + pos_vel * velocity
/// velocity' = vel_pos * offset + vel_vel * velocity
/// ```
///
/// where `offset` is the position relative to the destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringCoefficients {
    pub pos_pos: f64,
    pub pos_vel: f64,
    pub vel_pos: f64,
    pub vel_vel: f64,
}

impl SpringCoefficients {
    /// Derive the coefficients for `config` advanced by `timestep` seconds.
    pub fn derive(config: &SpringConfig, timestep: f64) -> Result<Self> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(MotionError::InvalidTimestep(timestep));
        }

        let omega = config.angular_frequency;
        let zeta = config.damping_ratio;
        let omega_zeta = omega * zeta;
        let alpha = omega * (1.0 - zeta * zeta).sqrt();

        if alpha <= omega * CRITICAL_EPSILON {
            return Ok(Self::critically_damped(omega, timestep));
        }

        let exp_term = (-omega_zeta * timestep).exp();
        let cos_term = (alpha * timestep).cos();
        let sin_term = (alpha * timestep).sin();
        let inv_alpha = 1.0 / alpha;

        let exp_sin = exp_term * sin_term;
        let exp_cos = exp_term * cos_term;
        let exp_omega_zeta_sin_over_alpha = exp_term * omega_zeta * sin_term * inv_alpha;

        Ok(Self {
            pos_pos: exp_cos + exp_omega_zeta_sin_over_alpha,
            pos_vel: exp_sin * inv_alpha,
            vel_pos: -exp_sin * alpha - omega_zeta * exp_omega_zeta_sin_over_alpha,
            vel_vel: exp_cos - exp_omega_zeta_sin_over_alpha,
        })
    }

    /// The alpha -> 0 limit of the underdamped matrix (zeta = 1)
    fn critically_damped(omega: f64, timestep: f64) -> Self {
        let exp_term = (-omega * timestep).exp();
        let omega_h = omega * timestep;

        Self {
            pos_pos: exp_term * (1.0 + omega_h),
            pos_vel: exp_term * timestep,
            vel_pos: -exp_term * omega * omega_h,
            vel_vel: exp_term * (1.0 - omega_h),
        }
    }
}
