//! Motion error types

use thiserror::Error;

/// Errors reported by the spring motion engine
#[derive(Error, Debug)]
pub enum MotionError {
    /// Angular frequency must be finite and positive
    #[error("angular frequency must be finite and > 0, got {0}")]
    InvalidAngularFrequency(f64),

    /// Damping ratio must lie in [0, 1]
    #[error("damping ratio must be within [0, 1], got {0}")]
    InvalidDampingRatio(f64),

    /// Timestep must be finite and positive
    #[error("timestep must be finite and > 0, got {0}")]
    InvalidTimestep(f64),

    /// Settle threshold must be finite and positive
    #[error("settle threshold must be finite and > 0, got {0}")]
    InvalidSettleThreshold(f64),

    /// Trajectory step limit must be at least one
    #[error("trajectory step limit must be at least 1")]
    InvalidStepLimit,

    /// The spring did not come to rest within the step limit
    #[error("trajectory did not settle within {steps} steps")]
    TrajectoryDidNotSettle { steps: usize },

    /// Failed to parse motion settings
    #[error("Failed to parse motion settings: {0}")]
    Config(#[from] toml::de::Error),

    /// Failed to serialize motion settings
    #[error("Failed to serialize motion settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
