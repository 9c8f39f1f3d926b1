//! Spring integrator
//!
//! Advances a [`SpringState`] one fixed timestep at a time using cached
//! [`SpringCoefficients`]. The two axes are independent 1D oscillators that
//! share one set of coefficients.

use crate::error::{MotionError, Result};
use crate::spring::{SpringCoefficients, SpringConfig};
use crate::state::SpringState;
use crate::trajectory::Trajectory;
use springmotion_core::Point;

/// Advance `state` by one timestep towards `destination`.
///
/// Pure and total. A state at rest on its destination is a fixed point.
pub fn next_state(
    state: &SpringState,
    destination: Point,
    coefficients: &SpringCoefficients,
) -> SpringState {
    let offset = state.position - destination;
    let velocity = state.velocity;

    SpringState {
        position: destination + (offset * coefficients.pos_pos + velocity * coefficients.pos_vel),
        velocity: offset * coefficients.vel_pos + velocity * coefficients.vel_vel,
    }
}

/// Spring parameters bound to a fixed timestep, with coefficients cached.
#[derive(Clone, Debug)]
pub struct SpringPhysics {
    config: SpringConfig,
    timestep: f64,
    coefficients: SpringCoefficients,
}

impl SpringPhysics {
    pub fn new(config: SpringConfig, timestep: f64) -> Result<Self> {
        let coefficients = SpringCoefficients::derive(&config, timestep)?;
        Ok(Self {
            config,
            timestep,
            coefficients,
        })
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn coefficients(&self) -> &SpringCoefficients {
        &self.coefficients
    }

    /// Swap the spring and recompute the coefficients
    pub fn set_config(&mut self, config: SpringConfig) -> Result<()> {
        self.coefficients = SpringCoefficients::derive(&config, self.timestep)?;
        self.config = config;
        Ok(())
    }

    /// Change the timestep and recompute the coefficients
    pub fn set_timestep(&mut self, timestep: f64) -> Result<()> {
        self.coefficients = SpringCoefficients::derive(&self.config, timestep)?;
        self.timestep = timestep;
        Ok(())
    }

    pub fn next_state(&self, state: &SpringState, destination: Point) -> SpringState {
        next_state(state, destination, &self.coefficients)
    }

    /// Unroll the motion from `initial` to rest.
    ///
    /// Stops at, and includes, the first state whose velocity components
    /// are both within `settle_threshold`. Gives up with
    /// [`MotionError::TrajectoryDidNotSettle`] after `max_steps` states.
    pub fn trajectory(
        &self,
        initial: SpringState,
        destination: Point,
        settle_threshold: f64,
        max_steps: usize,
    ) -> Result<Trajectory> {
        if !settle_threshold.is_finite() || settle_threshold <= 0.0 {
            return Err(MotionError::InvalidSettleThreshold(settle_threshold));
        }
        if max_steps == 0 {
            return Err(MotionError::InvalidStepLimit);
        }

        let mut states = Vec::new();
        let mut current = initial;

        while states.len() < max_steps {
            let next = self.next_state(&current, destination);
            states.push(next);

            if next.is_settled(settle_threshold) {
                tracing::debug!(
                    steps = states.len(),
                    timestep = self.timestep,
                    "trajectory settled"
                );
                return Ok(Trajectory::new(self.timestep, states));
            }

            current = next;
        }

        tracing::warn!(
            max_steps,
            angular_frequency = self.config.angular_frequency(),
            damping_ratio = self.config.damping_ratio(),
            "trajectory did not settle"
        );
        Err(MotionError::TrajectoryDidNotSettle { steps: max_steps })
    }
}
