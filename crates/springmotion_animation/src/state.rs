//! Spring state snapshots

use serde::{Deserialize, Serialize};
use springmotion_core::{Point, Vec2};

/// Position and velocity of the animated point at one time sample.
///
/// States are values: every step of the integrator produces a new one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringState {
    pub position: Point,
    pub velocity: Vec2,
}

impl SpringState {
    pub const fn new(position: Point, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// A state at `position` with zero velocity
    pub const fn at_rest(position: Point) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Both velocity components are within `threshold` (inclusive)
    pub fn is_settled(&self, threshold: f64) -> bool {
        self.velocity.max_abs() <= threshold
    }

    /// Both velocity components are strictly below `threshold`
    pub fn is_below(&self, threshold: f64) -> bool {
        self.velocity.max_abs() < threshold
    }
}
