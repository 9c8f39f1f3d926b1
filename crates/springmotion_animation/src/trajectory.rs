//! Precomputed trajectories
//!
//! A [`Trajectory`] is the full list of states from the start of a move to
//! rest, sampled at a fixed timestep. It is meant to be handed to a
//! keyframe player that replays the positions over [`Trajectory::duration`].

use crate::state::SpringState;
use serde::{Deserialize, Serialize};
use springmotion_core::Point;
use std::time::Duration;

/// A position at a normalized time within a trajectory
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionKeyframe {
    /// Time position (0.0 to 1.0)
    pub time: f64,
    pub position: Point,
}

/// Ordered spring states, one per timestep
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    timestep: f64,
    states: Vec<SpringState>,
}

impl Trajectory {
    pub(crate) fn new(timestep: f64, states: Vec<SpringState>) -> Self {
        Self { timestep, states }
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn states(&self) -> &[SpringState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&SpringState> {
        self.states.last()
    }

    /// Total playback time: one timestep per state.
    ///
    /// Saturates at [`Duration::MAX`].
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs()).unwrap_or(Duration::MAX)
    }

    pub fn duration_secs(&self) -> f64 {
        self.states.len() as f64 * self.timestep
    }

    /// The state being shown `elapsed` after playback started.
    ///
    /// `None` once playback is over.
    pub fn sample(&self, elapsed: Duration) -> Option<&SpringState> {
        let elapsed = elapsed.as_secs_f64();
        if elapsed >= self.duration_secs() {
            return None;
        }
        let index = (elapsed / self.timestep) as usize;
        self.states.get(index)
    }

    /// Evenly spaced keyframes, the first at 0.0 and the last at 1.0
    pub fn keyframes(&self) -> Vec<PositionKeyframe> {
        let last = self.states.len().saturating_sub(1).max(1) as f64;

        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| PositionKeyframe {
                time: i as f64 / last,
                position: state.position,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use springmotion_core::Vec2;

    fn linear(count: usize) -> Trajectory {
        let states = (0..count)
            .map(|i| SpringState::new(Point::new(i as f64, 0.0), Vec2::new(1.0, 0.0)))
            .collect();
        Trajectory::new(0.01, states)
    }

    #[test]
    fn test_duration() {
        let trajectory = linear(250);
        assert!((trajectory.duration_secs() - 2.5).abs() < 1e-12);
        assert_eq!(trajectory.duration().as_millis(), 2500);
        assert!(linear(0).duration().is_zero());

        let endless = Trajectory::new(1e20, linear(3).states().to_vec());
        assert_eq!(endless.duration(), Duration::MAX);
        assert!(endless.sample(Duration::from_secs(1)).is_some());
    }

    #[test]
    fn test_sample_by_elapsed_time() {
        let trajectory = linear(100);

        assert_eq!(trajectory.sample(Duration::ZERO).unwrap().position.x, 0.0);
        assert_eq!(
            trajectory.sample(Duration::from_millis(255)).unwrap().position.x,
            25.0
        );
        assert_eq!(
            trajectory.sample(Duration::from_millis(995)).unwrap().position.x,
            99.0
        );
        assert!(trajectory.sample(Duration::from_secs(1)).is_none());
        assert!(trajectory.sample(Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_keyframes_are_evenly_spaced() {
        let keyframes = linear(5).keyframes();
        let times: Vec<f64> = keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(keyframes[4].position, Point::new(4.0, 0.0));

        assert_eq!(linear(1).keyframes()[0].time, 0.0);
        assert!(linear(0).keyframes().is_empty());
    }
}
