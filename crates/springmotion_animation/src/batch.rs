//! Precomputed trajectory animation
//!
//! For hosts that animate with a keyframe player instead of per-frame
//! callbacks. Every [`TrajectoryAnimator::move_to`] generates the whole
//! motion up front at a fine timestep and hands it to the player.
//!
//! Retargeting mid-flight samples the running trajectory at the current
//! time, so the new motion starts from the in-flight position *and*
//! velocity.

use crate::error::Result;
use crate::physics::SpringPhysics;
use crate::scheduler::{Clock, SystemClock};
use crate::settings::{BatchCadence, MotionSettings};
use crate::spring::SpringConfig;
use crate::state::SpringState;
use crate::trajectory::Trajectory;
use springmotion_core::Point;
use std::time::Duration;

/// Keyframe playback on the host side (e.g. a layer animation)
pub trait TrajectoryPlayer {
    /// Where the element is currently shown
    fn presentation_position(&self) -> Point;

    /// Replace any running animation with `trajectory`.
    ///
    /// Positions are shown one per [`Trajectory::timestep`]; the element
    /// should stay at the final position afterwards.
    fn play(&mut self, trajectory: &Trajectory);

    /// Remove the running animation, leaving the element where it is
    fn cancel(&mut self);
}

struct Playback {
    trajectory: Trajectory,
    started_at: Duration,
}

/// Drives a [`TrajectoryPlayer`] with precomputed spring trajectories
pub struct TrajectoryAnimator<P, C = SystemClock> {
    physics: SpringPhysics,
    settle_threshold: f64,
    max_steps: usize,
    player: P,
    clock: C,
    playback: Option<Playback>,
}

impl<P: TrajectoryPlayer, C: Clock> TrajectoryAnimator<P, C> {
    pub fn new(config: SpringConfig, cadence: &BatchCadence, player: P, clock: C) -> Result<Self> {
        cadence.validate()?;
        Ok(Self {
            physics: SpringPhysics::new(config, cadence.timestep)?,
            settle_threshold: cadence.settle_threshold,
            max_steps: cadence.max_steps,
            player,
            clock,
            playback: None,
        })
    }

    pub fn from_settings(settings: &MotionSettings, player: P, clock: C) -> Result<Self> {
        Self::new(settings.spring, &settings.batch, player, clock)
    }

    /// Animate to `destination`. Returns the duration of the new animation.
    ///
    /// On error the running animation, if any, is left untouched.
    pub fn move_to(&mut self, destination: Point) -> Result<Duration> {
        let initial = self.current_state();
        let trajectory = self.plan(initial, destination)?;
        let duration = trajectory.duration();

        tracing::debug!(
            steps = trajectory.len(),
            duration_secs = duration.as_secs_f64(),
            x = destination.x,
            y = destination.y,
            "trajectory animation started"
        );

        self.player.play(&trajectory);
        self.playback = Some(Playback {
            trajectory,
            started_at: self.clock.now(),
        });

        Ok(duration)
    }

    /// Generate the trajectory from `from` to `to` without playing it
    pub fn plan(&self, from: SpringState, to: Point) -> Result<Trajectory> {
        self.physics
            .trajectory(from, to, self.settle_threshold, self.max_steps)
    }

    /// The state being shown right now.
    ///
    /// Falls back to the player's position at rest when nothing is playing.
    pub fn current_state(&self) -> SpringState {
        self.playing()
            .copied()
            .unwrap_or_else(|| SpringState::at_rest(self.player.presentation_position()))
    }

    pub fn is_animating(&self) -> bool {
        self.playing().is_some()
    }

    /// The most recently started trajectory, finished or not
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.playback.as_ref().map(|playback| &playback.trajectory)
    }

    /// Cancel the running animation. Does nothing when idle or finished.
    pub fn stop(&mut self) {
        let animating = self.is_animating();
        self.playback = None;
        if animating {
            self.player.cancel();
            tracing::debug!("trajectory animation cancelled");
        }
    }

    /// Swap the spring for subsequent moves
    pub fn set_config(&mut self, config: SpringConfig) -> Result<()> {
        self.physics.set_config(config)
    }

    pub fn config(&self) -> SpringConfig {
        self.physics.config()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    fn playing(&self) -> Option<&SpringState> {
        let playback = self.playback.as_ref()?;
        let elapsed = self.clock.now().saturating_sub(playback.started_at);
        playback.trajectory.sample(elapsed)
    }
}
