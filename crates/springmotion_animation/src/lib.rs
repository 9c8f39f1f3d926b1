//! SpringMotion Animation Engine
//!
//! Moves a point (the center of a view, layer or window) towards a possibly
//! moving destination using the closed-form damped harmonic oscillator.
//!
//! # Features
//!
//! - **Exact spring steps**: per-timestep transition coefficients, no
//!   integration drift
//! - **Live driving**: one step per tick, retargetable mid-flight with
//!   momentum preserved
//! - **Precomputed trajectories**: whole moves generated up front for
//!   keyframe players
//! - **Pinning**: follow another element at a fixed offset
//!
//! # Example
//!
//! ```rust
//! use springmotion_animation::{LiveCadence, MotionDriver, MotionTarget, SpringConfig, TickHub};
//! use springmotion_core::Point;
//! use std::rc::Rc;
//!
//! struct Dot(Point);
//!
//! impl MotionTarget for Dot {
//!     fn current_position(&self) -> Point {
//!         self.0
//!     }
//!     fn apply_position(&mut self, position: Point) {
//!         self.0 = position;
//!     }
//! }
//!
//! let hub = Rc::new(TickHub::new());
//! let driver = MotionDriver::new(
//!     SpringConfig::default(),
//!     &LiveCadence::default(),
//!     hub.clone(),
//!     Box::new(Dot(Point::ZERO)),
//! )
//! .unwrap();
//!
//! driver.move_to(Point::new(100.0, 40.0));
//! while driver.is_running() {
//!     hub.tick();
//! }
//! ```

pub mod batch;
pub mod driver;
pub mod error;
pub mod physics;
pub mod pinning;
pub mod scheduler;
pub mod settings;
pub mod spring;
pub mod state;
pub mod trajectory;

pub use batch::{TrajectoryAnimator, TrajectoryPlayer};
pub use driver::{MotionDriver, MotionPhase, MotionTarget, WeakMotionDriver};
pub use error::{MotionError, Result};
pub use physics::{next_state, SpringPhysics};
pub use pinning::{Follower, PinningController};
pub use scheduler::{Clock, FixedRateTicker, ManualClock, SystemClock, TickHub};
pub use settings::{BatchCadence, LiveCadence, MotionSettings};
pub use spring::{SpringCoefficients, SpringConfig};
pub use state::SpringState;
pub use trajectory::{PositionKeyframe, Trajectory};
