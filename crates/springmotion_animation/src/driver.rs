//! Live motion driver
//!
//! A [`MotionDriver`] moves one element towards its destination, one spring
//! step per tick of a [`TickSource`], and reports every new position to a
//! [`MotionTarget`]. It subscribes to ticks only while there is motion to
//! drive:
//!
//! ```text
//! Idle ──move_to / resume──▶ Running ──settled / stop / no destination──▶ Idle
//! ```
//!
//! Retargeting while running keeps the current velocity, so the element
//! curves towards the new destination instead of restarting.
//!
//! Drivers are single-threaded: ticks, retargets and config changes must
//! all happen on the thread that owns the driver.

use crate::error::Result;
use crate::physics::SpringPhysics;
use crate::settings::{LiveCadence, MotionSettings};
use crate::spring::SpringConfig;
use crate::state::SpringState;
use springmotion_core::{Point, SubscriptionId, TickSource};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// The element being moved (a view, layer or window)
pub trait MotionTarget {
    /// Where the element's center is right now.
    ///
    /// Read when motion starts from rest, so manual moves made while the
    /// driver was idle are picked up.
    fn current_position(&self) -> Point;

    /// Move the element's center to `position`
    fn apply_position(&mut self, position: Point);
}

/// Whether a driver is subscribed to ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionPhase {
    Idle,
    Running,
}

struct DriverCore {
    physics: SpringPhysics,
    settle_threshold: f64,
    destination: Option<Point>,
    current: Option<SpringState>,
    subscription: Option<SubscriptionId>,
}

impl DriverCore {
    /// Unsubscribe and forget the current state. Returns `false` if already idle.
    fn halt(&mut self, ticks: &dyn TickSource) -> bool {
        self.current = None;
        match self.subscription.take() {
            Some(id) => {
                ticks.unsubscribe(id);
                true
            }
            None => false,
        }
    }
}

struct DriverShared {
    core: RefCell<DriverCore>,
    target: RefCell<Box<dyn MotionTarget>>,
    ticks: Rc<dyn TickSource>,
}

impl DriverShared {
    fn on_tick(&self) {
        let (destination, current) = {
            let core = self.core.borrow();
            (core.destination, core.current)
        };

        let Some(destination) = destination else {
            self.core.borrow_mut().halt(self.ticks.as_ref());
            tracing::debug!("tick without destination, motion stopped");
            return;
        };

        // Read with the core released; the target may query the driver
        let current = match current {
            Some(state) => state,
            None => SpringState::at_rest(self.target.borrow().current_position()),
        };

        let mut core = self.core.borrow_mut();
        if core.subscription.is_none() {
            // Stopped from inside current_position
            return;
        }
        let next = core.physics.next_state(&current, destination);

        if next.is_below(core.settle_threshold) {
            core.halt(self.ticks.as_ref());
            tracing::debug!(
                x = next.position.x,
                y = next.position.y,
                remaining = next.position.distance(destination),
                "motion settled"
            );
            return;
        }

        core.current = Some(next);
        // The target may call back into the driver
        drop(core);

        tracing::trace!(x = next.position.x, y = next.position.y, "motion step");
        self.target.borrow_mut().apply_position(next.position);
    }
}

impl Drop for DriverShared {
    fn drop(&mut self) {
        if let Some(id) = self.core.get_mut().subscription.take() {
            self.ticks.unsubscribe(id);
        }
    }
}

/// Tick-driven spring motion for one element.
///
/// Cloning yields another handle to the same driver. The tick source only
/// holds a weak reference, and dropping the last handle unsubscribes.
#[derive(Clone)]
pub struct MotionDriver {
    shared: Rc<DriverShared>,
}

/// Non-owning handle to a [`MotionDriver`]
#[derive(Clone)]
pub struct WeakMotionDriver {
    shared: Weak<DriverShared>,
}

impl WeakMotionDriver {
    pub fn upgrade(&self) -> Option<MotionDriver> {
        self.shared.upgrade().map(|shared| MotionDriver { shared })
    }
}

impl MotionDriver {
    pub fn new(
        config: SpringConfig,
        cadence: &LiveCadence,
        ticks: Rc<dyn TickSource>,
        target: Box<dyn MotionTarget>,
    ) -> Result<Self> {
        cadence.validate()?;
        let physics = SpringPhysics::new(config, cadence.timestep)?;

        Ok(Self {
            shared: Rc::new(DriverShared {
                core: RefCell::new(DriverCore {
                    physics,
                    settle_threshold: cadence.settle_threshold,
                    destination: None,
                    current: None,
                    subscription: None,
                }),
                target: RefCell::new(target),
                ticks,
            }),
        })
    }

    /// Driver using the spring and live cadence from `settings`
    pub fn from_settings(
        settings: &MotionSettings,
        ticks: Rc<dyn TickSource>,
        target: Box<dyn MotionTarget>,
    ) -> Result<Self> {
        Self::new(settings.spring, &settings.live, ticks, target)
    }

    /// Move towards `destination`, starting the motion if idle.
    ///
    /// While running, the next tick heads for the new destination with the
    /// current velocity intact.
    pub fn move_to(&self, destination: Point) {
        self.shared.core.borrow_mut().destination = Some(destination);
        self.start();
    }

    /// Forget the destination; the next tick stops the motion
    pub fn clear_destination(&self) {
        self.shared.core.borrow_mut().destination = None;
    }

    /// Swap the spring. Motion state and phase are left as they are.
    pub fn set_config(&self, config: SpringConfig) -> Result<()> {
        self.shared.core.borrow_mut().physics.set_config(config)
    }

    pub fn config(&self) -> SpringConfig {
        self.shared.core.borrow().physics.config()
    }

    pub fn timestep(&self) -> f64 {
        self.shared.core.borrow().physics.timestep()
    }

    /// Stop immediately, e.g. because the user grabbed the element.
    ///
    /// No tick reaches this driver after `stop` returns unless motion is
    /// started again. Stopping an idle driver does nothing.
    pub fn stop(&self) {
        let stopped = self
            .shared
            .core
            .borrow_mut()
            .halt(self.shared.ticks.as_ref());
        if stopped {
            tracing::debug!("motion stopped");
        }
    }

    /// Continue towards the last destination after a [`stop`](Self::stop)
    pub fn resume(&self) {
        if self.shared.core.borrow().destination.is_some() {
            self.start();
        }
    }

    pub fn phase(&self) -> MotionPhase {
        if self.shared.core.borrow().subscription.is_some() {
            MotionPhase::Running
        } else {
            MotionPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == MotionPhase::Running
    }

    pub fn destination(&self) -> Option<Point> {
        self.shared.core.borrow().destination
    }

    /// Last state produced by a tick, if running
    pub fn current_state(&self) -> Option<SpringState> {
        self.shared.core.borrow().current
    }

    pub fn downgrade(&self) -> WeakMotionDriver {
        WeakMotionDriver {
            shared: Rc::downgrade(&self.shared),
        }
    }

    fn start(&self) {
        let mut core = self.shared.core.borrow_mut();
        if core.subscription.is_some() {
            return;
        }

        let weak = Rc::downgrade(&self.shared);
        let id = self.shared.ticks.subscribe(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_tick();
            }
        }));
        core.subscription = Some(id);

        tracing::debug!(destination = ?core.destination, "motion started");
    }
}

impl fmt::Debug for MotionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("MotionDriver")
            .field("config", &core.physics.config())
            .field("destination", &core.destination)
            .field("current", &core.current)
            .field("running", &core.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TickHub;
    use std::cell::Cell;

    /// Target that records every applied position
    #[derive(Clone, Default)]
    struct Recorder {
        position: Rc<Cell<Point>>,
        applied: Rc<RefCell<Vec<Point>>>,
    }

    impl MotionTarget for Recorder {
        fn current_position(&self) -> Point {
            self.position.get()
        }

        fn apply_position(&mut self, position: Point) {
            self.position.set(position);
            self.applied.borrow_mut().push(position);
        }
    }

    fn driver(hub: &Rc<TickHub>, recorder: &Recorder) -> MotionDriver {
        MotionDriver::new(
            SpringConfig::default(),
            &LiveCadence::default(),
            hub.clone(),
            Box::new(recorder.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let hub = Rc::new(TickHub::new());
        let driver = driver(&hub, &Recorder::default());

        assert_eq!(driver.phase(), MotionPhase::Idle);
        assert!(hub.is_idle());
        assert!(driver.current_state().is_none());
        assert!(driver.destination().is_none());
    }

    #[test]
    fn test_move_subscribes_once() {
        let hub = Rc::new(TickHub::new());
        let driver = driver(&hub, &Recorder::default());

        driver.move_to(Point::new(100.0, 0.0));
        driver.move_to(Point::new(100.0, 0.0));
        driver.move_to(Point::new(50.0, 0.0));

        assert!(driver.is_running());
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(driver.destination(), Some(Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_runs_until_settled() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        let driver = driver(&hub, &recorder);

        driver.move_to(Point::new(100.0, 0.0));

        let mut ticks = 0;
        while driver.is_running() {
            hub.tick();
            ticks += 1;
            assert!(ticks < 10_000, "driver never settled");
        }

        let applied = recorder.applied.borrow();
        // The settling tick emits nothing
        assert_eq!(applied.len(), ticks - 1);
        assert!(applied.last().unwrap().distance(Point::new(100.0, 0.0)) < 0.5);
        assert!(hub.is_idle());
        assert!(driver.current_state().is_none());
        // The destination survives settling
        assert_eq!(driver.destination(), Some(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_starts_from_target_position() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        recorder.position.set(Point::new(-40.0, 10.0));
        let driver = driver(&hub, &recorder);

        driver.move_to(Point::new(0.0, 10.0));
        hub.tick();

        let state = driver.current_state().unwrap();
        assert!(state.position.x > -40.0 && state.position.x < 0.0);
        assert_eq!(state.position.y, 10.0);
        assert!(state.velocity.x > 0.0);
    }

    #[test]
    fn test_retarget_keeps_velocity() {
        let hub = Rc::new(TickHub::new());
        let driver = driver(&hub, &Recorder::default());

        driver.move_to(Point::new(100.0, 0.0));
        for _ in 0..10 {
            hub.tick();
        }
        let before = driver.current_state().unwrap();

        driver.move_to(Point::new(100.0, 0.0));
        assert_eq!(driver.current_state(), Some(before));

        driver.move_to(Point::new(100.0, 100.0));
        hub.tick();
        let after = driver.current_state().unwrap();

        // Still heading right at nearly the same speed, now also turning up
        assert!((after.velocity.x - before.velocity.x).abs() < before.velocity.x * 0.1);
        assert!(after.velocity.y > 0.0);
    }

    #[test]
    fn test_stop_is_synchronous_and_idempotent() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        let driver = driver(&hub, &recorder);

        driver.stop();
        assert_eq!(driver.phase(), MotionPhase::Idle);

        driver.move_to(Point::new(100.0, 0.0));
        hub.tick();
        hub.tick();
        driver.stop();
        driver.stop();

        let emitted = recorder.applied.borrow().len();
        hub.tick();
        hub.tick();

        assert_eq!(recorder.applied.borrow().len(), emitted);
        assert!(driver.current_state().is_none());
        assert!(hub.is_idle());
    }

    #[test]
    fn test_resume_continues_to_last_destination() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        let driver = driver(&hub, &recorder);

        // Resume without a destination stays idle
        driver.resume();
        assert!(!driver.is_running());

        driver.move_to(Point::new(100.0, 0.0));
        for _ in 0..5 {
            hub.tick();
        }
        driver.stop();

        // The user dragged the element somewhere else meanwhile
        recorder.position.set(Point::new(0.0, 300.0));
        driver.resume();
        assert!(driver.is_running());
        hub.tick();

        let state = driver.current_state().unwrap();
        assert!(state.position.y < 300.0);
        assert!(state.velocity.y < 0.0);
    }

    #[test]
    fn test_clear_destination_stops_on_next_tick() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        let driver = driver(&hub, &recorder);

        driver.move_to(Point::new(100.0, 0.0));
        hub.tick();
        driver.clear_destination();
        assert!(driver.is_running());

        hub.tick();
        assert!(!driver.is_running());
        assert_eq!(recorder.applied.borrow().len(), 1);
    }

    #[test]
    fn test_set_config_keeps_state() {
        let hub = Rc::new(TickHub::new());
        let driver = driver(&hub, &Recorder::default());

        driver.move_to(Point::new(100.0, 0.0));
        hub.tick();
        let state = driver.current_state();

        driver.set_config(SpringConfig::snappy()).unwrap();
        assert_eq!(driver.config(), SpringConfig::snappy());
        assert_eq!(driver.current_state(), state);
        assert!(driver.is_running());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = Rc::new(TickHub::new());
        let recorder = Recorder::default();
        let driver = driver(&hub, &recorder);
        let weak = driver.downgrade();

        driver.move_to(Point::new(100.0, 0.0));
        assert_eq!(hub.subscriber_count(), 1);

        drop(driver);
        assert!(hub.is_idle());
        assert!(weak.upgrade().is_none());
        hub.tick();
        assert!(recorder.applied.borrow().is_empty());
    }

    /// Target that retargets its own driver from inside `apply_position`
    struct Bouncer {
        driver: Rc<RefCell<Option<WeakMotionDriver>>>,
        position: Point,
        steps: u32,
    }

    impl MotionTarget for Bouncer {
        fn current_position(&self) -> Point {
            self.position
        }

        fn apply_position(&mut self, position: Point) {
            self.position = position;
            self.steps += 1;
            if self.steps == 3 {
                if let Some(driver) = self.driver.borrow().as_ref().and_then(|d| d.upgrade()) {
                    driver.move_to(Point::new(-100.0, 0.0));
                }
            }
        }
    }

    /// Target that inspects its own driver while reporting its position
    struct Inspector {
        driver: Rc<RefCell<Option<WeakMotionDriver>>>,
        seen_running: Rc<Cell<Option<bool>>>,
    }

    impl MotionTarget for Inspector {
        fn current_position(&self) -> Point {
            if let Some(driver) = self.driver.borrow().as_ref().and_then(|d| d.upgrade()) {
                self.seen_running.set(Some(driver.is_running()));
                assert!(driver.current_state().is_none());
                assert_eq!(driver.destination(), Some(Point::new(100.0, 0.0)));
            }
            Point::ZERO
        }

        fn apply_position(&mut self, _position: Point) {}
    }

    #[test]
    fn test_target_may_query_driver_for_position() {
        let hub = Rc::new(TickHub::new());
        let slot = Rc::new(RefCell::new(None));
        let seen_running = Rc::new(Cell::new(None));
        let driver = MotionDriver::new(
            SpringConfig::default(),
            &LiveCadence::default(),
            hub.clone(),
            Box::new(Inspector {
                driver: slot.clone(),
                seen_running: seen_running.clone(),
            }),
        )
        .unwrap();
        *slot.borrow_mut() = Some(driver.downgrade());

        driver.move_to(Point::new(100.0, 0.0));
        hub.tick();

        assert_eq!(seen_running.get(), Some(true));
        let state = driver.current_state().unwrap();
        assert!(state.position.x > 0.0);
    }

    #[test]
    fn test_target_may_reenter_driver() {
        let hub = Rc::new(TickHub::new());
        let slot = Rc::new(RefCell::new(None));
        let driver = MotionDriver::new(
            SpringConfig::default(),
            &LiveCadence::default(),
            hub.clone(),
            Box::new(Bouncer {
                driver: slot.clone(),
                position: Point::ZERO,
                steps: 0,
            }),
        )
        .unwrap();
        *slot.borrow_mut() = Some(driver.downgrade());

        driver.move_to(Point::new(100.0, 0.0));
        for _ in 0..3 {
            hub.tick();
        }

        assert_eq!(driver.destination(), Some(Point::new(-100.0, 0.0)));
        assert_eq!(hub.subscriber_count(), 1);

        let velocity = driver.current_state().unwrap().velocity;
        hub.tick();
        // Pulled back, but momentum is carried through the retarget
        let next = driver.current_state().unwrap().velocity;
        assert!(next.x < velocity.x);
        assert!(next.x > 0.0);
        assert_eq!(next.y, 0.0);
    }
}
