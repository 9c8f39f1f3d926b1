//! Tick sources and clocks
//!
//! Hosts drive motion by firing ticks. [`TickHub`] fires once per call and
//! stands in for a display-refresh callback (and for tests);
//! [`FixedRateTicker`] turns wall-clock time into a steady tick rate.

use crate::error::{MotionError, Result};
use crate::settings::LiveCadence;
use springmotion_core::{SubscriptionId, Subscribers, TickSource};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Manually fired tick source.
///
/// Call [`TickHub::tick`] once per display refresh on the thread that owns
/// the drivers.
pub struct TickHub {
    subscribers: Subscribers<()>,
    ticks_fired: Cell<u64>,
}

impl TickHub {
    pub fn new() -> Self {
        Self {
            subscribers: Subscribers::new(),
            ticks_fired: Cell::new(0),
        }
    }

    /// Fire one tick. Returns the number of subscribers notified.
    pub fn tick(&self) -> usize {
        self.ticks_fired.set(self.ticks_fired.get() + 1);
        self.subscribers.emit(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if anything is waiting for ticks
    pub fn is_idle(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired.get()
    }
}

impl Default for TickHub {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for TickHub {
    fn subscribe(&self, mut callback: Box<dyn FnMut()>) -> SubscriptionId {
        self.subscribers.insert(move |()| callback())
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

/// Fixed-interval tick source fed with elapsed wall-clock time.
///
/// Time is accumulated and converted into whole ticks; the remainder carries
/// over to the next [`advance`](Self::advance). A backlog larger than
/// `max_catch_up` ticks is dropped rather than replayed.
pub struct FixedRateTicker {
    hub: Rc<TickHub>,
    interval: Duration,
    accumulated: Duration,
    max_catch_up: u32,
}

impl FixedRateTicker {
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(MotionError::InvalidTimestep(0.0));
        }
        Ok(Self {
            hub: Rc::new(TickHub::new()),
            interval,
            accumulated: Duration::ZERO,
            max_catch_up: 8,
        })
    }

    /// One tick per simulated live timestep
    pub fn from_cadence(cadence: &LiveCadence) -> Result<Self> {
        cadence.validate()?;
        let interval = Duration::try_from_secs_f64(cadence.timestep)
            .map_err(|_| MotionError::InvalidTimestep(cadence.timestep))?;
        Self::new(interval)
    }

    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    /// The tick source to hand to drivers
    pub fn source(&self) -> Rc<TickHub> {
        self.hub.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Account for `elapsed` wall-clock time and fire the ticks it covers.
    ///
    /// Returns the number of ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let due = self.accumulated.as_nanos() / self.interval.as_nanos();

        let steps = if due > self.max_catch_up as u128 {
            tracing::warn!(
                due = due as u64,
                max_catch_up = self.max_catch_up,
                interval_secs = self.interval.as_secs_f64(),
                "capping tick catch-up"
            );
            self.accumulated = Duration::ZERO;
            self.max_catch_up
        } else {
            let steps = due as u32;
            self.accumulated -= self.interval * steps;
            steps
        };

        for _ in 0..steps {
            self.hub.tick();
        }
        steps
    }
}

/// Monotonic time source used to measure playback progress
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock based on [`Instant`]
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Settable clock; clones share the same time
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(source: &dyn TickSource) -> (Rc<Cell<u32>>, SubscriptionId) {
        let count = Rc::new(Cell::new(0));
        let id = {
            let count = count.clone();
            source.subscribe(Box::new(move || count.set(count.get() + 1)))
        };
        (count, id)
    }

    #[test]
    fn test_hub_fires_subscribers() {
        let hub = TickHub::new();
        let (count, id) = counter(&hub);

        assert_eq!(hub.tick(), 1);
        assert_eq!(hub.tick(), 1);
        assert_eq!(count.get(), 2);

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        assert!(hub.is_idle());
        assert_eq!(hub.tick(), 0);
        assert_eq!(count.get(), 2);
        assert_eq!(hub.ticks_fired(), 3);
    }

    #[test]
    fn test_fixed_rate_accumulates() {
        let mut ticker = FixedRateTicker::new(Duration::from_millis(8)).unwrap();
        let hub = ticker.source();
        let (count, _id) = counter(hub.as_ref());

        assert_eq!(ticker.advance(Duration::from_millis(5)), 0);
        assert_eq!(ticker.advance(Duration::from_millis(5)), 1);
        assert_eq!(ticker.advance(Duration::from_millis(22)), 3);
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_fixed_rate_caps_backlog() {
        let mut ticker = FixedRateTicker::new(Duration::from_millis(10))
            .unwrap()
            .with_max_catch_up(4);

        assert_eq!(ticker.advance(Duration::from_secs(2)), 4);
        // Backlog dropped, nothing left over
        assert_eq!(ticker.advance(Duration::from_millis(5)), 0);
        assert_eq!(ticker.advance(Duration::from_millis(5)), 1);
    }

    #[test]
    fn test_fixed_rate_rejects_zero_interval() {
        assert!(FixedRateTicker::new(Duration::ZERO).is_err());

        let ticker = FixedRateTicker::from_cadence(&LiveCadence::default()).unwrap();
        assert_eq!(ticker.interval(), Duration::from_millis(8));

        let huge = LiveCadence {
            timestep: 1e20,
            ..LiveCadence::default()
        };
        assert!(matches!(
            FixedRateTicker::from_cadence(&huge),
            Err(MotionError::InvalidTimestep(_))
        ));
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();

        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(250));
        assert_eq!(view.now(), Duration::from_millis(500));

        view.set(Duration::from_secs(3));
        assert_eq!(clock.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
