//! Pinning one moving element to another
//!
//! A [`PinningController`] observes an anchor and retargets its follower to
//! `anchor center + offset` every time the anchor moves. It owns neither the
//! anchor nor the follower, only the observation.

use crate::driver::{MotionDriver, WeakMotionDriver};
use springmotion_core::{AnchorSource, Point, SubscriptionId, Vec2};
use std::rc::{Rc, Weak};

/// Something that can be sent towards a new destination
pub trait Follower: Clone + 'static {
    /// Retarget the follower. Returns `false` if it no longer exists.
    fn follow(&self, destination: Point) -> bool;
}

impl Follower for WeakMotionDriver {
    fn follow(&self, destination: Point) -> bool {
        match self.upgrade() {
            Some(driver) => {
                driver.move_to(destination);
                true
            }
            None => false,
        }
    }
}

struct ActivePin {
    anchor: Weak<dyn AnchorSource>,
    subscription: SubscriptionId,
    offset: Vec2,
}

/// Keeps a follower at a fixed offset from an anchor's center
pub struct PinningController<F: Follower = WeakMotionDriver> {
    follower: F,
    active: Option<ActivePin>,
}

impl PinningController<WeakMotionDriver> {
    /// Pin controller moving `driver`
    pub fn for_driver(driver: &MotionDriver) -> Self {
        Self::new(driver.downgrade())
    }
}

impl<F: Follower> PinningController<F> {
    pub fn new(follower: F) -> Self {
        Self {
            follower,
            active: None,
        }
    }

    /// Follow `anchor` at `offset` from its center, replacing any previous pin.
    ///
    /// The follower is sent to the anchor's current center right away.
    pub fn pin<A: AnchorSource + 'static>(&mut self, anchor: &Rc<A>, offset: Vec2) {
        self.unpin();

        if !self.follower.follow(anchor.current_center() + offset) {
            tracing::debug!("pin skipped, follower is gone");
            return;
        }

        let follower = self.follower.clone();
        let subscription = anchor.on_change(Box::new(move |center| {
            follower.follow(center + offset);
        }));

        let anchor: Weak<A> = Rc::downgrade(anchor);
        let anchor: Weak<dyn AnchorSource> = anchor;
        self.active = Some(ActivePin {
            anchor,
            subscription,
            offset,
        });
        tracing::debug!(dx = offset.x, dy = offset.y, "pinned to anchor");
    }

    /// Stop following. The follower's current motion is not affected.
    pub fn unpin(&mut self) {
        let Some(pin) = self.active.take() else {
            return;
        };
        if let Some(anchor) = pin.anchor.upgrade() {
            anchor.cancel(pin.subscription);
        }
        tracing::debug!("unpinned from anchor");
    }

    pub fn is_pinned(&self) -> bool {
        self.active.is_some()
    }

    /// Offset of the active pin
    pub fn offset(&self) -> Option<Vec2> {
        self.active.as_ref().map(|pin| pin.offset)
    }
}

impl<F: Follower> Drop for PinningController<F> {
    fn drop(&mut self) {
        self.unpin();
    }
}
