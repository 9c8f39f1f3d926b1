//! Subscription plumbing
//!
//! The motion core talks to its host through two kinds of notification
//! streams: a periodic tick (display refresh or timer) and an anchor's
//! position changes. Both are single-threaded, in-memory observer lists
//! keyed by generational [`SubscriptionId`]s.

use crate::geometry::{Point, Rect};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};

new_key_type! {
    /// Handle returned by every subscribe call; pass it back to unsubscribe
    pub struct SubscriptionId;
}

/// Callback stored in a [`Subscribers`] registry
pub type Callback<A> = Box<dyn FnMut(A)>;

/// Observer registry that tolerates re-entrant mutation.
///
/// A callback is taken out of its slot while it runs, so it can subscribe
/// or unsubscribe anything on the same registry (itself included). Ids are
/// snapshotted when an emission starts: callbacks added during an emission
/// first fire on the next one, and a callback removed during an emission
/// does not fire again in it.
pub struct Subscribers<A> {
    slots: RefCell<SlotMap<SubscriptionId, Option<Callback<A>>>>,
}

impl<A: Clone> Subscribers<A> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Register a callback
    pub fn insert<F: FnMut(A) + 'static>(&self, callback: F) -> SubscriptionId {
        self.insert_boxed(Box::new(callback))
    }

    /// Register an already boxed callback
    pub fn insert_boxed(&self, callback: Callback<A>) -> SubscriptionId {
        self.slots.borrow_mut().insert(Some(callback))
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        self.slots.borrow_mut().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Deliver `args` to every registered callback.
    ///
    /// Returns the number of callbacks invoked.
    pub fn emit(&self, args: A) -> usize {
        let ids: SmallVec<[SubscriptionId; 8]> = self.slots.borrow().keys().collect();
        let mut delivered = 0;

        for id in ids {
            // Released before the call so the callback may touch the registry
            let taken = self.slots.borrow_mut().get_mut(id).and_then(Option::take);
            let Some(mut callback) = taken else {
                continue;
            };

            callback(args.clone());
            delivered += 1;

            // Put it back unless it unsubscribed during the call
            if let Some(slot) = self.slots.borrow_mut().get_mut(id) {
                *slot = Some(callback);
            }
        }

        delivered
    }
}

impl<A: Clone> Default for Subscribers<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A periodic callback provider (display link, refresh timer, test clock).
///
/// Subscribers fire once per tick for as long as they stay subscribed.
/// `unsubscribe` takes effect immediately, also when called from inside a
/// tick callback.
pub trait TickSource {
    fn subscribe(&self, callback: Box<dyn FnMut()>) -> SubscriptionId;

    /// Returns `false` if the subscription was already gone
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Something whose center can be followed, such as another window.
pub trait AnchorSource {
    fn current_center(&self) -> Point;

    /// Observe center changes. The callback receives the new center.
    fn on_change(&self, callback: Box<dyn FnMut(Point)>) -> SubscriptionId;

    /// Returns `false` if the observation was already cancelled
    fn cancel(&self, id: SubscriptionId) -> bool;
}

/// In-memory anchor backed by a frame rectangle.
///
/// Every frame change notifies observers with the new center, whether or
/// not the center actually moved.
pub struct FrameAnchor {
    frame: Cell<Rect>,
    observers: Subscribers<Point>,
}

impl FrameAnchor {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame: Cell::new(frame),
            observers: Subscribers::new(),
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Replace the frame and notify observers
    pub fn set_frame(&self, frame: Rect) {
        self.frame.set(frame);
        let center = frame.center();
        let notified = self.observers.emit(center);
        tracing::trace!(x = center.x, y = center.y, notified, "anchor frame changed");
    }

    /// Move the frame so its center lands on `center`
    pub fn move_center(&self, center: Point) {
        self.set_frame(self.frame.get().with_center(center));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl AnchorSource for FrameAnchor {
    fn current_center(&self) -> Point {
        self.frame.get().center()
    }

    fn on_change(&self, callback: Box<dyn FnMut(Point)>) -> SubscriptionId {
        self.observers.insert_boxed(callback)
    }

    fn cancel(&self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }
}
