//! SpringMotion Core
//!
//! Host-facing primitives shared by the spring motion engine:
//!
//! - **Geometry**: `f64` points, vectors and frames
//! - **Subscriptions**: re-entrancy tolerant observer registries
//! - **Host abstractions**: tick sources and followable anchors
//!
//! # Example
//!
//! ```rust
//! use springmotion_core::{AnchorSource, FrameAnchor, Point, Rect};
//!
//! let anchor = FrameAnchor::new(Rect::new(0.0, 0.0, 200.0, 100.0));
//! let _id = anchor.on_change(Box::new(|center| {
//!     println!("anchor moved to {:?}", center);
//! }));
//!
//! anchor.move_center(Point::new(400.0, 300.0));
//! assert_eq!(anchor.current_center(), Point::new(400.0, 300.0));
//! ```

pub mod events;
pub mod geometry;

pub use events::{AnchorSource, Callback, FrameAnchor, SubscriptionId, Subscribers, TickSource};
pub use geometry::{Point, Rect, Size, Vec2};
