//! Scroll-into-view propagation across nested scroll containers
//!
//! The element's box starts in its offset parent's coordinates. For each
//! ancestor container, [`relative_from_to`] carries the box into the
//! container's client space, [`within_bounds`] picks the offset on each axis,
//! and the scroll actually applied is subtracted before the next container
//! is visited.
//!
//! Geometry is read and scroll is written through a [`GeometryProvider`];
//! [`crate::fixture::FixtureTree`] is an in-memory one.

pub mod bounds;
pub mod geometry;
pub mod propagate;
pub mod provider;

pub use bounds::{within_bounds, ScrollRequest, Viewport};
pub use geometry::{relative_from_to, Rect};
pub use propagate::{scroll_into_view, PropagationMode, ScrollOptions};
pub use provider::{GeometryProvider, ScrollPosition, SCROLL_LEFT, SCROLL_TOP};
