//! Element geometry consumed by the propagator
//!
//! The layout system is external; it is reached only through
//! [`GeometryProvider`]. Reads mirror the DOM's offset/client/scroll
//! properties. Scroll writes are clamped by the provider, never by this crate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::geometry::Rect;
use crate::animation::Tweenable;

/// Tween key for the horizontal scroll offset of a container
pub const SCROLL_LEFT: &str = "scroll_left";
/// Tween key for the vertical scroll offset of a container
pub const SCROLL_TOP: &str = "scroll_top";

/// Read access to element geometry plus scroll assignment
pub trait GeometryProvider {
    type Node: Copy + Eq + fmt::Debug;

    /// Containment parent
    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `node` is an element that can act as a scroll container.
    /// Document roots and other non-element nodes end the walk.
    fn is_element(&self, node: Self::Node) -> bool;

    /// Nearest positioned ancestor that offsets are measured from
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn offset_left(&self, node: Self::Node) -> f64;
    fn offset_top(&self, node: Self::Node) -> f64;
    fn offset_width(&self, node: Self::Node) -> f64;
    fn offset_height(&self, node: Self::Node) -> f64;

    /// Width of the left border
    fn client_left(&self, node: Self::Node) -> f64;
    /// Width of the top border
    fn client_top(&self, node: Self::Node) -> f64;
    fn client_width(&self, node: Self::Node) -> f64;
    fn client_height(&self, node: Self::Node) -> f64;

    fn scroll_left(&self, node: Self::Node) -> f64;
    fn scroll_top(&self, node: Self::Node) -> f64;

    /// Assign the horizontal scroll offset; the provider clamps silently
    fn set_scroll_left(&mut self, node: Self::Node, value: f64);
    /// Assign the vertical scroll offset; the provider clamps silently
    fn set_scroll_top(&mut self, node: Self::Node, value: f64);

    /// Layout box of `node` relative to its offset parent
    fn offset_rect(&self, node: Self::Node) -> Rect {
        Rect::new(
            self.offset_left(node),
            self.offset_top(node),
            self.offset_width(node),
            self.offset_height(node),
        )
    }
}

/// Scroll offsets of one container, exposed as a tweenable record
///
/// Every write goes straight through to the provider.
pub struct ScrollPosition<P: GeometryProvider> {
    provider: Rc<RefCell<P>>,
    node: P::Node,
}

impl<P: GeometryProvider> ScrollPosition<P> {
    pub fn new(provider: Rc<RefCell<P>>, node: P::Node) -> Self {
        Self { provider, node }
    }

    pub fn node(&self) -> P::Node {
        self.node
    }
}

impl<P: GeometryProvider> Tweenable for ScrollPosition<P> {
    fn value(&self, key: &str) -> Option<f64> {
        let provider = self.provider.borrow();
        match key {
            SCROLL_LEFT => Some(provider.scroll_left(self.node)),
            SCROLL_TOP => Some(provider.scroll_top(self.node)),
            _ => None,
        }
    }

    fn set_value(&mut self, key: &str, value: f64) {
        let mut provider = self.provider.borrow_mut();
        match key {
            SCROLL_LEFT => provider.set_scroll_left(self.node, value),
            SCROLL_TOP => provider.set_scroll_top(self.node, value),
            other => tracing::trace!(key = other, "Ignoring non-scroll tween key"),
        }
    }
}

impl<P: GeometryProvider> fmt::Debug for ScrollPosition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollPosition")
            .field("node", &self.node)
            .finish()
    }
}
