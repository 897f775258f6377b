//! Per-axis scroll target selection

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::provider::{GeometryProvider, SCROLL_LEFT, SCROLL_TOP};
use crate::animation::TweenValues;

/// Pick a scroll offset for one axis
///
/// `min` is the smallest offset that still shows the far edge of the box,
/// `max` the largest that still shows its near edge, `extent` the viewport
/// size along the axis.
///
/// Without centering, or when the box is already within reach of the
/// viewport, `current` is clamped into `[min, max]`, so a visible box does
/// not move and a hidden one moves just far enough. Otherwise the box is
/// centered at `(min + max) / 2`.
pub fn within_bounds(current: f64, min: f64, max: f64, extent: f64, center_if_needed: bool) -> f64 {
    if !center_if_needed || (max <= current + extent && current <= min + extent) {
        // Not f64::clamp: min exceeds max when the box is larger than the viewport.
        current.max(min).min(max)
    } else {
        (min + max) / 2.0
    }
}

/// Visible area and scroll state of a container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub client_width: f64,
    pub client_height: f64,
}

impl Viewport {
    pub fn of<P: GeometryProvider>(provider: &P, node: P::Node) -> Self {
        Self {
            scroll_left: provider.scroll_left(node),
            scroll_top: provider.scroll_top(node),
            client_width: provider.client_width(node),
            client_height: provider.client_height(node),
        }
    }
}

/// Absolute scroll offsets wanted for one container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl ScrollRequest {
    pub fn new(scroll_left: f64, scroll_top: f64) -> Self {
        Self {
            scroll_left,
            scroll_top,
        }
    }

    /// Offsets that bring `rect`, in the container's client coordinates, into view
    pub fn for_rect(rect: &Rect, viewport: &Viewport, center_if_needed: bool) -> Self {
        Self {
            scroll_left: within_bounds(
                viewport.scroll_left,
                rect.right() - viewport.client_width,
                rect.left,
                viewport.client_width,
                center_if_needed,
            ),
            scroll_top: within_bounds(
                viewport.scroll_top,
                rect.bottom() - viewport.client_height,
                rect.top,
                viewport.client_height,
                center_if_needed,
            ),
        }
    }

    /// Current offsets of `node`
    pub fn read<P: GeometryProvider>(provider: &P, node: P::Node) -> Self {
        Self::new(provider.scroll_left(node), provider.scroll_top(node))
    }

    pub fn to_values(&self) -> TweenValues {
        TweenValues::from([
            (SCROLL_LEFT.to_string(), self.scroll_left),
            (SCROLL_TOP.to_string(), self.scroll_top),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_box_does_not_move() {
        // Box at 150..200 inside a 200px viewport scrolled to 100.
        assert_eq!(within_bounds(100.0, 0.0, 150.0, 200.0, false), 100.0);
        assert_eq!(within_bounds(100.0, 0.0, 150.0, 200.0, true), 100.0);
    }

    #[test]
    fn test_minimal_motion_moves_just_enough() {
        // Box at 600..620 in a 100px viewport at 0: bottom edge lands at the bottom.
        assert_eq!(within_bounds(0.0, 520.0, 600.0, 100.0, false), 520.0);
        // Box above the viewport: top edge lands at the top.
        assert_eq!(within_bounds(500.0, -50.0, 100.0, 200.0, false), 100.0);
    }

    #[test]
    fn test_centering_when_out_of_reach() {
        assert_eq!(within_bounds(0.0, 520.0, 600.0, 100.0, true), 560.0);
        assert_eq!(within_bounds(500.0, -50.0, 100.0, 200.0, true), 25.0);
    }

    #[test]
    fn test_oversized_box_prefers_near_edge() {
        // Box of 300 in a viewport of 100: min (200) exceeds max (0).
        assert_eq!(within_bounds(50.0, 200.0, 0.0, 100.0, false), 0.0);
    }

    #[test]
    fn test_request_for_rect() {
        let viewport = Viewport {
            scroll_left: 0.0,
            scroll_top: 0.0,
            client_width: 100.0,
            client_height: 100.0,
        };
        let rect = Rect::new(0.0, 600.0, 50.0, 20.0);
        assert_eq!(
            ScrollRequest::for_rect(&rect, &viewport, false),
            ScrollRequest::new(0.0, 520.0)
        );
        assert_eq!(
            ScrollRequest::for_rect(&rect, &viewport, true),
            ScrollRequest::new(0.0, 560.0)
        );
    }

    #[test]
    fn test_request_to_values() {
        let values = ScrollRequest::new(3.0, 4.0).to_values();
        assert_eq!(values[SCROLL_LEFT], 3.0);
        assert_eq!(values[SCROLL_TOP], 4.0);
    }
}
