//! Rectangles and coordinate-space changes
//!
//! Everything here is a pure `Rect -> Rect` transform; the propagator chains
//! them to carry the target's box from one container's space to the next.

use serde::{Deserialize, Serialize};

use super::provider::GeometryProvider;

/// Axis-aligned box; `right` and `bottom` are always derived
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Same size, shifted by `(dx, dy)`
    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

/// Offset parents of `node`, nearest first
fn offset_chain<P: GeometryProvider>(provider: &P, node: P::Node) -> Vec<P::Node> {
    let mut chain = Vec::new();
    let mut current = provider.offset_parent(node);
    while let Some(ancestor) = current {
        chain.push(ancestor);
        current = provider.offset_parent(ancestor);
    }
    chain
}

/// Re-express `rect`, measured from `from`'s offset parent, relative to
/// `to`'s offset parent
///
/// Each offset chain contributes `offset + border` of every ancestor below the
/// point where the two chains meet. When both nodes share an offset parent
/// the rectangle is returned as is.
pub fn relative_from_to<P: GeometryProvider>(
    provider: &P,
    rect: Rect,
    from: P::Node,
    to: P::Node,
) -> Rect {
    let from_parent = provider.offset_parent(from);
    let to_parent = provider.offset_parent(to);
    if from_parent == to_parent {
        return rect;
    }

    let from_chain = offset_chain(provider, from);
    let to_chain = offset_chain(provider, to);
    let common = from_chain.iter().find(|node| to_chain.contains(node)).copied();

    let mut left = rect.left;
    let mut top = rect.top;
    for &ancestor in from_chain.iter().take_while(|&&n| Some(n) != common) {
        left += provider.offset_left(ancestor) + provider.client_left(ancestor);
        top += provider.offset_top(ancestor) + provider.client_top(ancestor);
    }
    for &ancestor in to_chain.iter().take_while(|&&n| Some(n) != common) {
        left -= provider.offset_left(ancestor) + provider.client_left(ancestor);
        top -= provider.offset_top(ancestor) + provider.client_top(ancestor);
    }

    Rect::new(left, top, rect.width, rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureNode, FixtureTree};

    #[test]
    fn test_rect_derived_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
    }

    #[test]
    fn test_translate_keeps_size() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0).translate(-5.0, 7.5);
        assert_eq!(rect, Rect::new(5.0, 27.5, 30.0, 40.0));
        assert_eq!(rect.right(), 35.0);
    }

    #[test]
    fn test_same_offset_parent_is_unchanged() {
        let tree = FixtureTree::from_nodes(vec![
            FixtureNode::new("root").offset(0.0, 0.0, 500.0, 500.0),
            FixtureNode::new("a").parent("root").offset_parent("root").offset(5.0, 5.0, 10.0, 10.0),
            FixtureNode::new("b").parent("a").offset_parent("root").offset(7.0, 9.0, 1.0, 1.0),
        ])
        .unwrap();
        let a = tree.node("a").unwrap();
        let b = tree.node("b").unwrap();
        let rect = tree.offset_rect(b);
        assert_eq!(relative_from_to(&tree, rect, b, a), rect);
    }

    #[test]
    fn test_chains_meet_at_common_ancestor() {
        // root > outer (border 2) > inner (border 3) > leaf
        let tree = FixtureTree::from_nodes(vec![
            FixtureNode::new("root").offset(0.0, 0.0, 1000.0, 1000.0),
            FixtureNode::new("outer")
                .parent("root")
                .offset_parent("root")
                .offset(100.0, 200.0, 400.0, 400.0)
                .border(2.0, 2.0),
            FixtureNode::new("inner")
                .parent("outer")
                .offset_parent("outer")
                .offset(10.0, 20.0, 200.0, 200.0)
                .border(3.0, 3.0),
            FixtureNode::new("leaf")
                .parent("inner")
                .offset_parent("inner")
                .offset(1.0, 2.0, 5.0, 5.0),
        ])
        .unwrap();
        let inner = tree.node("inner").unwrap();
        let leaf = tree.node("leaf").unwrap();

        // leaf's offset parent (inner) sits below the meeting point (outer),
        // so inner's offset and border are added.
        let moved = relative_from_to(&tree, tree.offset_rect(leaf), leaf, inner);
        assert_eq!(moved, Rect::new(1.0 + 10.0 + 3.0, 2.0 + 20.0 + 3.0, 5.0, 5.0));
    }

    #[test]
    fn test_chains_subtract_target_side() {
        // a and b live under different positioned ancestors of root.
        let tree = FixtureTree::from_nodes(vec![
            FixtureNode::new("root").offset(0.0, 0.0, 1000.0, 1000.0),
            FixtureNode::new("left")
                .parent("root")
                .offset_parent("root")
                .offset(50.0, 60.0, 100.0, 100.0),
            FixtureNode::new("right")
                .parent("root")
                .offset_parent("root")
                .offset(300.0, 10.0, 100.0, 100.0)
                .border(4.0, 1.0),
            FixtureNode::new("a").parent("left").offset_parent("left").offset(1.0, 1.0, 2.0, 2.0),
            FixtureNode::new("b").parent("right").offset_parent("right").offset(0.0, 0.0, 2.0, 2.0),
        ])
        .unwrap();
        let a = tree.node("a").unwrap();
        let right = tree.node("right").unwrap();

        // a's parent chain [left, root], right's chain [root]; they meet at root.
        let moved = relative_from_to(&tree, tree.offset_rect(a), a, right);
        assert_eq!(moved, Rect::new(51.0, 61.0, 2.0, 2.0));

        let b = tree.node("b").unwrap();
        let left = tree.node("left").unwrap();
        let back = relative_from_to(&tree, tree.offset_rect(b), b, left);
        assert_eq!(back, Rect::new(304.0, 11.0, 2.0, 2.0));

        // Both sides below root: left is added, right (with border) subtracted.
        let across = relative_from_to(&tree, tree.offset_rect(a), a, b);
        assert_eq!(across, Rect::new(1.0 + 50.0 - 304.0, 1.0 + 60.0 - 11.0, 2.0, 2.0));
    }
}
