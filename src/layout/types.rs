//! Output types of a layout pass.

use serde::Serialize;

use crate::tree::NodeRecord;

/// A node with its absolute position on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub record: NodeRecord,
    /// Number of direct reports in the (filtered) tree, expanded or not.
    pub child_count: usize,
    /// Left edge of the card.
    pub x: f32,
    /// Top edge of the card.
    pub y: f32,
    /// Tree depth (root = 0).
    pub depth: usize,
    /// Horizontal space reserved for the node's visible subtree.
    pub subtree_width: f32,
    /// True for the first node placed at its depth (carries the level label).
    pub first_at_depth: bool,
}

impl PositionedNode {
    #[inline]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }
}

/// Elbow connector from a manager's bottom-center to a report's top-center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from_id: String,
    pub to_id: String,
    pub from_x: f32,
    pub from_y: f32,
    pub to_x: f32,
    pub to_y: f32,
}

impl Edge {
    /// Vertical midpoint where the horizontal segment runs.
    #[inline]
    pub fn mid_y(&self) -> f32 {
        self.from_y + (self.to_y - self.from_y) / 2.0
    }

    /// The four corner points: down, across, down.
    pub fn elbow(&self) -> [(f32, f32); 4] {
        let mid_y = self.mid_y();
        [
            (self.from_x, self.from_y),
            (self.from_x, mid_y),
            (self.to_x, mid_y),
            (self.to_x, self.to_y),
        ]
    }

    /// SVG path data for the elbow.
    pub fn svg_path(&self) -> String {
        let [(ax, ay), (bx, by), (cx, cy), (dx, dy)] = self.elbow();
        format!("M {ax} {ay} L {bx} {by} L {cx} {cy} L {dx} {dy}")
    }
}

/// Full result of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Every visible node, in placement (pre-order) order.
    pub nodes: Vec<PositionedNode>,
    /// One edge per (manager, visible report) pair.
    pub edges: Vec<Edge>,
    /// Canvas width including outer padding.
    pub width: f32,
    /// Canvas height including outer padding.
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
