//! Hierarchy layout.
//!
//! A layout pass runs in two steps over the (already filtered) forest:
//!
//! 1. **Widths (bottom-up):** [`SubtreeWidths`] computes the horizontal
//!    space each visible subtree needs, memoized per node identifier.
//! 2. **Placement (top-down):** [`NodePlacer`] walks the forest again and
//!    assigns absolute card positions plus elbow edges.
//!
//! How a node's visible children are arranged depends on its depth and
//! fan-out; see [`ChildArrangement`].

mod placer;
mod types;
mod width;

use serde::Deserialize;

use crate::tree::{ExpandedSet, OrgNode};

pub use placer::NodePlacer;
pub use types::{Edge, Layout, PositionedNode};
pub use width::SubtreeWidths;

/// Geometry constants of the layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Card width.
    pub node_width: f32,
    /// Card height.
    pub node_height: f32,
    /// Gap between sibling subtrees.
    pub horizontal_gap: f32,
    /// Gap between a card and the row below it.
    pub vertical_gap: f32,
    pub outer_padding_x: f32,
    pub outer_padding_y: f32,
    /// Lower bound on the reported canvas width.
    pub min_width: f32,
    /// Lower bound on the reported canvas height.
    pub min_height: f32,
    /// Depth whose children are stacked vertically under their manager.
    pub stack_depth: usize,
    /// Fan-outs above this (at depths before `stack_depth`) wrap into two rows.
    pub split_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 65.0,
            horizontal_gap: 12.0,
            vertical_gap: 40.0,
            outer_padding_x: 20.0,
            outer_padding_y: 20.0,
            min_width: 800.0,
            min_height: 600.0,
            stack_depth: 4,
            split_threshold: 5,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance from one row of cards to the next.
    #[inline]
    pub fn row_height(&self) -> f32 {
        self.node_height + self.vertical_gap
    }

    /// How `visible_children` children of a node at `depth` are arranged.
    pub fn arrangement(&self, depth: usize, visible_children: usize) -> ChildArrangement {
        if visible_children == 0 {
            ChildArrangement::Leaf
        } else if depth == self.stack_depth {
            ChildArrangement::Stacked
        } else if visible_children > self.split_threshold && depth < self.stack_depth {
            ChildArrangement::Split {
                first_row: visible_children.div_ceil(2),
            }
        } else {
            ChildArrangement::Row
        }
    }
}

/// Arrangement of a node's visible children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildArrangement {
    /// No visible children.
    Leaf,
    /// Children form a vertical list at the manager's x; they never widen it.
    Stacked,
    /// Children wrap into two centered rows; the first holds `first_row` of them.
    Split { first_row: usize },
    /// Children sit side by side in a single row.
    Row,
}

/// Run a full layout pass: widths, then placement.
pub fn compute_layout(roots: &[OrgNode], expanded: &ExpandedSet, config: &LayoutConfig) -> Layout {
    let widths = SubtreeWidths::compute(roots, expanded, config);
    NodePlacer::new(config, expanded, &widths).place_forest(roots)
}
