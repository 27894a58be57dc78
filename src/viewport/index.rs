//! R-tree index over placed card extents, using the rstar crate.
//!
//! Built once per layout and queried on every scroll/resize/zoom change,
//! so windowing a large chart costs O(log n + k) instead of a full scan.

use rstar::{AABB, RTree, RTreeObject};

use crate::layout::{Layout, LayoutConfig};

/// The rectangle a card occupies, tagged with its slot in `Layout::nodes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardExtent {
    pub slot: usize,
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl CardExtent {
    pub fn new(slot: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            slot,
            min: [x, y],
            max: [x + width, y + height],
        }
    }
}

impl RTreeObject for CardExtent {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Spatial index of one layout's cards.
#[derive(Debug)]
pub struct LayoutIndex {
    tree: RTree<CardExtent>,
}

impl LayoutIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load every card of `layout`.
    pub fn build(layout: &Layout, config: &LayoutConfig) -> Self {
        let extents: Vec<_> = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| {
                CardExtent::new(slot, node.x, node.y, config.node_width, config.node_height)
            })
            .collect();

        Self {
            tree: RTree::bulk_load(extents),
        }
    }

    /// Slots of every card whose vertical extent touches `[top, bottom]`
    /// (bounds inclusive), in ascending slot order. The full width of the
    /// chart is always included.
    pub fn in_band(&self, top: f32, bottom: f32) -> Vec<usize> {
        if self.tree.size() == 0 || bottom < top {
            return Vec::new();
        }

        let bounds = self.tree.root().envelope();
        let band = AABB::from_corners([bounds.lower()[0], top], [bounds.upper()[0], bottom]);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&band)
            .map(|extent| extent.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Slot of the topmost card containing a point, for drop-target picking.
    pub fn card_at(&self, x: f32, y: f32) -> Option<usize> {
        let point = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&point)
            .map(|extent| extent.slot)
            .max()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self::new()
    }
}
