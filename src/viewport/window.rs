//! Vertical windowing of a layout.
//!
//! Only vertical scroll is virtualized: a card is realized when its
//! vertical extent overlaps the scrolled viewport grown by a fixed buffer
//! on both sides. Zoom is a pure visual transform on top, so the window is
//! computed in unzoomed layout coordinates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::index::LayoutIndex;
use crate::layout::{Edge, Layout, LayoutConfig, PositionedNode};

/// Windowing configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Extra distance above and below the viewport that is still realized.
    pub buffer: f32,
    /// Container height assumed before the host reports one.
    pub initial_height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            buffer: 400.0,
            initial_height: 600.0,
        }
    }
}

/// Scroll state of the rendering surface, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub container_height: f32,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(scroll_top: f32, container_height: f32, zoom: f32) -> Self {
        Self {
            scroll_top,
            container_height,
            zoom,
        }
    }

    /// The realized band `[top, bottom]` in layout coordinates.
    pub fn logical_band(&self, buffer: f32) -> (f32, f32) {
        let zoom = if self.zoom > 0.0 && self.zoom.is_finite() {
            self.zoom
        } else {
            1.0
        };
        let scroll_top = self.scroll_top / zoom;
        let container_height = self.container_height / zoom;
        (scroll_top - buffer, scroll_top + container_height + buffer)
    }
}

/// The subset of a layout handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderWindow<'a> {
    pub nodes: Vec<&'a PositionedNode>,
    pub edges: Vec<&'a Edge>,
    /// Full canvas size, so scroll extents stay stable while windowing.
    pub width: f32,
    pub height: f32,
}

impl<'a> RenderWindow<'a> {
    /// Every node and edge of the layout: the unwindowed export view.
    pub fn full(layout: &'a Layout) -> Self {
        Self {
            nodes: layout.nodes.iter().collect(),
            edges: layout.edges.iter().collect(),
            width: layout.width,
            height: layout.height,
        }
    }

    /// Keep `nodes` and every edge touching one of them.
    fn from_nodes(layout: &'a Layout, nodes: Vec<&'a PositionedNode>) -> Self {
        let visible: HashSet<&str> = nodes.iter().map(|node| node.id()).collect();
        let edges = layout
            .edges
            .iter()
            .filter(|edge| {
                visible.contains(edge.from_id.as_str()) || visible.contains(edge.to_id.as_str())
            })
            .collect();

        Self {
            nodes,
            edges,
            width: layout.width,
            height: layout.height,
        }
    }
}

/// Window a layout by linear scan.
///
/// A node is visible iff `[y, y + node_height]` overlaps
/// `[scroll_top - buffer, scroll_top + container_height + buffer]`.
pub fn visible<'a>(
    layout: &'a Layout,
    config: &LayoutConfig,
    scroll_top: f32,
    container_height: f32,
    buffer: f32,
) -> RenderWindow<'a> {
    let start = scroll_top - buffer;
    let end = scroll_top + container_height + buffer;
    let nodes = layout
        .nodes
        .iter()
        .filter(|node| node.y + config.node_height >= start && node.y <= end)
        .collect();
    RenderWindow::from_nodes(layout, nodes)
}

/// Windowing backed by a per-layout R-tree.
#[derive(Debug, Default)]
pub struct ViewportVirtualizer {
    index: LayoutIndex,
    buffer: f32,
}

impl ViewportVirtualizer {
    /// Index `layout` for repeated windowing.
    pub fn new(layout: &Layout, layout_config: &LayoutConfig, config: &ViewportConfig) -> Self {
        Self {
            index: LayoutIndex::build(layout, layout_config),
            buffer: config.buffer,
        }
    }

    /// Nodes and edges realized for `viewport`.
    ///
    /// `layout` must be the layout this virtualizer was built from.
    pub fn window<'a>(&self, layout: &'a Layout, viewport: &Viewport) -> RenderWindow<'a> {
        let (top, bottom) = viewport.logical_band(self.buffer);
        let nodes = self
            .index
            .in_band(top, bottom)
            .into_iter()
            .filter_map(|slot| layout.nodes.get(slot))
            .collect();
        RenderWindow::from_nodes(layout, nodes)
    }

    /// The complete layout, bypassing virtualization.
    pub fn full<'a>(&self, layout: &'a Layout) -> RenderWindow<'a> {
        RenderWindow::full(layout)
    }

    /// Layout slot of the card under a layout-space point.
    pub fn card_at(&self, x: f32, y: f32) -> Option<usize> {
        self.index.card_at(x, y)
    }

    pub fn buffer(&self) -> f32 {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::tree::{ExpandedSet, OrgNode};
    use proptest::prelude::*;

    const H: f32 = 65.0;

    /// `depth` levels deep, two reports per manager.
    fn binary(depth: usize, prefix: String) -> OrgNode {
        let node = OrgNode::new(prefix.clone(), "Node");
        if depth == 0 {
            return node;
        }
        node.with_children([
            binary(depth - 1, format!("{prefix}l")),
            binary(depth - 1, format!("{prefix}r")),
        ])
    }

    fn sample_layout() -> Layout {
        let roots = vec![binary(7, "n".into())];
        compute_layout(&roots, &ExpandedSet::all(&roots), &LayoutConfig::default())
    }

    #[test]
    fn test_window_without_buffer() {
        let layout = sample_layout();
        let config = LayoutConfig::default();
        // Rows at y = 20, 125, 230, ...; this viewport covers rows 1 and 2 only.
        let window = visible(&layout, &config, 100.0, 150.0, 0.0);
        assert!(!window.nodes.is_empty());
        assert!(window.nodes.iter().all(|node| node.depth == 1 || node.depth == 2));
        assert_eq!(window.nodes.len(), 2 + 4);
    }

    #[test]
    fn test_edges_touch_visible_nodes() {
        let layout = sample_layout();
        let config = LayoutConfig::default();
        let window = visible(&layout, &config, 100.0, 150.0, 0.0);
        let ids: HashSet<&str> = window.nodes.iter().map(|node| node.id()).collect();
        // Root→depth 1, depth 1→2 and depth 2→3 edges: 2 + 4 + 8.
        assert_eq!(window.edges.len(), 14);
        for edge in &window.edges {
            assert!(ids.contains(edge.from_id.as_str()) || ids.contains(edge.to_id.as_str()));
        }
    }

    #[test]
    fn test_zoom_scales_window() {
        let layout = sample_layout();
        let viewport = ViewportConfig {
            buffer: 0.0,
            ..Default::default()
        };
        let virtualizer = ViewportVirtualizer::new(&layout, &LayoutConfig::default(), &viewport);

        // At 50% a 100px-tall viewport spans 200 layout pixels.
        let zoomed = virtualizer.window(&layout, &Viewport::new(0.0, 100.0, 0.5));
        let unzoomed = virtualizer.window(&layout, &Viewport::new(0.0, 200.0, 1.0));
        assert_eq!(zoomed, unzoomed);

        // Scroll offsets are divided too.
        let scrolled = virtualizer.window(&layout, &Viewport::new(105.0, 50.0, 0.5));
        assert!(scrolled.nodes.iter().all(|node| node.depth >= 1));
    }

    #[test]
    fn test_full_view_bypasses_windowing() {
        let layout = sample_layout();
        let virtualizer =
            ViewportVirtualizer::new(&layout, &LayoutConfig::default(), &ViewportConfig::default());
        let full = virtualizer.full(&layout);
        assert_eq!(full.nodes.len(), layout.nodes.len());
        assert_eq!(full.edges.len(), layout.edges.len());
        assert_eq!((full.width, full.height), (layout.width, layout.height));
    }

    #[test]
    fn test_invalid_zoom_falls_back_to_identity() {
        let viewport = Viewport::new(100.0, 200.0, 0.0);
        assert_eq!(viewport.logical_band(10.0), (90.0, 310.0));
    }

    proptest! {
        #[test]
        fn prop_index_matches_linear_scan(
            scroll in 0.0f32..3000.0,
            height in 1.0f32..1200.0,
            buffer in 0.0f32..500.0,
        ) {
            let layout = sample_layout();
            let config = LayoutConfig::default();
            let viewport = ViewportConfig { buffer, ..Default::default() };
            let virtualizer = ViewportVirtualizer::new(&layout, &config, &viewport);
            let indexed = virtualizer.window(&layout, &Viewport::new(scroll, height, 1.0));
            let scanned = visible(&layout, &config, scroll, height, buffer);
            prop_assert_eq!(indexed, scanned);
        }

        #[test]
        fn prop_window_keeps_fully_visible_nodes(
            scroll in 0.0f32..3000.0,
            height in 1.0f32..1200.0,
            buffer in 0.0f32..500.0,
        ) {
            let layout = sample_layout();
            let config = LayoutConfig::default();
            let window = visible(&layout, &config, scroll, height, buffer);
            let ids: HashSet<&str> = window.nodes.iter().map(|node| node.id()).collect();

            prop_assert!(window.nodes.len() <= layout.nodes.len());
            for node in &layout.nodes {
                if node.y >= scroll && node.y + H <= scroll + height {
                    prop_assert!(ids.contains(node.id()));
                }
            }
        }
    }
}
