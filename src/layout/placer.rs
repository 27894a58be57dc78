//! Absolute node placement.
//!
//! Consumes the widths from [`SubtreeWidths`] and walks the forest
//! top-down on an explicit work stack. Each node is centered inside the
//! horizontal band its subtree reserved; children are placed according to
//! the node's [`ChildArrangement`], and every placement records one elbow
//! [`Edge`].

use std::collections::HashSet;

use super::types::{Edge, Layout, PositionedNode};
use super::{ChildArrangement, LayoutConfig, SubtreeWidths};
use crate::tree::{ExpandedSet, OrgNode};

/// Single-use placement pass.
pub struct NodePlacer<'a> {
    config: &'a LayoutConfig,
    expanded: &'a ExpandedSet,
    widths: &'a SubtreeWidths,
    nodes: Vec<PositionedNode>,
    edges: Vec<Edge>,
    /// Lowest y reached by each placed subtree so far, indexed by slot.
    bottoms: Vec<f32>,
    /// Manager slot of each placed node.
    parents: Vec<Option<usize>>,
    /// Depths that already have a node (for the level label).
    labelled_depths: HashSet<usize>,
    max_x: f32,
    max_y: f32,
}

/// One unit of pending placement work.
enum Step<'n> {
    /// Place a node and schedule its children.
    Place {
        node: &'n OrgNode,
        parent: Option<usize>,
        left_bound: f32,
        depth: usize,
        top_y: f32,
    },
    /// Row 1 of a split is placed; lay out row 2 below its lowest subtree.
    SecondRow {
        parent: usize,
        row: &'n [OrgNode],
        left: f32,
        depth: usize,
    },
    /// A subtree is complete; fold its bottom into the manager's.
    Finish { slot: usize },
}

impl<'a> NodePlacer<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        expanded: &'a ExpandedSet,
        widths: &'a SubtreeWidths,
    ) -> Self {
        Self {
            config,
            expanded,
            widths,
            nodes: Vec::new(),
            edges: Vec::new(),
            bottoms: Vec::new(),
            parents: Vec::new(),
            labelled_depths: HashSet::new(),
            max_x: 0.0,
            max_y: 0.0,
        }
    }

    /// Place every root left-to-right, separated by a double gap, and
    /// finish the layout with padded bounds.
    pub fn place_forest(mut self, roots: &[OrgNode]) -> Layout {
        let mut root_x = self.config.outer_padding_x;
        let root_y = self.config.outer_padding_y;

        for root in roots {
            self.place(root, root_x, root_y);
            root_x += self.widths.get(root.id()) + self.config.horizontal_gap * 2.0;
        }

        Layout {
            width: (self.max_x + self.config.outer_padding_x).max(self.config.min_width),
            height: (self.max_y + self.config.outer_padding_y).max(self.config.min_height),
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    /// Place the tree rooted at `root` with its band starting at `left_bound`.
    ///
    /// Nodes are emitted in pre-order using an explicit work stack. Returns
    /// the root's slot in the output and the lowest y reached by its subtree.
    pub fn place(&mut self, root: &OrgNode, left_bound: f32, top_y: f32) -> (usize, f32) {
        let root_slot = self.nodes.len();
        let mut stack = vec![Step::Place {
            node: root,
            parent: None,
            left_bound,
            depth: 0,
            top_y,
        }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Place {
                    node,
                    parent,
                    left_bound,
                    depth,
                    top_y,
                } => self.place_node(&mut stack, node, parent, left_bound, depth, top_y),
                Step::SecondRow {
                    parent,
                    row,
                    left,
                    depth,
                } => {
                    // Only row 1 has been folded into the manager's bottom so far.
                    let top = self.bottoms[parent] + self.config.vertical_gap;
                    self.schedule_row(&mut stack, parent, row, left, depth, top);
                }
                Step::Finish { slot } => {
                    if let Some(parent) = self.parents[slot] {
                        self.bottoms[parent] = self.bottoms[parent].max(self.bottoms[slot]);
                    }
                }
            }
        }

        (root_slot, self.bottoms.get(root_slot).copied().unwrap_or(top_y))
    }

    fn place_node<'n>(
        &mut self,
        stack: &mut Vec<Step<'n>>,
        node: &'n OrgNode,
        parent: Option<usize>,
        left_bound: f32,
        depth: usize,
        top_y: f32,
    ) {
        let config = self.config;
        let subtree_width = self.widths.get(node.id());
        let x = left_bound + (subtree_width - config.node_width) / 2.0;
        let y = top_y;

        let slot = self.nodes.len();
        self.nodes.push(PositionedNode {
            record: node.record.clone(),
            child_count: node.children.len(),
            x,
            y,
            depth,
            subtree_width,
            first_at_depth: self.labelled_depths.insert(depth),
        });
        self.bottoms.push(y + config.node_height);
        self.parents.push(parent);
        if let Some(parent) = parent {
            self.push_edge(parent, slot);
        }

        self.max_x = self.max_x.max(left_bound + subtree_width);
        self.max_y = self.max_y.max(y + config.node_height);

        // Children are scheduled in reverse behind this node's Finish step,
        // so they pop in order and complete before it.
        stack.push(Step::Finish { slot });

        let children = self.expanded.visible_children(node);
        let below = y + config.row_height();
        match config.arrangement(depth, children.len()) {
            ChildArrangement::Leaf => {}
            ChildArrangement::Stacked => {
                for (i, child) in children.iter().enumerate().rev() {
                    stack.push(Step::Place {
                        node: child,
                        parent: Some(slot),
                        left_bound: x,
                        depth: depth + 1,
                        top_y: below + i as f32 * config.row_height(),
                    });
                }
            }
            ChildArrangement::Split { first_row } => {
                let (row1, row2) = children.split_at(first_row);
                let row1_left = left_bound + (subtree_width - self.widths.row_width(row1)) / 2.0;
                let row2_left = left_bound + (subtree_width - self.widths.row_width(row2)) / 2.0;

                // Row 2 clears whatever row 1's subtrees produced. Its edges run
                // straight from the manager and may cross row 1.
                stack.push(Step::SecondRow {
                    parent: slot,
                    row: row2,
                    left: row2_left,
                    depth: depth + 1,
                });
                self.schedule_row(stack, slot, row1, row1_left, depth + 1, below);
            }
            ChildArrangement::Row => {
                self.schedule_row(stack, slot, children, left_bound, depth + 1, below);
            }
        }
    }

    /// Schedule `row` side by side from `left`, first child on top of the stack.
    fn schedule_row<'n>(
        &self,
        stack: &mut Vec<Step<'n>>,
        parent: usize,
        row: &'n [OrgNode],
        left: f32,
        depth: usize,
        top_y: f32,
    ) {
        let mut child_left = left;
        let mut steps = Vec::with_capacity(row.len());
        for child in row {
            steps.push(Step::Place {
                node: child,
                parent: Some(parent),
                left_bound: child_left,
                depth,
                top_y,
            });
            child_left += self.widths.get(child.id()) + self.config.horizontal_gap;
        }
        stack.extend(steps.into_iter().rev());
    }

    /// Record the manager → report edge, bottom-center to top-center.
    fn push_edge(&mut self, parent: usize, child: usize) {
        let half = self.config.node_width / 2.0;
        let from = &self.nodes[parent];
        let to = &self.nodes[child];
        self.edges.push(Edge {
            from_id: from.record.id.clone(),
            to_id: to.record.id.clone(),
            from_x: from.x + half,
            from_y: from.y + self.config.node_height,
            to_x: to.x + half,
            to_y: to.y,
        });
    }
}
