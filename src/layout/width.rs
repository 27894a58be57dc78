//! Subtree width computation.
//!
//! Widths are computed bottom-up with an explicit post-order stack, so
//! arbitrarily deep hierarchies do not exhaust the (small) wasm call stack.
//! Results are memoized per node identifier for the duration of one pass;
//! every pass builds a fresh [`SubtreeWidths`].

use std::collections::HashMap;

use super::{ChildArrangement, LayoutConfig};
use crate::tree::{ExpandedSet, OrgNode};

/// Memoized subtree widths for one layout pass.
#[derive(Debug, Clone)]
pub struct SubtreeWidths {
    widths: HashMap<String, f32>,
    /// Width of a single card, the fallback for nodes that were never measured.
    node_width: f32,
    horizontal_gap: f32,
}

enum Visit<'a> {
    Enter(&'a OrgNode, usize),
    Exit(&'a OrgNode, usize),
}

impl SubtreeWidths {
    /// Measure every visible subtree of the forest.
    pub fn compute(roots: &[OrgNode], expanded: &ExpandedSet, config: &LayoutConfig) -> Self {
        let mut memo = Self {
            widths: HashMap::new(),
            node_width: config.node_width,
            horizontal_gap: config.horizontal_gap,
        };

        let mut stack: Vec<Visit<'_>> =
            roots.iter().rev().map(|root| Visit::Enter(root, 0)).collect();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(node, depth) => {
                    if memo.widths.contains_key(node.id()) {
                        continue;
                    }
                    let children = expanded.visible_children(node);
                    match config.arrangement(depth, children.len()) {
                        // Stacked children hang below their manager and never widen it;
                        // they are not measured and fall back to a single card.
                        ChildArrangement::Leaf | ChildArrangement::Stacked => {
                            memo.widths.insert(node.id().to_string(), config.node_width);
                        }
                        ChildArrangement::Split { .. } | ChildArrangement::Row => {
                            stack.push(Visit::Exit(node, depth));
                            stack.extend(
                                children
                                    .iter()
                                    .rev()
                                    .map(|child| Visit::Enter(child, depth + 1)),
                            );
                        }
                    }
                }
                Visit::Exit(node, depth) => {
                    let children = expanded.visible_children(node);
                    let span = match config.arrangement(depth, children.len()) {
                        ChildArrangement::Split { first_row } => {
                            let (row1, row2) = children.split_at(first_row);
                            memo.row_width(row1).max(memo.row_width(row2))
                        }
                        _ => memo.row_width(children),
                    };
                    memo.widths
                        .insert(node.id().to_string(), span.max(config.node_width));
                }
            }
        }

        memo
    }

    /// Width of a node's visible subtree; a single card if it was never measured.
    #[inline]
    pub fn get(&self, id: &str) -> f32 {
        self.widths.get(id).copied().unwrap_or(self.node_width)
    }

    /// Summed widths of `row` laid side by side, gaps included.
    pub fn row_width(&self, row: &[OrgNode]) -> f32 {
        if row.is_empty() {
            return 0.0;
        }
        let cards: f32 = row.iter().map(|node| self.get(node.id())).sum();
        cards + (row.len() - 1) as f32 * self.horizontal_gap
    }

    /// Number of measured nodes.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}
