//! The expanded-node visibility set.
//!
//! Only children of nodes in this set contribute to width and placement.
//! The set is an owned value handed to every layout call, so one pass can
//! never observe another pass's toggles.

use std::collections::HashSet;

use super::node::{OrgNode, PreOrder};

/// Identifiers of nodes whose children are currently visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: HashSet<String>,
}

impl ExpandedSet {
    /// Create an empty set (everything collapsed).
    pub fn new() -> Self {
        Self::default()
    }

    /// A set containing every node of the forest.
    pub fn all(roots: &[OrgNode]) -> Self {
        Self {
            ids: PreOrder::forest(roots).map(|node| node.id().to_string()).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Expand a node. Returns true if it was collapsed before.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Collapse a node. Returns true if it was expanded before.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flip a node's state. Returns the new state (true = expanded).
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Children of `node` that take part in layout.
    #[inline]
    pub fn visible_children<'a>(&self, node: &'a OrgNode) -> &'a [OrgNode] {
        if node.children.is_empty() || !self.contains(node.id()) {
            &[]
        } else {
            &node.children
        }
    }
}

impl FromIterator<String> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
