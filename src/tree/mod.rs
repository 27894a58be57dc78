//! Hierarchy data structures.
//!
//! The snapshot itself is a forest of owned [`OrgNode`] trees. Alongside it
//! live the explicit [`ExpandedSet`] and an [`OrgGraph`] petgraph index used
//! for structural queries such as descendant checks.

mod expanded;
mod graph;
mod node;

pub use expanded::ExpandedSet;
pub use graph::OrgGraph;
pub use node::{HierarchySnapshot, NodeRecord, OrgNode, PreOrder};
