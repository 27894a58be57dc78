//! OrgGraph - petgraph index over a hierarchy snapshot.
//!
//! The snapshot arrives as nested trees. Structural questions (who manages
//! whom, is X below Y, how deep is the org) are answered against a
//! `StableGraph` built once per snapshot, with a map from the stable string
//! identifier to the petgraph `NodeIndex`.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::node::OrgNode;

/// Manager → report edges over the snapshot's node identifiers.
#[derive(Debug, Clone, Default)]
pub struct OrgGraph {
    /// Nodes store their identifier; edges point from manager to report.
    graph: StableGraph<String, (), Directed>,

    /// Map from identifier to petgraph NodeIndex
    id_to_index: HashMap<String, NodeIndex>,

    /// Depth of each node (root = 0), indexed like the graph
    depths: HashMap<NodeIndex, usize>,

    /// Identifiers of the top-level trees, in snapshot order
    roots: Vec<String>,
}

impl OrgGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a forest.
    ///
    /// Duplicate identifiers violate the snapshot contract; the first
    /// occurrence wins the id mapping and the duplicate is logged.
    pub fn from_forest(roots: &[OrgNode]) -> Self {
        let mut index = Self::new();
        let mut stack: Vec<(&OrgNode, Option<NodeIndex>, usize)> =
            roots.iter().rev().map(|root| (root, None, 0)).collect();

        while let Some((node, parent, depth)) = stack.pop() {
            let id = node.id().to_string();
            let nx = index.graph.add_node(id.clone());
            index.depths.insert(nx, depth);

            if index.id_to_index.contains_key(&id) {
                tracing::warn!(id = %id, "duplicate node identifier in hierarchy snapshot");
            } else {
                index.id_to_index.insert(id.clone(), nx);
            }

            match parent {
                Some(parent) => {
                    index.graph.add_edge(parent, nx, ());
                }
                None => index.roots.push(id),
            }

            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(nx), depth + 1)),
            );
        }

        index
    }

    /// Number of indexed nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of manager → report edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check whether an identifier belongs to the snapshot.
    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Identifiers of the top-level trees.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Manager of a node, or None for roots and unknown ids.
    pub fn parent(&self, id: &str) -> Option<&str> {
        let &nx = self.id_to_index.get(id)?;
        self.graph
            .neighbors_directed(nx, Direction::Incoming)
            .next()
            .map(|parent| self.graph[parent].as_str())
    }

    /// Depth of a node (root = 0).
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.id_to_index
            .get(id)
            .and_then(|nx| self.depths.get(nx))
            .copied()
    }

    /// Number of hierarchy levels (0 for an empty snapshot).
    pub fn levels(&self) -> usize {
        self.depths.values().max().map_or(0, |deepest| deepest + 1)
    }

    /// Chain of managers from the direct manager up to the root.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let Some(&start) = self.id_to_index.get(id) else {
            return chain;
        };

        let mut current = start;
        while let Some(parent) = self
            .graph
            .neighbors_directed(current, Direction::Incoming)
            .next()
        {
            chain.push(self.graph[parent].as_str());
            current = parent;
        }
        chain
    }

    /// Check whether `candidate` lies in the subtree below `ancestor`.
    ///
    /// A node is not its own descendant. Unknown identifiers are never
    /// descendants of anything.
    pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
        let (Some(&start), Some(&target)) =
            (self.id_to_index.get(ancestor), self.id_to_index.get(candidate))
        else {
            return false;
        };
        if start == target {
            return false;
        }

        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(nx) = dfs.next(&self.graph) {
            if nx == target {
                return true;
            }
        }
        false
    }

    /// Number of nodes below `id` (excluding itself).
    pub fn descendant_count(&self, id: &str) -> usize {
        let Some(&start) = self.id_to_index.get(id) else {
            return 0;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut count = 0;
        while dfs.next(&self.graph).is_some() {
            count += 1;
        }
        count - 1
    }
}
