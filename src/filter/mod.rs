//! Tree pruning for search, department and level filters.
//!
//! Every filter produces a new forest; the input is never modified. Text
//! and department filters keep the full manager chain of every match, so a
//! match is always reachable from a root. The level filter is structural
//! and cuts the tree at a fixed depth regardless of content.

use std::collections::BTreeSet;

use crate::tree::{NodeRecord, OrgNode, PreOrder};

/// The active filter directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Free-text query (case-insensitive substring).
    pub query: String,
    /// Exact department name; `None` keeps every department.
    pub department: Option<String>,
    /// Number of levels to keep; `None` keeps every level.
    pub max_depth: Option<usize>,
}

impl FilterSet {
    /// Check whether a non-blank text query is active.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Check whether any filter would change the tree.
    pub fn is_active(&self) -> bool {
        self.has_query() || self.department.is_some() || self.max_depth.is_some()
    }

    /// Apply all filters: text, then department, then depth.
    pub fn apply(&self, roots: &[OrgNode]) -> Vec<OrgNode> {
        prune(roots, &self.query, self.department.as_deref(), self.max_depth)
    }
}

/// Apply the text, department and depth filters in that order.
pub fn prune(
    roots: &[OrgNode],
    query: &str,
    department: Option<&str>,
    max_depth: Option<usize>,
) -> Vec<OrgNode> {
    let mut pruned = prune_by_query(roots, query);
    if let Some(department) = department.filter(|department| !department.is_empty()) {
        pruned = prune_by_department(&pruned, department);
    }
    if let Some(max_depth) = max_depth {
        pruned = truncate_depth(&pruned, max_depth);
    }
    pruned
}

/// Keep nodes matching `query` plus their ancestors. A blank query keeps everything.
pub fn prune_by_query(roots: &[OrgNode], query: &str) -> Vec<OrgNode> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return roots.to_vec();
    }
    retain_with_ancestors(roots, &|record: &NodeRecord| record.search_blob().contains(&needle))
}

/// Keep nodes of exactly `department` plus their ancestors.
pub fn prune_by_department(roots: &[OrgNode], department: &str) -> Vec<OrgNode> {
    retain_with_ancestors(roots, &|record: &NodeRecord| record.department_name == department)
}

/// Drop every node at level `max_depth` or deeper (roots are level 0).
pub fn truncate_depth(roots: &[OrgNode], max_depth: usize) -> Vec<OrgNode> {
    rebuild(roots, |level| level < max_depth, |_, _| true)
}

fn retain_with_ancestors(
    roots: &[OrgNode],
    matches: &dyn Fn(&NodeRecord) -> bool,
) -> Vec<OrgNode> {
    rebuild(roots, |_| true, |record, children| matches(record) || !children.is_empty())
}

enum Visit<'a> {
    Enter(&'a OrgNode, usize),
    /// All children are rebuilt; they sit in `built` from `mark` on.
    Exit(&'a OrgNode, usize),
}

/// Rebuild a forest bottom-up on an explicit stack.
///
/// Nodes at levels where `descend` is false are dropped with their
/// subtrees. A visited node survives when `keep` accepts its record and
/// its surviving children.
fn rebuild(
    roots: &[OrgNode],
    descend: impl Fn(usize) -> bool,
    keep: impl Fn(&NodeRecord, &[OrgNode]) -> bool,
) -> Vec<OrgNode> {
    let mut built: Vec<OrgNode> = Vec::new();
    let mut stack: Vec<Visit<'_>> = roots.iter().rev().map(|root| Visit::Enter(root, 0)).collect();

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node, level) => {
                if !descend(level) {
                    continue;
                }
                stack.push(Visit::Exit(node, built.len()));
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|child| Visit::Enter(child, level + 1)),
                );
            }
            Visit::Exit(node, mark) => {
                let children = built.split_off(mark);
                if keep(&node.record, &children) {
                    built.push(OrgNode {
                        record: node.record.clone(),
                        children,
                    });
                }
            }
        }
    }
    built
}

/// Sorted, de-duplicated department names of the forest.
pub fn departments(roots: &[OrgNode]) -> Vec<String> {
    PreOrder::forest(roots)
        .map(|node| node.record.department_name.as_str())
        .filter(|department| !department.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Identifiers of nodes that match `query` directly, in pre-order.
pub fn search(roots: &[OrgNode], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    PreOrder::forest(roots)
        .filter(|node| node.record.search_blob().contains(&needle))
        .map(|node| node.id().to_string())
        .collect()
}
