//! Hierarchy records and the snapshot payload.
//!
//! An [`OrgNode`] is one position in the organization: a flat
//! [`NodeRecord`] plus its ordered direct reports. The external data
//! collaborator delivers a [`HierarchySnapshot`], a forest of these trees,
//! which is treated as immutable for the duration of a pipeline pass.

use serde::{Deserialize, Deserializer, Serialize};

/// The scalar fields of a hierarchy node, without its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    /// Stable unique identifier. Integer ids in the payload are normalized to strings.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position_title: String,
    pub department_name: String,
    pub work_email: String,
    /// Display name of the current manager (empty for roots).
    pub manager_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NodeRecord {
    /// Create a record with only an identifier and display name set.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            is_active: true,
            ..Default::default()
        }
    }

    /// Display name: `full_name`, or `"first last"` when it is empty.
    pub fn display_name(&self) -> String {
        if !self.full_name.trim().is_empty() {
            return self.full_name.clone();
        }
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Lowercased search haystack built from every non-empty text field.
    pub(crate) fn search_blob(&self) -> String {
        [
            self.full_name.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.position_title.as_str(),
            self.department_name.as_str(),
            self.employee_number.as_str(),
            self.work_email.as_str(),
            self.manager_name.as_str(),
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// One node of the hierarchy together with its ordered direct reports.
///
/// `Clone`, `PartialEq` and `Drop` walk the tree with explicit stacks, so a
/// hierarchy of any depth can be copied, compared and released on the
/// small wasm call stack.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OrgNode {
    #[serde(flatten)]
    pub record: NodeRecord,
    #[serde(default)]
    pub children: Vec<OrgNode>,
}

impl Clone for OrgNode {
    fn clone(&self) -> Self {
        // Post-order: a node is rebuilt once all of its children are.
        let mut built: Vec<OrgNode> = Vec::new();
        let mut stack = vec![(self, false)];
        while let Some((node, children_done)) = stack.pop() {
            if children_done {
                let children = built.split_off(built.len() - node.children.len());
                built.push(OrgNode {
                    record: node.record.clone(),
                    children,
                });
            } else {
                stack.push((node, true));
                stack.extend(node.children.iter().rev().map(|child| (child, false)));
            }
        }
        built.pop().unwrap_or_default()
    }
}

impl PartialEq for OrgNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if left.record != right.record || left.children.len() != right.children.len() {
                return false;
            }
            stack.extend(left.children.iter().zip(&right.children));
        }
        true
    }
}

impl Drop for OrgNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl OrgNode {
    /// Create a leaf node.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            record: NodeRecord::new(id, full_name),
            children: Vec::new(),
        }
    }

    /// Builder: set the position title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.record.position_title = title.into();
        self
    }

    /// Builder: set the department name.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.record.department_name = department.into();
        self
    }

    /// Builder: append direct reports, filling in their manager name.
    pub fn with_children(mut self, children: impl IntoIterator<Item = OrgNode>) -> Self {
        let manager = self.record.display_name();
        self.children.extend(children.into_iter().map(|mut child| {
            if child.record.manager_name.is_empty() {
                child.record.manager_name = manager.clone();
            }
            child
        }));
        self
    }

    /// The node identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Check whether the node has any direct reports.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterate over this node and all descendants in pre-order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Pre-order walk over a forest, driven by an explicit stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a OrgNode>,
}

impl<'a> PreOrder<'a> {
    /// Walk every tree of `roots` in order.
    pub fn forest(roots: &'a [OrgNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a OrgNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The hierarchy payload delivered by the external fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchySnapshot {
    #[serde(default)]
    pub hierarchy: Vec<OrgNode>,
    /// Total node count reported by the source (computed when absent).
    #[serde(default)]
    pub total_employees: Option<usize>,
    /// Number of hierarchy levels reported by the source (computed when absent).
    #[serde(default)]
    pub levels: Option<usize>,
}

impl HierarchySnapshot {
    /// Wrap a forest, leaving the aggregate counts to be computed.
    pub fn new(hierarchy: Vec<OrgNode>) -> Self {
        Self {
            hierarchy,
            total_employees: None,
            levels: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(value) => value.to_string(),
        RawId::Float(value) if value.fract() == 0.0 => format!("{value:.0}"),
        RawId::Float(value) => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut record = NodeRecord::new("1", "");
        record.first_name = "Ada".into();
        record.last_name = "Lovelace".into();
        assert_eq!(record.display_name(), "Ada Lovelace");

        record.full_name = "Countess Lovelace".into();
        assert_eq!(record.display_name(), "Countess Lovelace");
    }

    #[test]
    fn test_search_blob_skips_empty_fields() {
        let node = OrgNode::new("7", "Grace Hopper")
            .with_title("Rear Admiral")
            .with_department("Navy");
        assert_eq!(node.record.search_blob(), "grace hopper rear admiral navy");
    }

    #[test]
    fn test_with_children_sets_manager_name() {
        let root = OrgNode::new("1", "Boss").with_children([OrgNode::new("2", "Report")]);
        assert_eq!(root.children[0].record.manager_name, "Boss");
    }

    #[test]
    fn test_pre_order_walk() {
        let tree = OrgNode::new("a", "A").with_children([
            OrgNode::new("b", "B").with_children([OrgNode::new("c", "C")]),
            OrgNode::new("d", "D"),
        ]);
        let ids: Vec<_> = tree.iter().map(OrgNode::id).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        let forest = [OrgNode::new("x", "X"), tree];
        let ids: Vec<_> = PreOrder::forest(&forest).map(OrgNode::id).collect();
        assert_eq!(ids, ["x", "a", "b", "c", "d"]);
    }

    /// A single chain `depth` levels deep, built without recursion.
    fn chain(depth: usize) -> OrgNode {
        let mut node = OrgNode::new("n0", "Bottom");
        for i in 1..depth {
            node = OrgNode {
                record: NodeRecord::new(format!("n{i}"), "Link"),
                children: vec![node],
            };
        }
        node
    }

    #[test]
    fn test_clone_and_eq() {
        let tree = OrgNode::new("a", "A").with_children([
            OrgNode::new("b", "B").with_children([OrgNode::new("c", "C")]),
            OrgNode::new("d", "D"),
        ]);
        let copy = tree.clone();
        assert_eq!(copy, tree);
        let ids: Vec<_> = copy.iter().map(OrgNode::id).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        let mut changed = tree.clone();
        changed.children[0].children[0].record.full_name = "Changed".into();
        assert_ne!(changed, tree);

        let mut pruned = tree.clone();
        pruned.children[0].children.clear();
        assert_ne!(pruned, tree);
    }

    #[test]
    fn test_deep_chain_clone_compare_and_drop() {
        // 1 MiB is about what a wasm module gets.
        let handle = std::thread::Builder::new()
            .stack_size(1 << 20)
            .spawn(|| {
                let tree = chain(100_000);
                let copy = tree.clone();
                assert!(copy == tree);
                assert_eq!(copy.iter().count(), 100_000);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_snapshot_deserializes_numeric_ids() {
        let json = r#"{
            "hierarchy": [{
                "id": 1,
                "full_name": "Root",
                "department_name": "Exec",
                "children": [{ "id": "2", "full_name": "Child" }]
            }],
            "total_employees": 2,
            "levels": 2
        }"#;
        let snapshot: HierarchySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.hierarchy[0].id(), "1");
        assert_eq!(snapshot.hierarchy[0].children[0].id(), "2");
        assert!(snapshot.hierarchy[0].record.is_active);
        assert_eq!(snapshot.total_employees, Some(2));
    }
}
