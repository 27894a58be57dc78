//! Reparent validation.
//!
//! Dropping a card onto another asks the data collaborator to change the
//! dragged node's manager. Before that request leaves the engine, the move
//! is checked against the current snapshot: a node can never be moved
//! under itself or under one of its own reports, which would cut a cycle
//! into the hierarchy.

mod drag;

use serde::Serialize;

use crate::tree::OrgGraph;

pub use drag::{DragSession, DragState, DropOutcome};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Dropped onto itself.
    SelfDrop,
    /// Dropped onto one of its own (transitive) reports.
    OntoDescendant,
    /// The dragged node is not part of the current snapshot.
    UnknownNode,
}

/// A legal manager change, ready for the external data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReparentRequest {
    pub dragged_id: String,
    /// New manager, or `None` to detach the node into a root.
    pub new_manager_id: Option<String>,
}

/// Check a proposed move of `dragged` under `target`.
pub fn check_reparent(
    graph: &OrgGraph,
    dragged: &str,
    target: &str,
) -> Result<ReparentRequest, Rejection> {
    if dragged == target {
        return Err(Rejection::SelfDrop);
    }
    if !graph.contains(dragged) {
        return Err(Rejection::UnknownNode);
    }
    if graph.is_descendant(dragged, target) {
        return Err(Rejection::OntoDescendant);
    }
    Ok(ReparentRequest {
        dragged_id: dragged.to_string(),
        new_manager_id: Some(target.to_string()),
    })
}

/// Check a proposed detach of `dragged` to the top level.
pub fn check_detach(graph: &OrgGraph, dragged: &str) -> Result<ReparentRequest, Rejection> {
    if !graph.contains(dragged) {
        return Err(Rejection::UnknownNode);
    }
    Ok(ReparentRequest {
        dragged_id: dragged.to_string(),
        new_manager_id: None,
    })
}

/// Whether moving `dragged` under `target` keeps the hierarchy acyclic.
pub fn can_reparent(graph: &OrgGraph, dragged: &str, target: &str) -> bool {
    check_reparent(graph, dragged, target).is_ok()
}
