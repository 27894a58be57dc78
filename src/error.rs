//! Error type for the org chart engine.

use thiserror::Error;

/// Failures surfaced by the engine and its collaborators.
///
/// Illegal drag-and-drop gestures are not errors; they are refused quietly
/// by the reparent guard.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrgChartError {
    /// The external hierarchy fetch failed.
    #[error("failed to load organization hierarchy: {0}")]
    Fetch(String),

    /// The external manager update failed.
    #[error("failed to update manager: {0}")]
    Update(String),

    /// A load finished after a newer one had already been applied.
    #[error("load {ticket} superseded by load {current}")]
    StaleLoad { ticket: u64, current: u64 },

    /// A payload from the host could not be decoded.
    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),
}

pub type Result<T, E = OrgChartError> = std::result::Result<T, E>;
