//! Drag-and-drop gesture state machine.
//!
//! ```text
//! Idle ──start──▶ Dragging ──hover(other)──▶ Hovering
//!                    ▲  ◀──leave / hover(self)──┘
//!                    └─ drop / cancel ──▶ Idle
//! ```

use super::{Rejection, ReparentRequest, check_detach, check_reparent};
use crate::tree::OrgGraph;

/// Where the gesture currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// A card is being dragged with no valid drop target under it.
    Dragging { dragged: String },
    /// A card is being dragged over another card.
    Hovering { dragged: String, target: String },
}

/// Result of releasing a dragged card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Legal(ReparentRequest),
    Illegal(Rejection),
    /// Nothing was being dragged.
    NotDragging,
}

/// Tracks one drag gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The card being dragged, if any.
    pub fn dragged(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { dragged } | DragState::Hovering { dragged, .. } => Some(dragged),
        }
    }

    /// The card currently highlighted as a drop target, if any.
    pub fn hover_target(&self) -> Option<&str> {
        match &self.state {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Begin dragging `id`, abandoning any previous gesture.
    pub fn start(&mut self, id: impl Into<String>) {
        self.state = DragState::Dragging { dragged: id.into() };
    }

    /// Pointer moved over `id`. Hovering the dragged card itself shows no target.
    pub fn hover(&mut self, id: &str) {
        let Some(dragged) = self.dragged().map(str::to_string) else {
            return;
        };
        self.state = if dragged == id {
            DragState::Dragging { dragged }
        } else {
            DragState::Hovering {
                dragged,
                target: id.to_string(),
            }
        };
    }

    /// Pointer left the hovered card.
    pub fn leave(&mut self) {
        if let DragState::Hovering { dragged, .. } = std::mem::take(&mut self.state) {
            self.state = DragState::Dragging { dragged };
        }
    }

    /// Abort the gesture.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Release over `target`, validating against `graph`. Always ends idle.
    pub fn drop_on(&mut self, graph: &OrgGraph, target: &str) -> DropOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DropOutcome::NotDragging,
            DragState::Dragging { dragged } | DragState::Hovering { dragged, .. } => {
                match check_reparent(graph, &dragged, target) {
                    Ok(request) => DropOutcome::Legal(request),
                    Err(rejection) => DropOutcome::Illegal(rejection),
                }
            }
        }
    }

    /// Release over empty canvas: detach the dragged card to the top level.
    pub fn drop_to_root(&mut self, graph: &OrgGraph) -> DropOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DropOutcome::NotDragging,
            DragState::Dragging { dragged } | DragState::Hovering { dragged, .. } => {
                match check_detach(graph, &dragged) {
                    Ok(request) => DropOutcome::Legal(request),
                    Err(rejection) => DropOutcome::Illegal(rejection),
                }
            }
        }
    }
}
