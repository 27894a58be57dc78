//! Org Chart - WASM Module
//!
//! This module provides the layout and viewport-virtualization engine for
//! the organization chart. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: Hierarchy records, the expanded-set and a petgraph index
//! - `filter`: Search, department and level pruning
//! - `layout`: Subtree widths and card placement
//! - `viewport`: R-tree windowing and zoom
//! - `reparent`: Drag-and-drop state machine and cycle guard
//! - `engine`: The stateful pipeline tying everything together

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod engine;
pub mod error;
pub mod filter;
pub mod layout;
pub mod reparent;
pub mod tree;
pub mod viewport;

use engine::{EngineConfig, LoadTicket, OrgChartEngine};
use error::OrgChartError;
use layout::Edge;
use tree::HierarchySnapshot;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the org chart engine.
///
/// This struct wraps the internal OrgChartEngine and provides the public
/// API exposed to JavaScript.
#[wasm_bindgen]
pub struct OrgChartWasm {
    engine: OrgChartEngine,
}

#[wasm_bindgen]
impl OrgChartWasm {
    /// Create an engine. `config` may be `undefined` or a partial
    /// `{ layout, viewport, zoom }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OrgChartWasm, JsError> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            from_js(config)?
        };
        Ok(Self {
            engine: OrgChartEngine::new(config),
        })
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the hierarchy with a `{ hierarchy, total_employees, levels }` payload.
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&mut self, payload: JsValue) -> Result<(), JsError> {
        let snapshot: HierarchySnapshot = from_js(payload)?;
        self.engine.load_snapshot(snapshot);
        Ok(())
    }

    /// Start an asynchronous load and return its ticket.
    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(&mut self) -> f64 {
        self.engine.begin_load().id() as f64
    }

    /// Complete a load started with `beginLoad`.
    ///
    /// Results of superseded loads are ignored; the error says so.
    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(&mut self, ticket: f64, payload: JsValue) -> Result<(), JsError> {
        let ticket = LoadTicket::from(ticket as u64);
        let snapshot = from_js::<HierarchySnapshot>(payload);
        self.engine.finish_load(ticket, snapshot).map_err(|err| {
            report(&err);
            err.into()
        })
    }

    /// Report that the fetch behind `ticket` failed.
    ///
    /// Returns false when the ticket was superseded or never issued.
    #[wasm_bindgen(js_name = failLoad)]
    pub fn fail_load(&mut self, ticket: f64, message: String) -> bool {
        match fail_ticket(&mut self.engine, LoadTicket::from(ticket as u64), message) {
            Some(err) => {
                report(&err);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.engine.is_loading()
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[wasm_bindgen(js_name = setSearch)]
    pub fn set_search(&mut self, query: String) {
        self.engine.set_search(query);
    }

    #[wasm_bindgen(js_name = setDepartment)]
    pub fn set_department(&mut self, department: Option<String>) {
        self.engine.set_department(department);
    }

    #[wasm_bindgen(js_name = setMaxDepth)]
    pub fn set_max_depth(&mut self, max_depth: Option<u32>) {
        self.engine.set_max_depth(max_depth.map(|depth| depth as usize));
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Expand or collapse a card. Returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.engine.toggle(id)
    }

    #[wasm_bindgen(js_name = expandAll)]
    pub fn expand_all(&mut self) {
        self.engine.expand_all();
    }

    #[wasm_bindgen(js_name = collapseAll)]
    pub fn collapse_all(&mut self) {
        self.engine.collapse_all();
    }

    #[wasm_bindgen(js_name = isExpanded)]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.engine.is_expanded(id)
    }

    /// Expand the manager chain of a card so it becomes visible.
    pub fn reveal(&mut self, id: &str) -> Result<(), JsError> {
        Ok(self.engine.reveal(id)?)
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, scroll_top: f32, container_height: f32) {
        self.engine.set_viewport(scroll_top, container_height);
    }

    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&mut self, scroll_top: f32) {
        self.engine.set_scroll(scroll_top);
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f32 {
        self.engine.zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f32 {
        self.engine.zoom_out()
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self) -> f32 {
        self.engine.reset_zoom()
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, factor: f32) -> f32 {
        self.engine.set_zoom(factor)
    }

    pub fn zoom(&self) -> f32 {
        self.engine.zoom().factor()
    }

    #[wasm_bindgen(js_name = zoomPercent)]
    pub fn zoom_percent(&self) -> u32 {
        self.engine.zoom().percent()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Cards and edges to draw for the current scroll and zoom, plus the
    /// full canvas size: `{ nodes, edges, width, height }`.
    #[wasm_bindgen(js_name = renderWindow)]
    pub fn render_window(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.render_window())
    }

    /// Every card and edge, for PDF/image export.
    #[wasm_bindgen(js_name = exportView)]
    pub fn export_view(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.export_view())
    }

    /// Elbow routes of the windowed edges.
    ///
    /// Returns eight floats per edge: `[fx, fy, fx, my, tx, my, tx, ty, ...]`.
    #[wasm_bindgen(js_name = edgeGeometry)]
    pub fn edge_geometry(&mut self) -> Float32Array {
        let window = self.engine.render_window();
        Float32Array::from(&elbow_buffer(&window.edges)[..])
    }

    #[wasm_bindgen(js_name = canvasWidth)]
    pub fn canvas_width(&mut self) -> f32 {
        self.engine.layout().width
    }

    #[wasm_bindgen(js_name = canvasHeight)]
    pub fn canvas_height(&mut self) -> f32 {
        self.engine.layout().height
    }

    /// Identifier of the card under a layout-space point.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&mut self, x: f32, y: f32) -> Option<String> {
        self.engine.node_at(x, y).map(|node| node.id().to_string())
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: &str) {
        self.engine.drag_start(id);
    }

    #[wasm_bindgen(js_name = dragHover)]
    pub fn drag_hover(&mut self, id: &str) {
        self.engine.drag_hover(id);
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.engine.drag_leave();
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) {
        self.engine.drag_cancel();
    }

    /// Card currently highlighted as a drop target.
    #[wasm_bindgen(js_name = hoverTarget)]
    pub fn hover_target(&self) -> Option<String> {
        self.engine.drag_session().hover_target().map(str::to_string)
    }

    /// Drop onto `target`. Returns `{ dragged_id, new_manager_id }` or
    /// `undefined` when the move is refused.
    #[wasm_bindgen(js_name = dropOn)]
    pub fn drop_on(&mut self, target: &str) -> Result<JsValue, JsError> {
        match self.engine.drop_on(target) {
            Some(request) => to_js(&request),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Drop on empty canvas, detaching the dragged card into a root.
    #[wasm_bindgen(js_name = dropToRoot)]
    pub fn drop_to_root(&mut self) -> Result<JsValue, JsError> {
        match self.engine.drop_to_root() {
            Some(request) => to_js(&request),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Report the outcome of a manager update; `error` is unset on success.
    ///
    /// Returns true when the hierarchy must be reloaded.
    #[wasm_bindgen(js_name = finishReparent)]
    pub fn finish_reparent(&mut self, error: Option<String>) -> bool {
        let result = match error {
            None => Ok(()),
            Some(message) => {
                let err = OrgChartError::Update(message);
                report(&err);
                Err(err)
            }
        };
        self.engine.finish_reparent(result)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn departments(&self) -> Vec<String> {
        self.engine.departments()
    }

    /// `{ total_employees, levels }`.
    pub fn stats(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.stats())
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.engine.last_error().map(ToString::to_string)
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&mut self) {
        self.engine.clear_error();
    }
}

/// Flatten elbow routes into `[fx, fy, fx, my, tx, my, tx, ty, ...]`.
fn elbow_buffer(edges: &[&Edge]) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(edges.len() * 8);
    for edge in edges {
        for (x, y) in edge.elbow() {
            buffer.push(x);
            buffer.push(y);
        }
    }
    buffer
}

// Flattened records serialize as maps; emit them as plain objects.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsError::new(&err.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, OrgChartError> {
    serde_wasm_bindgen::from_value(value).map_err(|err| OrgChartError::Decode(err.to_string()))
}

/// Record a failed fetch. `None` when the ticket no longer applies.
fn fail_ticket(
    engine: &mut OrgChartEngine,
    ticket: LoadTicket,
    message: String,
) -> Option<OrgChartError> {
    match engine.finish_load(ticket, Err(OrgChartError::Fetch(message))) {
        Err(err @ OrgChartError::Fetch(_)) => Some(err),
        Err(_) | Ok(()) => None,
    }
}

fn report(err: &OrgChartError) {
    web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::tree::OrgNode;

    /// The pipeline behind `edgeGeometry`, without wasm_bindgen JS types.
    #[test]
    fn test_engine_window_to_edge_geometry() {
        let mut engine = OrgChartEngine::default();
        engine.load_snapshot(HierarchySnapshot::new(vec![OrgNode::new("1", "Root").with_children([
            OrgNode::new("2", "Left"),
            OrgNode::new("3", "Right"),
        ])]));

        let window = engine.render_window();
        assert_eq!(window.edges.len(), 2);

        let buffer = elbow_buffer(&window.edges);
        assert_eq!(buffer.len(), 16);

        // Root is centered over two 200px cards: x = 20 + (412 - 200) / 2.
        let parent_x = 126.0 + 100.0;
        let (parent_bottom, child_top) = (20.0 + 65.0, 125.0);
        let mid = parent_bottom + (child_top - parent_bottom) / 2.0;
        assert_eq!(
            &buffer[..8],
            &[parent_x, parent_bottom, parent_x, mid, 120.0, mid, 120.0, child_top]
        );
    }

    #[test]
    fn test_fail_ticket_only_for_live_loads() {
        let mut engine = OrgChartEngine::default();
        assert!(fail_ticket(&mut engine, LoadTicket::from(0), "offline".into()).is_none());
        assert!(fail_ticket(&mut engine, LoadTicket::from(7), "offline".into()).is_none());
        assert!(engine.last_error().is_none());

        let first = engine.begin_load();
        let second = engine.begin_load();
        assert!(fail_ticket(&mut engine, second, "offline".into()).is_some());
        assert!(fail_ticket(&mut engine, first, "late".into()).is_none());
        assert_eq!(
            engine.last_error(),
            Some(&OrgChartError::Fetch("offline".into()))
        );
    }

    #[test]
    fn test_export_matches_layout() {
        let mut engine = OrgChartEngine::default();
        let roots: Vec<OrgNode> = (0..3).map(|i| OrgNode::new(format!("r{i}"), "Root")).collect();
        engine.load_snapshot(HierarchySnapshot::new(roots));

        let total = engine.layout().nodes.len();
        let export = engine.export_view();
        assert_eq!(export.nodes.len(), total);
        assert!(elbow_buffer(&export.edges).is_empty());
    }
}
