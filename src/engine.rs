//! OrgChartEngine - the stateful pipeline driver.
//!
//! The engine owns the current hierarchy snapshot and every UI directive
//! that feeds the layout (filters, expanded-set, scroll and zoom), and
//! drives the pipeline:
//!
//! ```text
//! snapshot → filter → widths → placement → Layout → viewport window
//! ```
//!
//! The layout (and its R-tree) is cached and keyed by the snapshot
//! generation plus the filter and expansion revisions, so scrolling and
//! zooming never trigger a recomputation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{OrgChartError, Result};
use crate::filter::{self, FilterSet};
use crate::layout::{Layout, LayoutConfig, PositionedNode, compute_layout};
use crate::reparent::{DragSession, DropOutcome, ReparentRequest};
use crate::tree::{ExpandedSet, HierarchySnapshot, OrgGraph, OrgNode, PreOrder};
use crate::viewport::{
    RenderWindow, Viewport, ViewportConfig, ViewportVirtualizer, ZoomConfig, ZoomState,
};

/// All engine settings. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub zoom: ZoomConfig,
}

/// Handle for one in-flight hierarchy load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for LoadTicket {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Headline numbers shown above the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrgStats {
    pub total_employees: usize,
    pub levels: usize,
}

/// The complete, unwindowed layout handed to export.
pub type ExportView<'a> = RenderWindow<'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayoutKey {
    generation: u64,
    filter_revision: u64,
    expansion_revision: u64,
}

#[derive(Debug)]
struct CachedLayout {
    key: LayoutKey,
    layout: Layout,
    virtualizer: ViewportVirtualizer,
}

impl CachedLayout {
    fn build(
        key: LayoutKey,
        roots: &[OrgNode],
        expanded: &ExpandedSet,
        config: &EngineConfig,
    ) -> Self {
        let layout = compute_layout(roots, expanded, &config.layout);
        let virtualizer = ViewportVirtualizer::new(&layout, &config.layout, &config.viewport);
        debug!(
            generation = key.generation,
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            width = layout.width,
            height = layout.height,
            "recomputed layout"
        );
        Self {
            key,
            layout,
            virtualizer,
        }
    }
}

/// The org chart engine.
///
/// This struct manages:
/// - The hierarchy snapshot and its petgraph index
/// - Load supersession via monotonically increasing tickets
/// - Filters and the pruned forest
/// - The expanded-set
/// - Scroll and zoom state
/// - The drag-and-drop gesture
/// - The cached layout and its spatial index
#[derive(Debug)]
pub struct OrgChartEngine {
    config: EngineConfig,

    snapshot: HierarchySnapshot,
    graph: OrgGraph,
    /// Bumped on every applied snapshot.
    generation: u64,

    /// Last ticket handed out by `begin_load`.
    issued: u64,
    /// Ticket of the newest load that completed (successfully or not).
    applied: u64,

    filters: FilterSet,
    filtered: Vec<OrgNode>,
    filter_revision: u64,

    expanded: ExpandedSet,
    expansion_revision: u64,

    scroll_top: f32,
    container_height: f32,
    zoom: ZoomState,

    drag: DragSession,
    last_error: Option<OrgChartError>,

    cache: Option<CachedLayout>,
    /// Number of layout recomputations, for cache accounting.
    recomputed: u64,
}

impl OrgChartEngine {
    /// Create an engine with no hierarchy loaded.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            container_height: config.viewport.initial_height,
            zoom: ZoomState::new(config.zoom.clone()),
            config,
            snapshot: HierarchySnapshot::default(),
            graph: OrgGraph::new(),
            generation: 0,
            issued: 0,
            applied: 0,
            filters: FilterSet::default(),
            filtered: Vec::new(),
            filter_revision: 0,
            expanded: ExpandedSet::new(),
            expansion_revision: 0,
            scroll_top: 0.0,
            drag: DragSession::new(),
            last_error: None,
            cache: None,
            recomputed: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Start a hierarchy load. Each call supersedes every earlier ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        debug!(ticket = self.issued, "hierarchy load started");
        LoadTicket(self.issued)
    }

    /// Complete the load identified by `ticket`.
    ///
    /// A result older than the newest completed load is dropped with
    /// [`OrgChartError::StaleLoad`]. A failed fetch keeps the last good
    /// snapshot and layout, records the error and returns it.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<HierarchySnapshot>,
    ) -> Result<()> {
        if ticket.0 == 0 || ticket.0 > self.issued {
            return Err(OrgChartError::Decode(format!("load ticket {} was never issued", ticket.0)));
        }
        if ticket.0 < self.applied {
            warn!(ticket = ticket.0, current = self.applied, "ignoring superseded hierarchy load");
            return Err(OrgChartError::StaleLoad {
                ticket: ticket.0,
                current: self.applied,
            });
        }
        self.applied = ticket.0;

        match result {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(())
            }
            Err(err) => {
                warn!(
                    ticket = ticket.0,
                    error = %err,
                    "hierarchy load failed, keeping previous chart"
                );
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Load a snapshot synchronously.
    pub fn load_snapshot(&mut self, snapshot: HierarchySnapshot) {
        let ticket = self.begin_load();
        self.applied = ticket.0;
        self.apply_snapshot(snapshot);
    }

    /// Check whether a load was started but has not completed yet.
    pub fn is_loading(&self) -> bool {
        self.issued > self.applied
    }

    fn apply_snapshot(&mut self, snapshot: HierarchySnapshot) {
        self.graph = OrgGraph::from_forest(&snapshot.hierarchy);
        self.expanded = ExpandedSet::all(&snapshot.hierarchy);
        self.snapshot = snapshot;
        self.generation += 1;
        self.expansion_revision += 1;
        self.last_error = None;
        self.drag.cancel();
        self.refilter();

        info!(
            generation = self.generation,
            nodes = self.graph.node_count(),
            roots = self.graph.roots().len(),
            levels = self.graph.levels(),
            "hierarchy loaded"
        );
    }

    pub fn snapshot(&self) -> &HierarchySnapshot {
        &self.snapshot
    }

    pub fn graph(&self) -> &OrgGraph {
        &self.graph
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Set the free-text query. A non-empty query expands every surviving node.
    pub fn set_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.filters.query {
            return;
        }
        self.filters.query = query;
        self.refilter();
    }

    /// Restrict to one department; `None` or an empty name clears the filter.
    pub fn set_department(&mut self, department: Option<String>) {
        let department = department.filter(|department| !department.is_empty());
        if department == self.filters.department {
            return;
        }
        self.filters.department = department;
        self.refilter();
    }

    /// Keep only the first `max_depth` levels; `None` keeps all of them.
    pub fn set_max_depth(&mut self, max_depth: Option<usize>) {
        if max_depth == self.filters.max_depth {
            return;
        }
        self.filters.max_depth = max_depth;
        self.refilter();
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// The forest after filtering, before expansion.
    pub fn filtered(&self) -> &[OrgNode] {
        &self.filtered
    }

    fn refilter(&mut self) {
        self.filtered = self.filters.apply(&self.snapshot.hierarchy);
        self.filter_revision += 1;
        if self.filters.has_query() {
            self.expanded = ExpandedSet::all(&self.filtered);
            self.expansion_revision += 1;
        }
        debug!(
            query = %self.filters.query,
            department = ?self.filters.department,
            max_depth = ?self.filters.max_depth,
            roots = self.filtered.len(),
            "filters applied"
        );
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Flip a node between expanded and collapsed. Returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.expansion_revision += 1;
        self.expanded.toggle(id)
    }

    /// Expand every node of the unfiltered snapshot.
    pub fn expand_all(&mut self) {
        self.expanded = ExpandedSet::all(&self.snapshot.hierarchy);
        self.expansion_revision += 1;
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.expansion_revision += 1;
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Expand the whole manager chain of `id` so its card is shown.
    pub fn reveal(&mut self, id: &str) -> Result<()> {
        if !self.graph.contains(id) {
            return Err(OrgChartError::UnknownNode(id.to_string()));
        }
        for manager in self.graph.ancestors(id) {
            self.expanded.insert(manager);
        }
        self.expansion_revision += 1;
        Ok(())
    }

    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            generation: self.generation,
            filter_revision: self.filter_revision,
            expansion_revision: self.expansion_revision,
        }
    }

    fn cached(&mut self) -> &CachedLayout {
        let key = self.layout_key();
        if self.cache.as_ref().is_none_or(|cache| cache.key != key) {
            self.cache = None;
            self.recomputed += 1;
        }
        self.cache.get_or_insert_with(|| {
            CachedLayout::build(key, &self.filtered, &self.expanded, &self.config)
        })
    }

    /// The current layout, recomputed only when the snapshot, the filters or
    /// the expanded-set changed since the last call.
    pub fn layout(&mut self) -> &Layout {
        &self.cached().layout
    }

    /// The card covering a layout-space point.
    pub fn node_at(&mut self, x: f32, y: f32) -> Option<&PositionedNode> {
        let cache = self.cached();
        let slot = cache.virtualizer.card_at(x, y)?;
        cache.layout.nodes.get(slot)
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn set_viewport(&mut self, scroll_top: f32, container_height: f32) {
        self.scroll_top = scroll_top.max(0.0);
        self.container_height = container_height.max(0.0);
    }

    pub fn set_scroll(&mut self, scroll_top: f32) {
        self.scroll_top = scroll_top.max(0.0);
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.scroll_top, self.container_height, self.zoom.factor())
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.zoom.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> f32 {
        self.zoom.reset()
    }

    pub fn set_zoom(&mut self, factor: f32) -> f32 {
        self.zoom.set(factor)
    }

    /// Nodes and edges to realize for the current scroll and zoom.
    pub fn render_window(&mut self) -> RenderWindow<'_> {
        let viewport = self.viewport();
        let cache = self.cached();
        cache.virtualizer.window(&cache.layout, &viewport)
    }

    /// Every node and edge, for export.
    pub fn export_view(&mut self) -> ExportView<'_> {
        let cache = self.cached();
        cache.virtualizer.full(&cache.layout)
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    pub fn drag_start(&mut self, id: &str) {
        self.drag.start(id);
    }

    pub fn drag_hover(&mut self, id: &str) {
        self.drag.hover(id);
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    /// Drop the dragged card onto `target`.
    ///
    /// Returns the request to send to the data collaborator, or `None` when
    /// the move is refused. The local tree is never modified.
    pub fn drop_on(&mut self, target: &str) -> Option<ReparentRequest> {
        let outcome = self.drag.drop_on(&self.graph, target);
        Self::accept(outcome)
    }

    /// Drop the dragged card on empty canvas, detaching it into a root.
    pub fn drop_to_root(&mut self) -> Option<ReparentRequest> {
        let outcome = self.drag.drop_to_root(&self.graph);
        Self::accept(outcome)
    }

    fn accept(outcome: DropOutcome) -> Option<ReparentRequest> {
        match outcome {
            DropOutcome::Legal(request) => {
                info!(
                    dragged = %request.dragged_id,
                    manager = ?request.new_manager_id,
                    "reparent requested"
                );
                Some(request)
            }
            DropOutcome::Illegal(reason) => {
                debug!(?reason, "drop refused");
                None
            }
            DropOutcome::NotDragging => None,
        }
    }

    /// Record the collaborator's answer to a reparent request.
    ///
    /// Returns true when the change went through and the hierarchy must be
    /// reloaded.
    pub fn finish_reparent(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "manager update failed");
                self.last_error = Some(err);
                false
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn last_error(&self) -> Option<&OrgChartError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Department names of the unfiltered snapshot, sorted.
    pub fn departments(&self) -> Vec<String> {
        filter::departments(&self.snapshot.hierarchy)
    }

    /// Identifiers matching the current query, in pre-order.
    pub fn matches(&self) -> Vec<String> {
        filter::search(&self.snapshot.hierarchy, &self.filters.query)
    }

    /// Counts reported by the source, computed from the tree when absent.
    pub fn stats(&self) -> OrgStats {
        OrgStats {
            total_employees: self
                .snapshot
                .total_employees
                .unwrap_or_else(|| self.graph.node_count()),
            levels: self.snapshot.levels.unwrap_or_else(|| self.graph.levels()),
        }
    }

    pub fn find(&self, id: &str) -> Option<&OrgNode> {
        if !self.graph.contains(id) {
            return None;
        }
        PreOrder::forest(&self.snapshot.hierarchy).find(|node| node.id() == id)
    }

    /// Number of people reporting to `id`, directly or indirectly.
    pub fn team_size(&self, id: &str) -> usize {
        self.graph.descendant_count(id)
    }
}

impl Default for OrgChartEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "hierarchy": [{
            "id": 1,
            "full_name": "Alice Chen",
            "position_title": "CEO",
            "department_name": "Executive",
            "children": [
                {
                    "id": "2",
                    "full_name": "Bob Diaz",
                    "position_title": "CTO",
                    "department_name": "Engineering",
                    "children": [
                        { "id": 4, "full_name": "Dana Eve", "department_name": "Engineering" }
                    ]
                },
                { "id": 3, "full_name": "Carl Dunn", "department_name": "Finance" }
            ]
        }],
        "total_employees": 4,
        "levels": 3
    }"#;

    fn snapshot() -> HierarchySnapshot {
        serde_json::from_str(FIXTURE).unwrap()
    }

    fn loaded() -> OrgChartEngine {
        let mut engine = OrgChartEngine::default();
        engine.load_snapshot(snapshot());
        engine
    }

    fn ids(nodes: &[&PositionedNode]) -> Vec<String> {
        nodes.iter().map(|node| node.id().to_string()).collect()
    }

    #[test]
    fn test_empty_engine() {
        let mut engine = OrgChartEngine::default();
        let layout = engine.layout();
        assert!(layout.is_empty());
        assert_eq!((layout.width, layout.height), (800.0, 600.0));
        assert_eq!(engine.stats(), OrgStats { total_employees: 0, levels: 0 });
    }

    #[test]
    fn test_load_and_layout() {
        let mut engine = loaded();
        assert_eq!(engine.stats(), OrgStats { total_employees: 4, levels: 3 });

        let layout = engine.layout();
        assert_eq!(layout.nodes.len(), 4);
        assert_eq!(layout.edges.len(), 3);

        // Root spans two 200px children and one gap.
        let root = layout.node("1").unwrap();
        assert_eq!((root.x, root.y), (126.0, 20.0));
        assert_eq!(root.subtree_width, 412.0);
        let carl = layout.node("3").unwrap();
        assert_eq!((carl.x, carl.y), (232.0, 125.0));
        let dana = layout.node("4").unwrap();
        assert_eq!((dana.x, dana.y), (20.0, 230.0));
        assert_eq!((layout.width, layout.height), (800.0, 600.0));
    }

    #[test]
    fn test_stats_computed_when_absent() {
        let mut snapshot = snapshot();
        snapshot.total_employees = None;
        snapshot.levels = None;
        let mut engine = OrgChartEngine::default();
        engine.load_snapshot(snapshot);
        assert_eq!(engine.stats(), OrgStats { total_employees: 4, levels: 3 });
        assert_eq!(engine.team_size("1"), 3);
        assert_eq!(engine.find("4").map(|node| node.record.full_name.as_str()), Some("Dana Eve"));
        assert!(engine.find("9").is_none());
    }

    #[test]
    fn test_stale_load_ignored() {
        let mut engine = OrgChartEngine::default();
        let first = engine.begin_load();
        let second = engine.begin_load();
        assert!(engine.is_loading());

        engine.finish_load(second, Ok(snapshot())).unwrap();
        let late = HierarchySnapshot::new(vec![OrgNode::new("x", "Late")]);
        assert_eq!(
            engine.finish_load(first, Ok(late)),
            Err(OrgChartError::StaleLoad { ticket: 1, current: 2 })
        );
        assert!(!engine.is_loading());
        assert_eq!(engine.layout().nodes.len(), 4);
        assert!(engine.find("x").is_none());
    }

    #[test]
    fn test_loads_completing_in_order_both_apply() {
        let mut engine = OrgChartEngine::default();
        let first = engine.begin_load();
        let second = engine.begin_load();
        engine
            .finish_load(first, Ok(HierarchySnapshot::new(vec![OrgNode::new("x", "Early")])))
            .unwrap();
        engine.finish_load(second, Ok(snapshot())).unwrap();
        assert_eq!(engine.generation(), 2);
        assert!(engine.find("x").is_none());
    }

    #[test]
    fn test_unissued_ticket_rejected() {
        let mut engine = OrgChartEngine::default();
        assert!(matches!(
            engine.finish_load(LoadTicket::from(7), Ok(snapshot())),
            Err(OrgChartError::Decode(_))
        ));
    }

    #[test]
    fn test_failed_load_keeps_last_layout() {
        let mut engine = loaded();
        let ticket = engine.begin_load();
        let err = OrgChartError::Fetch("503".into());
        assert_eq!(engine.finish_load(ticket, Err(err.clone())), Err(err.clone()));
        assert_eq!(engine.last_error(), Some(&err));
        assert_eq!(engine.layout().nodes.len(), 4);

        engine.load_snapshot(snapshot());
        assert_eq!(engine.last_error(), None);
    }

    #[test]
    fn test_load_reseeds_expansion() {
        let mut engine = loaded();
        engine.collapse_all();
        assert_eq!(engine.layout().nodes.len(), 1);
        engine.load_snapshot(snapshot());
        assert!(engine.is_expanded("1") && engine.is_expanded("2"));
        assert_eq!(engine.layout().nodes.len(), 4);
    }

    #[test]
    fn test_search_expands_survivors() {
        let mut engine = loaded();
        engine.collapse_all();
        engine.set_search("dana");
        assert_eq!(engine.matches(), ["4"]);

        let layout = engine.layout();
        let mut shown: Vec<&str> = layout.nodes.iter().map(PositionedNode::id).collect();
        shown.sort_unstable();
        assert_eq!(shown, ["1", "2", "4"]);

        // Clearing the query keeps the expansion as it was.
        engine.set_search("");
        assert!(engine.is_expanded("2"));
        assert!(!engine.is_expanded("3"));
    }

    #[test]
    fn test_department_and_depth_filters() {
        let mut engine = loaded();
        engine.set_department(Some("Finance".into()));
        assert_eq!(engine.layout().nodes.len(), 2);
        engine.set_department(Some(String::new()));
        assert_eq!(engine.filters().department, None);

        engine.set_max_depth(Some(1));
        assert_eq!(engine.layout().nodes.len(), 1);
        assert_eq!(engine.departments(), ["Engineering", "Executive", "Finance"]);
    }

    #[test]
    fn test_expand_all_uses_unfiltered_snapshot() {
        let mut engine = loaded();
        engine.set_department(Some("Finance".into()));
        engine.collapse_all();
        engine.expand_all();
        assert!(engine.is_expanded("4"));
    }

    #[test]
    fn test_toggle_and_reveal() {
        let mut engine = loaded();
        assert!(!engine.toggle("1"));
        assert_eq!(engine.layout().nodes.len(), 1);
        assert!(engine.toggle("1"));
        assert_eq!(engine.layout().nodes.len(), 4);

        engine.collapse_all();
        engine.reveal("4").unwrap();
        assert!(engine.layout().node("4").is_some());
        assert_eq!(engine.reveal("zz"), Err(OrgChartError::UnknownNode("zz".into())));
    }

    #[test]
    fn test_layout_cache() {
        let mut engine = loaded();
        engine.layout();
        engine.layout();
        assert_eq!(engine.recomputed, 1);

        engine.set_scroll(300.0);
        engine.set_zoom(0.5);
        engine.render_window();
        engine.set_search("");
        assert_eq!(engine.recomputed, 1);

        engine.toggle("2");
        engine.layout();
        assert_eq!(engine.recomputed, 2);
    }

    #[test]
    fn test_render_window() {
        let mut engine = OrgChartEngine::new(EngineConfig {
            viewport: ViewportConfig {
                buffer: 0.0,
                ..Default::default()
            },
            ..Default::default()
        });
        engine.load_snapshot(snapshot());

        engine.set_viewport(200.0, 50.0);
        let window = engine.render_window();
        assert_eq!(ids(&window.nodes), ["4"]);
        assert_eq!(window.edges.len(), 1);
        assert_eq!(window.edges[0].from_id, "2");

        // At 50% the same 100px screen spans 200 layout pixels.
        engine.set_viewport(0.0, 100.0);
        engine.set_zoom(0.5);
        let mut shown = ids(&engine.render_window().nodes);
        shown.sort_unstable();
        assert_eq!(shown, ["1", "2", "3"]);

        assert_eq!(engine.export_view().nodes.len(), 4);
    }

    #[test]
    fn test_node_at() {
        let mut engine = loaded();
        assert_eq!(engine.node_at(130.0, 30.0).map(PositionedNode::id), Some("1"));
        assert!(engine.node_at(5.0, 5.0).is_none());
    }

    #[test]
    fn test_drag_and_drop() {
        let mut engine = loaded();

        engine.drag_start("1");
        engine.drag_hover("4");
        assert_eq!(engine.drop_on("4"), None);
        assert_eq!(engine.drag_session().dragged(), None);

        engine.drag_start("4");
        engine.drag_hover("3");
        let request = engine.drop_on("3").unwrap();
        assert_eq!(request.new_manager_id.as_deref(), Some("3"));
        // The local tree is untouched until the next load.
        assert_eq!(engine.graph().parent("4"), Some("2"));

        assert!(engine.finish_reparent(Ok(())));
        assert!(!engine.finish_reparent(Err(OrgChartError::Update("denied".into()))));
        assert_eq!(engine.last_error(), Some(&OrgChartError::Update("denied".into())));
    }

    #[test]
    fn test_drop_to_root() {
        let mut engine = loaded();
        assert_eq!(engine.drop_to_root(), None);
        engine.drag_start("3");
        engine.drag_leave();
        let request = engine.drop_to_root().unwrap();
        assert_eq!(request.dragged_id, "3");
        assert_eq!(request.new_manager_id, None);

        engine.drag_start("2");
        engine.drag_cancel();
        assert_eq!(engine.drop_on("3"), None);
    }

    #[test]
    fn test_zoom_stepping() {
        let mut engine = loaded();
        for _ in 0..30 {
            engine.zoom_in();
        }
        assert_eq!(engine.zoom().factor(), 2.0);
        assert_eq!(engine.reset_zoom(), 1.0);
        assert_eq!(engine.zoom_out(), 0.9);
        assert_eq!(engine.zoom().percent(), 90);
    }

    #[test]
    fn test_replacing_deep_snapshot_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(1 << 20)
            .spawn(|| {
                let mut node = OrgNode::new("n0", "Needle");
                for i in 1..20_000 {
                    node = OrgNode::new(format!("n{i}"), "Link").with_children([node]);
                }
                let mut engine = OrgChartEngine::default();
                engine.load_snapshot(HierarchySnapshot::new(vec![node]));
                assert_eq!(engine.stats().levels, 20_000);
                assert_eq!(engine.export_view().nodes.len(), 20_000);

                engine.set_search("needle");
                engine.set_max_depth(Some(10_000));
                assert_eq!(engine.layout().nodes.len(), 10_000);

                engine.load_snapshot(snapshot());
                assert_eq!(engine.layout().nodes.len(), 4);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_inverted_zoom_bounds_from_host() {
        let config: EngineConfig = serde_json::from_str(r#"{ "zoom": { "max": 0.05 } }"#).unwrap();
        let mut engine = OrgChartEngine::new(config);
        assert_eq!(engine.zoom_in(), 0.1);
        assert_eq!(engine.zoom_out(), 0.05);
        assert_eq!(engine.zoom().percent(), 5);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "layout": { "node_width": 180 }, "viewport": { "buffer": 100 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout.node_width, 180.0);
        assert_eq!(config.layout.node_height, 65.0);
        assert_eq!(config.viewport.buffer, 100.0);
        assert_eq!(config.zoom, ZoomConfig::default());
    }
}
