/// Mock renderer and frame context for unit tests (no GPU required)
///
/// MockOcclusionRenderer records every call and answers pixel-count reads
/// from configurable values, so the visibility cache can be driven frame
/// by frame without a device.

use std::f32::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex};
use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::camera::ViewSetup;
use crate::log::{LogEntry, Logger};
use crate::renderer::{
    FrameContext, OcclusionQueryHandle, OcclusionRenderer, ProxyMaterial, ProxyQuad,
};

// ============================================================================
// Mock OcclusionRenderer
// ============================================================================

#[derive(Debug, Default)]
struct MockQuery {
    /// Material drawn inside the current begin/end bracket
    drawn: Option<ProxyMaterial>,
    /// Pixel count produced by the last completed bracket
    result: Option<i64>,
    /// False until the frame that issued the bracket has ended
    ready: bool,
}

#[derive(Debug)]
pub struct MockOcclusionRenderer {
    /// Reported by supports_occlusion_queries()
    pub supports_queries: bool,
    /// Maximum number of live query objects (None = unlimited)
    pub query_budget: Option<usize>,
    /// Pixels reported for depth-tested draws
    pub visible_pixels: i64,
    /// Pixels reported for counting draws
    pub possible_pixels: i64,
    /// When false every read reports "not available"
    pub results_available: bool,

    next_id: u64,
    queries: FxHashMap<OcclusionQueryHandle, MockQuery>,
    open_query: Option<OcclusionQueryHandle>,

    /// Every proxy drawn, with the query it was drawn into
    pub draws: Vec<(OcclusionQueryHandle, ProxyMaterial, ProxyQuad)>,
    /// Number of pixels_rendered() calls
    pub readbacks: usize,
    /// Number of reset_occlusion_query() calls
    pub resets: usize,
    /// Number of destroy_occlusion_query() calls
    pub destroyed: usize,
}

impl MockOcclusionRenderer {
    pub fn new() -> Self {
        Self {
            supports_queries: true,
            query_budget: None,
            visible_pixels: 100,
            possible_pixels: 100,
            results_available: true,
            next_id: 1,
            queries: FxHashMap::default(),
            open_query: None,
            draws: Vec::new(),
            readbacks: 0,
            resets: 0,
            destroyed: 0,
        }
    }

    /// Renderer without occlusion query support
    pub fn unsupported() -> Self {
        Self {
            supports_queries: false,
            ..Self::new()
        }
    }

    /// Set the pixel counts reported for the next issued queries
    pub fn set_pixels(&mut self, visible: i64, possible: i64) {
        self.visible_pixels = visible;
        self.possible_pixels = possible;
    }

    /// Number of live query objects
    pub fn live_queries(&self) -> usize {
        self.queries.len()
    }

    /// Drop the recorded draw list
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// End the GPU frame: results of every bracket issued so far become
    /// readable. Until then pixels_rendered() reports "not available".
    pub fn end_frame(&mut self) {
        for state in self.queries.values_mut() {
            state.ready = true;
        }
    }
}

impl OcclusionRenderer for MockOcclusionRenderer {
    fn supports_occlusion_queries(&self) -> bool {
        self.supports_queries
    }

    fn create_occlusion_query(&mut self) -> Option<OcclusionQueryHandle> {
        if self.query_budget.is_some_and(|budget| self.queries.len() >= budget) {
            return None;
        }
        let handle = OcclusionQueryHandle::new(self.next_id);
        self.next_id += 1;
        self.queries.insert(handle, MockQuery::default());
        Some(handle)
    }

    fn destroy_occlusion_query(&mut self, query: OcclusionQueryHandle) {
        assert!(self.queries.remove(&query).is_some(), "destroying unknown query {:?}", query);
        self.destroyed += 1;
    }

    fn reset_occlusion_query(&mut self, query: OcclusionQueryHandle) {
        if let Some(state) = self.queries.get_mut(&query) {
            state.result = None;
        }
        self.resets += 1;
    }

    fn begin_occlusion_query(&mut self, query: OcclusionQueryHandle) {
        assert!(self.open_query.is_none(), "nested occlusion queries");
        self.open_query = Some(query);
    }

    fn end_occlusion_query(&mut self, query: OcclusionQueryHandle) {
        assert_eq!(self.open_query.take(), Some(query), "mismatched end_occlusion_query");
        let (visible, possible) = (self.visible_pixels, self.possible_pixels);
        if let Some(state) = self.queries.get_mut(&query) {
            state.result = match state.drawn.take() {
                Some(ProxyMaterial::Counting) => Some(possible),
                Some(_) => Some(visible),
                None => Some(0),
            };
            state.ready = false;
        }
    }

    fn pixels_rendered(&mut self, query: OcclusionQueryHandle) -> i64 {
        self.readbacks += 1;
        if !self.results_available {
            return -1;
        }
        self.queries
            .get(&query)
            .filter(|state| state.ready)
            .and_then(|state| state.result)
            .unwrap_or(-1)
    }

    fn draw_proxy_geometry(&mut self, proxy: &ProxyQuad, material: ProxyMaterial) {
        let query = self.open_query.expect("proxy drawn outside an occlusion query");
        if let Some(state) = self.queries.get_mut(&query) {
            state.drawn = Some(material);
        }
        self.draws.push((query, material, *proxy));
    }
}

// ============================================================================
// Mock FrameContext
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockFrame {
    pub player_slot: u8,
    pub view_id: i32,
    pub frame: i64,
    pub delta_time: f32,
    pub view: ViewSetup,
    pub building_cubemaps: bool,
    pub line_of_sight_clear: bool,
}

impl MockFrame {
    /// Player 0, view 0, frame 1 at ~60 Hz, looking down -Z from the origin
    /// with a 90° fov on a 600 px high target.
    pub fn new() -> Self {
        Self {
            player_slot: 0,
            view_id: 0,
            frame: 1,
            delta_time: 0.016,
            view: ViewSetup::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, FRAC_PI_2, 1.0, 600.0),
            building_cubemaps: false,
            line_of_sight_clear: true,
        }
    }

    /// Move to the next frame
    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

impl FrameContext for MockFrame {
    fn current_player_slot(&self) -> u8 {
        self.player_slot
    }

    fn current_view_id(&self) -> i32 {
        self.view_id
    }

    fn frame_count(&self) -> i64 {
        self.frame
    }

    fn frame_delta_time(&self) -> f32 {
        self.delta_time
    }

    fn view_setup(&self) -> &ViewSetup {
        &self.view
    }

    fn building_cubemaps(&self) -> bool {
        self.building_cubemaps
    }

    fn is_line_of_sight_clear(&self, _from: Vec3, _to: Vec3) -> bool {
        self.line_of_sight_clear
    }
}

// ============================================================================
// Capturing logger
// ============================================================================

/// Logger that keeps every entry in memory
#[derive(Clone, Default)]
pub struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries logged under `source`
    pub fn entries_from(&self, source: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.source == source)
            .collect()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
