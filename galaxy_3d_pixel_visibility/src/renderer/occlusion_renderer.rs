/// OcclusionRenderer trait - GPU occlusion query primitive and proxy drawing

use glam::Vec3;

/// Opaque GPU occlusion query object.
///
/// Created and interpreted by the renderer backend only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OcclusionQueryHandle(u64);

impl OcclusionQueryHandle {
    /// Wrap a backend-specific query id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Backend-specific query id
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Material used to rasterize a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMaterial {
    /// Invisible, depth tested: counts the pixels that survive occlusion
    Occlusion,
    /// Invisible, depth test disabled: counts every pixel the proxy covers
    Counting,
    /// Visible, depth tested (debug overlay)
    Debug,
}

/// View-facing quad drawn solely to measure occlusion at a point.
///
/// Corners are in world space, ordered bottom-left, top-left, top-right,
/// bottom-right as seen from the view that built the quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyQuad {
    pub center: Vec3,
    pub corners: [Vec3; 4],
}

/// Occlusion queries as exposed by a renderer backend.
///
/// Every call happens on the render thread, between the renderer's own
/// begin/end frame. Results follow the usual one-frame latency: a query
/// ended during frame N can be read without stalling during frame N+1.
pub trait OcclusionRenderer {
    /// Whether the device supports occlusion queries at all
    fn supports_occlusion_queries(&self) -> bool;

    /// Create a query object.
    ///
    /// # Returns
    ///
    /// `None` when the device is out of query objects
    fn create_occlusion_query(&mut self) -> Option<OcclusionQueryHandle>;

    /// Destroy a query object
    fn destroy_occlusion_query(&mut self, query: OcclusionQueryHandle);

    /// Forget any result the query has produced so far
    fn reset_occlusion_query(&mut self, query: OcclusionQueryHandle);

    /// Start counting pixels into `query`
    fn begin_occlusion_query(&mut self, query: OcclusionQueryHandle);

    /// Stop counting pixels into `query`
    fn end_occlusion_query(&mut self, query: OcclusionQueryHandle);

    /// Number of pixels that passed the depth test during the last
    /// begin/end bracket.
    ///
    /// # Returns
    ///
    /// A negative value while the result is not available
    fn pixels_rendered(&mut self, query: OcclusionQueryHandle) -> i64;

    /// Rasterize a proxy quad with the given material
    fn draw_proxy_geometry(&mut self, proxy: &ProxyQuad, material: ProxyMaterial);
}
