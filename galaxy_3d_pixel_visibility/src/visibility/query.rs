/// One pooled occlusion query bound to a (player slot, view) pair.
///
/// Owns two GPU query objects for its whole lifetime: one counting the
/// pixels that survive the depth test, one counting every pixel the proxy
/// covers (partial mode only). Results are read one frame after issue.

use bitflags::bitflags;
use glam::Vec3;
use crate::camera::{ViewSetup, build_proxy, screen_clip_fraction};
use crate::config::PixelVisibilityConfig;
use crate::renderer::{OcclusionRenderer, OcclusionQueryHandle, ProxyMaterial, ProxyQuad};
use crate::{pixvis_debug, pixvis_warn};

const SOURCE: &str = "galaxy3d::PixelVisibility::Query";

bitflags! {
    /// Per-query state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct QueryFlags: u8 {
        /// The GPU result has been consumed since the last issue
        const QUERIED_THIS_FRAME = 1 << 0;
        /// An issued query's result was unexpectedly unavailable
        const FAILED = 1 << 1;
        /// At least one GPU result has been read
        const HAS_VALID_RESULTS = 1 << 2;
    }
}

/// Snapshot of a query, for overlays and diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryState {
    pub player_slot: u8,
    pub view_id: i32,
    pub origin: Vec3,
    pub brightness: f32,
    pub clip_fraction: f32,
    pub last_frame_issued: Option<i64>,
    pub flags: QueryFlags,
    /// False when the GPU query objects could not be created
    pub valid: bool,
}

/// Proxy shape shared by every query of a visibility set
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProxyShape {
    pub size: f32,
    pub aspect: f32,
    pub screen_space: bool,
}

/// Frame values needed to consume a GPU result
#[derive(Debug, Clone, Copy)]
pub(crate) struct Readback {
    pub frame: i64,
    pub frame_delta_time: f32,
    pub fade_rate_inv: f32,
    pub partial: bool,
    pub full_visibility_snap: f32,
    pub spew: bool,
}

pub(crate) struct Query {
    pub(crate) origin: Vec3,
    player_slot: u8,
    view_id: i32,
    brightness: f32,
    clip_fraction: f32,
    occlusion_handle: Option<OcclusionQueryHandle>,
    count_handle: Option<OcclusionQueryHandle>,
    last_frame_issued: Option<i64>,
    flags: QueryFlags,
}

impl Query {
    /// Create a query and its two GPU query objects.
    ///
    /// If the device runs out of query objects the record is still created
    /// but stays invalid for good: it reports zero visibility and is never
    /// issued.
    pub(crate) fn create(renderer: &mut dyn OcclusionRenderer) -> Self {
        let occlusion = renderer.create_occlusion_query();
        let count = renderer.create_occlusion_query();

        let (occlusion_handle, count_handle) = match (occlusion, count) {
            (Some(occlusion), Some(count)) => (Some(occlusion), Some(count)),
            (occlusion, count) => {
                for handle in occlusion.into_iter().chain(count) {
                    renderer.destroy_occlusion_query(handle);
                }
                pixvis_warn!(SOURCE, "Out of occlusion queries, visibility will read as zero");
                (None, None)
            }
        };

        Self {
            origin: Vec3::ZERO,
            player_slot: 0,
            view_id: -1,
            brightness: 0.0,
            clip_fraction: 1.0,
            occlusion_handle,
            count_handle,
            last_frame_issued: None,
            flags: QueryFlags::empty(),
        }
    }

    /// Whether both GPU query objects exist
    pub(crate) fn is_valid(&self) -> bool {
        self.occlusion_handle.is_some() && self.count_handle.is_some()
    }

    /// Bind to a view and forget everything about the previous binding
    pub(crate) fn bind_view(&mut self, player_slot: u8, view_id: i32) {
        self.player_slot = player_slot;
        self.view_id = view_id;
        self.brightness = 0.0;
        self.clip_fraction = 1.0;
        self.last_frame_issued = None;
        self.flags = QueryFlags::empty();
    }

    /// Move to another view id, keeping origin, brightness and GPU state
    pub(crate) fn rebind_view(&mut self, view_id: i32) {
        self.view_id = view_id;
    }

    pub(crate) fn is_for_view(&self, player_slot: u8, view_id: i32) -> bool {
        self.player_slot == player_slot && self.view_id == view_id
    }

    /// Issued during this frame or the previous one
    pub(crate) fn is_active(&self, frame: i64) -> bool {
        self.last_frame_issued.is_some_and(|issued| frame - issued <= 1)
    }

    pub(crate) fn state(&self) -> QueryState {
        QueryState {
            player_slot: self.player_slot,
            view_id: self.view_id,
            origin: self.origin,
            brightness: self.brightness,
            clip_fraction: self.clip_fraction,
            last_frame_issued: self.last_frame_issued,
            flags: self.flags,
            valid: self.is_valid(),
        }
    }

    /// Smoothed visible fraction, scaled by the screen clip fraction.
    ///
    /// The GPU result is consumed at most once between two issues; later
    /// calls return the same value.
    pub(crate) fn fraction_visible(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        readback: &Readback,
    ) -> f32 {
        let (Some(occlusion), Some(count)) = (self.occlusion_handle, self.count_handle) else {
            return 0.0;
        };

        if !self.flags.contains(QueryFlags::QUERIED_THIS_FRAME) {
            self.flags.insert(QueryFlags::QUERIED_THIS_FRAME);
            if readback.partial {
                self.read_partial(renderer, readback, occlusion, count);
            } else {
                self.read_binary(renderer, readback, occlusion);
            }
        }

        self.brightness * self.clip_fraction
    }

    fn read_partial(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        readback: &Readback,
        occlusion: OcclusionQueryHandle,
        count: OcclusionQueryHandle,
    ) {
        let (pixels, possible) = match self.last_frame_issued {
            Some(_) => {
                let possible = renderer.pixels_rendered(count);
                (renderer.pixels_rendered(occlusion), possible)
            }
            None => (-1, -1),
        };

        if readback.spew {
            pixvis_debug!(SOURCE,
                "Pixels visible: {} (qh:{}) Pixels possible: {} (qh:{}) (frame:{})",
                pixels, occlusion.raw(), possible, count.raw(), readback.frame);
        }

        if pixels < 0 || possible < 0 {
            self.flags.set(QueryFlags::FAILED, self.last_frame_issued.is_some());
            return;
        }
        self.flags.insert(QueryFlags::HAS_VALID_RESULTS);

        if possible > 0 {
            let mut target = (pixels as f32 / possible as f32).clamp(0.0, 1.0);
            if target > readback.full_visibility_snap {
                target = 1.0;
            }
            let rate = readback.frame_delta_time * readback.fade_rate_inv;
            self.brightness = approach(target, self.brightness, rate);
        } else {
            self.brightness = 0.0;
        }
    }

    fn read_binary(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        readback: &Readback,
        occlusion: OcclusionQueryHandle,
    ) {
        let pixels = match self.last_frame_issued {
            Some(_) => renderer.pixels_rendered(occlusion),
            None => -1,
        };

        if readback.spew {
            pixvis_debug!(SOURCE,
                "Pixels visible: {} (qh:{}) (frame:{})",
                pixels, occlusion.raw(), readback.frame);
        }

        if pixels < 0 {
            self.flags.set(QueryFlags::FAILED, self.last_frame_issued.is_some());
            return;
        }
        self.flags.insert(QueryFlags::HAS_VALID_RESULTS);

        if self.last_frame_issued == Some(readback.frame - 1) {
            let mut rate = readback.frame_delta_time * readback.fade_rate_inv;
            let mut target = 0.0;
            if pixels > 0 {
                // Fade in slower than out
                rate *= 0.5;
                target = 1.0;
            }
            self.brightness = approach(target, self.brightness, rate);
        } else {
            self.brightness = 0.0;
        }
    }

    /// Draw the proxy inside this query's GPU queries.
    ///
    /// An off-screen proxy is not drawn and does not count as issued; its
    /// clip fraction drops to zero until it comes back on screen.
    pub(crate) fn issue(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        view: &ViewSetup,
        shape: &ProxyShape,
        frame: i64,
        config: &PixelVisibilityConfig,
        spew: bool,
    ) {
        let (Some(occlusion), Some(count)) = (self.occlusion_handle, self.count_handle) else {
            return;
        };
        if self.flags.contains(QueryFlags::FAILED) {
            return;
        }

        let proxy = build_proxy(view, self.origin, shape.size, shape.aspect, shape.screen_space, config);
        let Some(clip_fraction) = screen_clip_fraction(view.view_projection(), &proxy.corners) else {
            self.clip_fraction = 0.0;
            self.flags.remove(QueryFlags::QUERIED_THIS_FRAME);
            return;
        };
        self.clip_fraction = clip_fraction;

        if spew {
            pixvis_debug!(SOURCE,
                "Draw proxy: qh:{} org:<{:.0},{:.0},{:.0}> clip:{:.2} (frame:{})",
                occlusion.raw(), self.origin.x, self.origin.y, self.origin.z,
                clip_fraction, frame);
        }

        if config.partial_queries {
            draw_in_query(renderer, count, &proxy, ProxyMaterial::Counting);
        }
        let material = if config.draw_queries {
            ProxyMaterial::Debug
        } else {
            ProxyMaterial::Occlusion
        };
        draw_in_query(renderer, occlusion, &proxy, material);

        self.last_frame_issued = Some(frame);
        self.flags.remove(QueryFlags::QUERIED_THIS_FRAME);
    }

    /// Forget GPU results so the next owner cannot read this one's
    pub(crate) fn reset_gpu_queries(&mut self, renderer: &mut dyn OcclusionRenderer) {
        for handle in self.occlusion_handle.into_iter().chain(self.count_handle) {
            renderer.reset_occlusion_query(handle);
        }
    }

    /// Release the GPU query objects
    pub(crate) fn destroy(self, renderer: &mut dyn OcclusionRenderer) {
        for handle in self.occlusion_handle.into_iter().chain(self.count_handle) {
            renderer.destroy_occlusion_query(handle);
        }
    }
}

fn draw_in_query(
    renderer: &mut dyn OcclusionRenderer,
    query: OcclusionQueryHandle,
    proxy: &ProxyQuad,
    material: ProxyMaterial,
) {
    renderer.begin_occlusion_query(query);
    renderer.draw_proxy_geometry(proxy, material);
    renderer.end_occlusion_query(query);
}

/// Move `value` toward `target` by at most `speed`
fn approach(target: f32, value: f32, speed: f32) -> f32 {
    let speed = speed.max(0.0);
    value + (target - value).clamp(-speed, speed)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
