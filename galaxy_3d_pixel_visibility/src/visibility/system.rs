/// Pixel visibility system - pooled occlusion queries with smoothing.
///
/// Glows, flares and other screen effects ask "how much of this point is
/// visible?" once per frame through `get_visibility`. Each call site owns a
/// visibility set, addressed by a [`PixelVisHandle`]; each set keeps one
/// query per (player slot, view) it was seen in. Proxies are drawn in
/// `end_view`, read back one frame later, and `end_scene` recycles whatever
/// was not used in the last two frames.
///
/// # Frame sequence
///
/// ```text
/// level_init(renderer)
/// per frame:
///     per view:  get_visibility(...)*  then  end_view(...)
///     end_scene(...)
/// level_shutdown(renderer)
/// ```

use glam::Vec3;
use crate::config::PixelVisibilityConfig;
use crate::error::Result;
use crate::renderer::{FrameContext, OcclusionRenderer, MAX_PLAYER_SLOT};
use crate::{pixvis_debug, pixvis_info, pixvis_warn};
use super::handle::PixelVisHandle;
use super::params::QueryParams;
use super::query::{QueryState, Readback};
use super::query_pool::QueryPool;
use super::set_pool::SetPool;

const SOURCE: &str = "galaxy3d::PixelVisibility";

/// How visibility is measured for the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionStrategy {
    /// Pooled GPU occlusion queries with smoothing
    HardwareQueries,
    /// Binary trace against world geometry, no pooling
    LineOfSight,
}

/// Pool occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelVisibilityStats {
    /// Sets referenced recently enough to be kept
    pub active_sets: u32,
    /// Recycled sets waiting for a new call site
    pub free_sets: u32,
    /// Queries ever created (each owns two GPU query objects)
    pub allocated_queries: u32,
    /// Queries waiting on the free list
    pub free_queries: u32,
}

/// Owned pixel visibility cache.
pub struct PixelVisibilitySystem {
    config: PixelVisibilityConfig,
    strategy: OcclusionStrategy,
    sets: SetPool,
    queries: QueryPool,
}

impl PixelVisibilitySystem {
    /// Create an empty cache. Until `level_init` runs every query takes
    /// the line-of-sight path.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(config: PixelVisibilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            strategy: OcclusionStrategy::LineOfSight,
            sets: SetPool::new(),
            queries: QueryPool::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_set_limit(config: PixelVisibilityConfig, limit: u32) -> Result<Self> {
        let mut system = Self::new(config)?;
        system.sets = SetPool::with_limit(limit);
        Ok(system)
    }

    // ===== CONFIGURATION =====

    pub fn config(&self) -> &PixelVisibilityConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Mode switches apply from the next readback. Proxy shapes and fade
    /// rates already captured by existing sets are kept. `enabled` is only
    /// read by `level_init`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` and keeps the current configuration
    /// if `config` does not validate.
    pub fn set_config(&mut self, config: PixelVisibilityConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn strategy(&self) -> OcclusionStrategy {
        self.strategy
    }

    // ===== LEVEL LIFECYCLE =====

    /// Pick the occlusion strategy for the level being loaded
    pub fn level_init(&mut self, renderer: &dyn OcclusionRenderer) {
        self.strategy = if self.config.enabled && renderer.supports_occlusion_queries() {
            OcclusionStrategy::HardwareQueries
        } else {
            OcclusionStrategy::LineOfSight
        };
        pixvis_info!(SOURCE, "Occlusion strategy: {:?}", self.strategy);
    }

    /// Free every set and destroy every query with its GPU objects.
    ///
    /// Handles from the finished level go stale. The set arena itself is
    /// kept so they keep being recognized as stale.
    pub fn level_shutdown(&mut self, renderer: &mut dyn OcclusionRenderer) {
        let freed = self.sets.active_count();
        for index in self.sets.active_indices() {
            self.free_set(renderer, index);
        }
        let destroyed = self.queries.allocated();
        self.queries.destroy_all(renderer);
        pixvis_info!(SOURCE, "Level shutdown: freed {} sets, destroyed {} queries",
            freed, destroyed);
    }

    // ===== PER CALL =====

    /// Smoothed visible fraction of `params.position` for the view being
    /// rendered, in [0, 1].
    ///
    /// `handle` starts as [`PixelVisHandle::NONE`]; the first call creates
    /// the call site's set and writes its handle back. A stale handle is
    /// silently replaced the same way.
    ///
    /// The value comes from proxies drawn in earlier frames, so a new call
    /// site starts dark and fades in.
    pub fn get_visibility(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        frame: &dyn FrameContext,
        params: &QueryParams,
        handle: &mut PixelVisHandle,
    ) -> f32 {
        if self.strategy == OcclusionStrategy::LineOfSight || frame.building_cubemaps() {
            return line_of_sight_visibility(frame, params.position);
        }

        let view_id = frame.current_view_id();
        if view_id < 0 {
            return 0.0;
        }
        let player_slot = frame.current_player_slot();
        debug_assert!(player_slot <= MAX_PLAYER_SLOT, "player slot {} out of range", player_slot);
        let frame_count = frame.frame_count();

        let set_index = match self.sets.lookup(*handle) {
            Some(index) => index,
            None => match self.sets.alloc() {
                Ok(index) => {
                    if let Some(set) = self.sets.get_mut(index) {
                        set.configure(params, &self.config);
                    }
                    *handle = self.sets.handle_for(index);
                    index
                }
                Err(err) => {
                    pixvis_warn!(SOURCE, "{}, reporting zero visibility", err);
                    return 0.0;
                }
            },
        };

        let Some(set) = self.sets.get_mut(set_index) else {
            return 0.0;
        };
        set.mark_active(frame_count);
        let fade_rate_inv = set.fade_rate_inv;
        let mut owner = set.queries;

        let query_index = match self.queries.find(&owner, player_slot, view_id) {
            Some(index) => index,
            None => {
                let index = self.queries.alloc_into(renderer, &mut owner, player_slot, view_id);
                if let Some(set) = self.sets.get_mut(set_index) {
                    set.queries = owner;
                }
                index
            }
        };

        let readback = Readback {
            frame: frame_count,
            frame_delta_time: frame.frame_delta_time(),
            fade_rate_inv,
            partial: self.config.partial_queries,
            full_visibility_snap: self.config.full_visibility_snap,
            spew: self.spews(view_id),
        };

        match self.queries.get_mut(query_index) {
            Some(query) => {
                query.origin = params.position;
                query.fraction_visible(renderer, &readback)
            }
            None => 0.0,
        }
    }

    // ===== FRAME PHASES =====

    /// Draw the proxies of every active set for the view that just finished
    /// rendering. Only queries created by `get_visibility` for this view
    /// are issued.
    pub fn end_view(&mut self, renderer: &mut dyn OcclusionRenderer, frame: &dyn FrameContext) {
        if self.strategy != OcclusionStrategy::HardwareQueries || frame.building_cubemaps() {
            return;
        }
        let view_id = frame.current_view_id();
        if view_id < 0 {
            return;
        }
        let player_slot = frame.current_player_slot();
        let frame_count = frame.frame_count();
        let spew = self.spews(view_id);

        for set_index in self.sets.active_indices() {
            let Some(set) = self.sets.get(set_index) else {
                continue;
            };
            let shape = set.shape();
            let Some(query_index) = self.queries.find(&set.queries, player_slot, view_id) else {
                continue;
            };
            if let Some(query) = self.queries.get_mut(query_index) {
                query.issue(renderer, frame.view_setup(), &shape, frame_count, &self.config, spew);
            }
        }
    }

    /// Recycle what the last two frames did not use.
    ///
    /// A set not referenced during this frame or the previous one is freed
    /// with all its queries. Otherwise the set loses the queries that were
    /// not issued during this frame or the previous one, and is freed too
    /// once it has none left.
    pub fn end_scene(&mut self, renderer: &mut dyn OcclusionRenderer, frame: &dyn FrameContext) {
        let frame_count = frame.frame_count();
        let mut freed_sets = 0;
        let mut released_queries = 0;

        for set_index in self.sets.active_indices() {
            let Some(set) = self.sets.get(set_index) else {
                continue;
            };
            if !set.is_active(frame_count) {
                released_queries += set.queries.len();
                self.free_set(renderer, set_index);
                freed_sets += 1;
                continue;
            }

            let mut owner = set.queries;
            released_queries += self.queries.release_inactive(renderer, &mut owner, frame_count);
            if let Some(set) = self.sets.get_mut(set_index) {
                set.queries = owner;
            }
            if owner.is_empty() {
                self.sets.free(set_index);
                freed_sets += 1;
            }
        }

        if self.config.spew && (freed_sets > 0 || released_queries > 0) {
            pixvis_debug!(SOURCE, "End scene: freed {} sets, released {} queries (frame:{})",
                freed_sets, released_queries, frame_count);
        }
    }

    /// Hand the queries of a transient view id over to another id.
    ///
    /// For every active set, a query already bound to
    /// `(player_slot, dest_view_id)` is released and the query bound to
    /// `(player_slot, source_view_id)` takes its place, keeping its origin,
    /// brightness and GPU state.
    pub fn shift_views(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        player_slot: u8,
        source_view_id: i32,
        dest_view_id: i32,
    ) {
        if source_view_id == dest_view_id {
            return;
        }

        for set_index in self.sets.active_indices() {
            let Some(set) = self.sets.get(set_index) else {
                continue;
            };
            let mut owner = set.queries;

            if let Some(orphan) = self.queries.find(&owner, player_slot, dest_view_id) {
                self.queries.free_from(renderer, &mut owner, orphan);
            }
            if let Some(moved) = self.queries.find(&owner, player_slot, source_view_id) {
                if let Some(query) = self.queries.get_mut(moved) {
                    query.rebind_view(dest_view_id);
                }
            }

            if let Some(set) = self.sets.get_mut(set_index) {
                set.queries = owner;
            }
        }
    }

    // ===== INTROSPECTION =====

    pub fn stats(&self) -> PixelVisibilityStats {
        PixelVisibilityStats {
            active_sets: self.sets.active_count(),
            free_sets: self.sets.free_count(),
            allocated_queries: self.queries.allocated(),
            free_queries: self.queries.free_count(),
        }
    }

    /// Whether `handle` still refers to a live set
    pub fn is_handle_valid(&self, handle: PixelVisHandle) -> bool {
        self.sets.lookup(handle).is_some()
    }

    /// Snapshot of the query a set holds for (player slot, view)
    pub fn query_state(
        &self,
        handle: PixelVisHandle,
        player_slot: u8,
        view_id: i32,
    ) -> Option<QueryState> {
        let set = self.sets.get(self.sets.lookup(handle)?)?;
        let index = self.queries.find(&set.queries, player_slot, view_id)?;
        self.queries.get(index).map(|query| query.state())
    }

    // ===== INTERNAL =====

    fn spews(&self, view_id: i32) -> bool {
        self.config.spew && view_id == 0
    }

    fn free_set(&mut self, renderer: &mut dyn OcclusionRenderer, set_index: u16) {
        let Some(set) = self.sets.get_mut(set_index) else {
            return;
        };
        let mut owner = set.queries;
        self.queries.release_all(renderer, &mut owner);
        if let Some(set) = self.sets.get_mut(set_index) {
            set.queries = owner;
        }
        self.sets.free(set_index);
    }
}

/// Binary visibility from a world-geometry trace between the view origin
/// and `position`: 1.0 when clear, else 0.0.
pub fn line_of_sight_visibility(frame: &dyn FrameContext, position: Vec3) -> f32 {
    if frame.is_line_of_sight_clear(frame.view_setup().origin(), position) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
