/// Arena of visibility sets, one per call site.
///
/// A set is either on the active list or on the free list. Freeing a set
/// bumps its generation so every handle issued for the previous owner
/// stops resolving.

use crate::config::PixelVisibilityConfig;
use crate::error::{Error, Result};
use crate::utils::{ListHead, MultiList};
use crate::pixvis_trace;
use super::handle::PixelVisHandle;
use super::params::QueryParams;
use super::query::ProxyShape;

const SOURCE: &str = "galaxy3d::PixelVisibility::SetPool";

/// Per call site state: proxy shape, fade rate and the queries issued for
/// each view the site was seen in.
#[derive(Debug, Clone, Default)]
pub(crate) struct VisibilitySet {
    pub(crate) proxy_size: f32,
    pub(crate) proxy_aspect: f32,
    pub(crate) fade_rate_inv: f32,
    pub(crate) size_is_screen_space: bool,
    pub(crate) generation: u16,
    pub(crate) in_use: bool,
    pub(crate) queries: ListHead,
    pub(crate) frame_referenced: i64,
}

impl VisibilitySet {
    /// Capture the call site's proxy shape and fade rate
    pub(crate) fn configure(&mut self, params: &QueryParams, config: &PixelVisibilityConfig) {
        self.proxy_size = params.proxy_size;
        self.proxy_aspect = params.proxy_aspect;
        self.fade_rate_inv = config.fade_rate_inv(params.fade_time);
        self.size_is_screen_space = params.size_is_screen_space;
    }

    pub(crate) fn mark_active(&mut self, frame: i64) {
        self.frame_referenced = frame;
    }

    /// Referenced during `frame` or the previous frame
    pub(crate) fn is_active(&self, frame: i64) -> bool {
        frame - self.frame_referenced <= 1
    }

    pub(crate) fn shape(&self) -> ProxyShape {
        ProxyShape {
            size: self.proxy_size,
            aspect: self.proxy_aspect,
            screen_space: self.size_is_screen_space,
        }
    }
}

pub(crate) struct SetPool {
    sets: MultiList<VisibilitySet>,
    active: ListHead,
    free: ListHead,
    limit: u32,
}

impl SetPool {
    pub(crate) fn new() -> Self {
        Self::with_limit(PixelVisHandle::MAX_INDEX as u32 + 1)
    }

    /// Pool holding at most `limit` sets
    pub(crate) fn with_limit(limit: u32) -> Self {
        Self {
            sets: MultiList::new(),
            active: ListHead::new(),
            free: ListHead::new(),
            limit: limit.min(PixelVisHandle::MAX_INDEX as u32 + 1),
        }
    }

    /// Take a set from the free list (or grow the arena) and link it into
    /// the active list.
    ///
    /// # Errors
    ///
    /// Returns `Error::PoolExhausted` when every encodable index is in use.
    pub(crate) fn alloc(&mut self) -> Result<u16> {
        let index = match self.sets.pop_head(&mut self.free) {
            Some(index) => index,
            None => {
                if self.sets.capacity() >= self.limit {
                    return Err(Error::PoolExhausted(format!(
                        "all {} visibility sets are in use", self.limit)));
                }
                let index = self.sets.push_node(VisibilitySet::default());
                pixvis_trace!(SOURCE, "Created visibility set {} (total {})", index, self.sets.capacity());
                index
            }
        };

        self.sets.link_to_head(&mut self.active, index);
        if let Some(set) = self.sets.get_mut(index) {
            set.in_use = true;
        }
        Ok(index as u16)
    }

    /// Move a set to the free list and invalidate its handles.
    ///
    /// The set's queries must have been released already.
    pub(crate) fn free(&mut self, index: u16) {
        let index = index as u32;
        let Some(set) = self.sets.get_mut(index) else {
            return;
        };
        if !set.in_use {
            return;
        }
        debug_assert!(set.queries.is_empty(), "freeing set {} with live queries", index);
        set.in_use = false;
        set.generation = set.generation.wrapping_add(1);
        set.queries = ListHead::new();

        self.sets.unlink(&mut self.active, index);
        self.sets.link_to_head(&mut self.free, index);
    }

    /// Index of the live set a handle refers to
    pub(crate) fn lookup(&self, handle: PixelVisHandle) -> Option<u16> {
        let index = handle.index()?;
        let set = self.sets.get(index as u32)?;
        (set.in_use && set.generation == handle.generation()).then_some(index)
    }

    /// Handle for the set currently at `index`
    pub(crate) fn handle_for(&self, index: u16) -> PixelVisHandle {
        match self.sets.get(index as u32) {
            Some(set) if set.in_use => PixelVisHandle::new(set.generation, index),
            _ => PixelVisHandle::NONE,
        }
    }

    pub(crate) fn get(&self, index: u16) -> Option<&VisibilitySet> {
        self.sets.get(index as u32)
    }

    pub(crate) fn get_mut(&mut self, index: u16) -> Option<&mut VisibilitySet> {
        self.sets.get_mut(index as u32)
    }

    /// Active set indices, most recently allocated first
    pub(crate) fn active_indices(&self) -> Vec<u16> {
        self.sets.iter(&self.active).map(|(index, _)| index as u16).collect()
    }

    pub(crate) fn active_count(&self) -> u32 {
        self.active.len()
    }

    pub(crate) fn free_count(&self) -> u32 {
        self.free.len()
    }
}

#[cfg(test)]
#[path = "set_pool_tests.rs"]
mod tests;
