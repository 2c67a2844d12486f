/// Shared pool of occlusion queries.
///
/// Every query lives in one arena. A query is either linked into the free
/// list or into the query list of the visibility set that owns it. Freed
/// queries keep their GPU objects and are handed out again as-is.

use crate::renderer::OcclusionRenderer;
use crate::utils::{ListHead, MultiList};
use crate::pixvis_trace;
use super::query::Query;

const SOURCE: &str = "galaxy3d::PixelVisibility::QueryPool";

pub(crate) struct QueryPool {
    queries: MultiList<Query>,
    free: ListHead,
}

impl QueryPool {
    pub(crate) fn new() -> Self {
        Self {
            queries: MultiList::new(),
            free: ListHead::new(),
        }
    }

    /// Take a query from the free list (or create one), bind it to the
    /// view and link it into `owner`.
    pub(crate) fn alloc_into(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        owner: &mut ListHead,
        player_slot: u8,
        view_id: i32,
    ) -> u32 {
        let index = match self.queries.pop_head(&mut self.free) {
            Some(index) => index,
            None => {
                let index = self.queries.push_node(Query::create(renderer));
                pixvis_trace!(SOURCE, "Created query {} (total {})", index, self.queries.capacity());
                index
            }
        };

        if let Some(query) = self.queries.get_mut(index) {
            query.bind_view(player_slot, view_id);
        }
        self.queries.link_to_head(owner, index);
        index
    }

    /// Unlink a query from `owner`, drop its GPU results and return it to
    /// the free list.
    pub(crate) fn free_from(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        owner: &mut ListHead,
        index: u32,
    ) {
        self.queries.unlink(owner, index);
        if let Some(query) = self.queries.get_mut(index) {
            query.reset_gpu_queries(renderer);
        }
        self.queries.link_to_head(&mut self.free, index);
    }

    /// Query of `owner` bound to (player slot, view)
    pub(crate) fn find(&self, owner: &ListHead, player_slot: u8, view_id: i32) -> Option<u32> {
        self.queries.find(owner, |query| query.is_for_view(player_slot, view_id))
    }

    pub(crate) fn get(&self, index: u32) -> Option<&Query> {
        self.queries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut Query> {
        self.queries.get_mut(index)
    }

    /// Queries linked into `owner`, head first
    #[cfg(test)]
    pub(crate) fn indices(&self, owner: &ListHead) -> Vec<u32> {
        self.queries.iter(owner).map(|(index, _)| index).collect()
    }

    /// Return every query of `owner` to the free list
    pub(crate) fn release_all(&mut self, renderer: &mut dyn OcclusionRenderer, owner: &mut ListHead) {
        while let Some(index) = owner.head() {
            self.free_from(renderer, owner, index);
        }
    }

    /// Return the queries of `owner` not issued during `frame` or the
    /// previous frame. Returns how many were released.
    pub(crate) fn release_inactive(
        &mut self,
        renderer: &mut dyn OcclusionRenderer,
        owner: &mut ListHead,
        frame: i64,
    ) -> u32 {
        let mut released = 0;
        let mut cursor = owner.head();
        while let Some(index) = cursor {
            cursor = self.queries.next(index);
            let inactive = self.queries.get(index).is_some_and(|query| !query.is_active(frame));
            if inactive {
                self.free_from(renderer, owner, index);
                released += 1;
            }
        }
        released
    }

    /// Destroy every query and its GPU objects.
    ///
    /// Every owner list threaded through this pool becomes invalid; the
    /// caller must drop them too.
    pub(crate) fn destroy_all(&mut self, renderer: &mut dyn OcclusionRenderer) {
        for query in self.queries.drain() {
            query.destroy(renderer);
        }
        self.free = ListHead::new();
    }

    /// Number of queries ever created
    pub(crate) fn allocated(&self) -> u32 {
        self.queries.capacity()
    }

    /// Number of queries on the free list
    pub(crate) fn free_count(&self) -> u32 {
        self.free.len()
    }
}

#[cfg(test)]
#[path = "query_pool_tests.rs"]
mod tests;
