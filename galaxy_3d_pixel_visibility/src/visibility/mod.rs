//! Pixel visibility module
//!
//! Pools GPU occlusion queries per call site and per view, and turns their
//! one-frame-late pixel counts into a smoothed visible fraction.

mod handle;
mod params;
mod query;
mod query_pool;
mod set_pool;
mod system;

pub use handle::PixelVisHandle;
pub use params::QueryParams;
pub use query::{QueryFlags, QueryState};
pub use system::{
    PixelVisibilitySystem, PixelVisibilityStats, OcclusionStrategy,
    line_of_sight_visibility,
};
