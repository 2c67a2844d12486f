/// FrameContext trait - per-frame, per-view state provided by the engine

use glam::Vec3;
use crate::camera::ViewSetup;

/// Highest player slot (split-screen) the cache tracks
pub const MAX_PLAYER_SLOT: u8 = 3;

/// Per-frame context provider.
///
/// Describes the view currently being rendered. The values change between
/// `end_view` calls (split-screen, portals) and between frames.
pub trait FrameContext {
    /// Split-screen player slot being rendered, in `0..=MAX_PLAYER_SLOT`
    fn current_player_slot(&self) -> u8;

    /// Id of the view being rendered. Negative ids are views the cache
    /// must ignore.
    fn current_view_id(&self) -> i32;

    /// Monotonic frame counter
    fn frame_count(&self) -> i64;

    /// Seconds elapsed since the previous frame
    fn frame_delta_time(&self) -> f32;

    /// Camera of the view being rendered
    fn view_setup(&self) -> &ViewSetup;

    /// True while environment maps are being built
    fn building_cubemaps(&self) -> bool {
        false
    }

    /// Cheap trace against world geometry only (no models, no effects).
    ///
    /// # Returns
    ///
    /// `true` if nothing opaque lies between `from` and `to`
    fn is_line_of_sight_clear(&self, from: Vec3, to: Vec3) -> bool;
}
