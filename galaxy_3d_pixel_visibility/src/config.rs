/// Pixel visibility configuration
///
/// Tunables for the query cache. Defaults match what the glow and lens
/// flare call sites were tuned against; the debug switches are off.

use crate::error::Result;
use crate::pixvis_bail;

/// Pixel visibility configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PixelVisibilityConfig {
    /// Use hardware occlusion queries when the renderer supports them.
    /// When false, the line-of-sight fallback is always selected.
    pub enabled: bool,
    /// Partial mode: visible fraction = visible pixels / possible pixels.
    /// Binary mode (false): any visible pixel counts as fully visible.
    pub partial_queries: bool,
    /// Draw proxies with a visible debug material
    pub draw_queries: bool,
    /// Log per-query pixel counts and proxy draws for view 0
    pub spew: bool,
    /// Minimum on-screen diameter of a proxy, in pixels
    pub min_proxy_pixels: f32,
    /// Distance in front of the eye at which screen-space proxies are sized
    pub screen_space_reference_distance: f32,
    /// Partial-mode ratio above which the target snaps to fully visible
    pub full_visibility_snap: f32,
    /// Fade time (seconds) used when a call site passes zero or less
    pub default_fade_time: f32,
}

impl Default for PixelVisibilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            partial_queries: true,
            draw_queries: false,
            spew: false,
            min_proxy_pixels: 5.0,
            screen_space_reference_distance: 1.0,
            full_visibility_snap: 0.95,
            default_fade_time: 0.0625,
        }
    }
}

impl PixelVisibilityConfig {
    /// Check every numeric field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_proxy_pixels.is_finite() && self.min_proxy_pixels > 0.0) {
            pixvis_bail!("galaxy3d::PixelVisibilityConfig",
                "min_proxy_pixels must be a positive finite value (got {})",
                self.min_proxy_pixels);
        }
        if !(self.screen_space_reference_distance.is_finite()
            && self.screen_space_reference_distance > 0.0)
        {
            pixvis_bail!("galaxy3d::PixelVisibilityConfig",
                "screen_space_reference_distance must be a positive finite value (got {})",
                self.screen_space_reference_distance);
        }
        if !(self.full_visibility_snap > 0.0 && self.full_visibility_snap <= 1.0) {
            pixvis_bail!("galaxy3d::PixelVisibilityConfig",
                "full_visibility_snap must be in (0, 1] (got {})",
                self.full_visibility_snap);
        }
        if !(self.default_fade_time.is_finite() && self.default_fade_time > 0.0) {
            pixvis_bail!("galaxy3d::PixelVisibilityConfig",
                "default_fade_time must be a positive finite value (got {})",
                self.default_fade_time);
        }
        Ok(())
    }

    /// Inverse fade time for a call site, falling back to the default
    /// fade when the site did not ask for one.
    pub fn fade_rate_inv(&self, fade_time: f32) -> f32 {
        if fade_time > 0.0 {
            1.0 / fade_time
        } else {
            1.0 / self.default_fade_time
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
