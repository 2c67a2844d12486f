/// Per call site query parameters.

use glam::Vec3;

/// Describes one glow / flare call site.
///
/// Only `position` is read every call. The proxy shape and fade time are
/// captured when the call site's visibility set is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParams {
    /// World position to test
    pub position: Vec3,
    /// Proxy radius (world units, or screen units when `size_is_screen_space`)
    pub proxy_size: f32,
    /// Proxy height / width
    pub proxy_aspect: f32,
    /// Seconds to fade fully in or out. Zero or less selects the default fade.
    pub fade_time: f32,
    /// Keep a constant on-screen proxy size
    pub size_is_screen_space: bool,
}

impl QueryParams {
    /// Parameters with a 2 unit square proxy and the default fade
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            proxy_size: 2.0,
            proxy_aspect: 1.0,
            fade_time: 0.0,
            size_is_screen_space: false,
        }
    }

    /// Set the proxy radius and aspect
    pub fn with_proxy(mut self, size: f32, aspect: f32) -> Self {
        self.proxy_size = size;
        self.proxy_aspect = aspect;
        self
    }

    /// Set the fade time in seconds
    pub fn with_fade_time(mut self, fade_time: f32) -> Self {
        self.fade_time = fade_time;
        self
    }

    /// Size the proxy in screen space
    pub fn in_screen_space(mut self) -> Self {
        self.size_is_screen_space = true;
        self
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
