/*!
# Galaxy 3D Pixel Visibility

Pooled GPU occlusion queries for the Galaxy 3D rendering engine.

Glows, lens flares and other screen-space effects need to know how much of
a point is visible from the current view. This crate answers with a
smoothed fraction in [0, 1] built from hardware occlusion queries drawn
around small proxy quads, read back one frame later.

## Architecture

- **PixelVisibilitySystem**: owned cache driven once per call site, view
  and frame (`get_visibility`, `end_view`, `end_scene`)
- **PixelVisHandle**: generational handle held by each call site
- **OcclusionRenderer**: trait the backend implements to create, draw and
  read occlusion queries
- **FrameContext**: trait the engine implements to describe the view being
  rendered
- **ViewSetup**: camera snapshot used to size and clip proxies

Renderers without occlusion query support fall back to a line-of-sight
trace against world geometry.
*/

// Internal modules
mod error;
mod config;
mod utils;
pub mod log;
pub mod renderer;
pub mod camera;
pub mod visibility;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::PixelVisibilityConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Renderer boundary
    pub mod render {
        pub use crate::renderer::*;
    }

    // Camera snapshot and proxy math
    pub mod camera {
        pub use crate::camera::*;
    }

    // Visibility cache
    pub mod visibility {
        pub use crate::visibility::*;
    }
}

// Re-export math library at crate root
pub use glam;
