/// Renderer boundary - everything the visibility cache consumes from the engine

// Module declarations
pub mod occlusion_renderer;
pub mod frame_context;

#[cfg(test)]
pub mod mock_renderer;

// Re-export everything
pub use occlusion_renderer::*;
pub use frame_context::*;
