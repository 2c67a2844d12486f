//! Camera module - view description and proxy geometry.
//!
//! Provides the passive camera snapshot handed over by the engine for each
//! rendered view, and the screen-space math the visibility cache needs to
//! size proxies and measure how much of them lands inside the viewport.

mod view_setup;
mod proxy;

pub use view_setup::ViewSetup;
pub use proxy::{build_proxy, screen_clip_fraction};
