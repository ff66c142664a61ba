//! Rendering Adapter: text renderer implementing the viewport loop's
//! `Renderer` trait.
//!
//! # Invariants
//! - Renderer never mutates the scene or the camera.
//! - Output size and pixel density are whatever the loop last set.

mod renderer;

pub use renderer::DebugTextRenderer;

pub fn crate_info() -> &'static str {
    "viewloop-render v0.1.0"
}
