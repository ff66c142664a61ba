//! wgpu render backend for the viewport loop.
//!
//! Renders a grid floor and one lit, instanced box per scene mesh.
//!
//! # Invariants
//! - Renderer never mutates the scene or the camera.
//! - The surface always matches the window in physical pixels.
//! - The scene is drawn at `floor(logical size * pixel density)`, at least 1x1,
//!   and stretched over the surface when that is smaller.
//! - Lost or outdated surfaces skip the frame; other surface errors halt the loop.

mod gpu;
mod shaders;
mod target;

pub use gpu::{GpuInitError, WgpuRenderer};
