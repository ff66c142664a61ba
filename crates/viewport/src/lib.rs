//! Viewport Loop Controller: keeps the rendered image consistent with the host
//! window and drives a self-rescheduling per-frame tick.
//!
//! # Invariants
//! - Camera aspect always equals `width / height` of the last non-zero-height resize.
//! - Renderer pixel density never exceeds the configured maximum (2.0 by default).
//! - Within one tick, update hooks run before controls, controls before render,
//!   render before the next frame is requested.
//! - A failed render never requests another frame.

pub mod clock;
pub mod config;
mod controller;
mod error;
pub mod harness;
mod traits;
mod viewport;

pub use clock::{FrameClock, FrameTime, InstantClock, SteppedClock};
pub use config::{CameraConfig, ControlsConfig, LoopConfig, ViewerConfig, WindowConfig};
pub use controller::{LoopState, UpdateHook, ViewportContext, ViewportLoop};
pub use error::{ConfigError, LoopError, RenderError};
pub use harness::ManualHost;
pub use traits::{Camera, CameraControls, Host, HostEvent, NoControls, Renderer};
pub use viewport::{PixelDensity, ViewportSize};

pub fn crate_info() -> &'static str {
    "viewloop-viewport v0.1.0"
}
