use crate::error::RenderError;
use crate::viewport::ViewportSize;

/// A camera whose projection depends on the output aspect ratio.
///
/// Implementations cache their projection matrix. Changing the aspect ratio
/// leaves the cache stale until [`Camera::update_projection`] is called.
pub trait Camera {
    fn aspect(&self) -> f32;
    fn set_aspect(&mut self, aspect: f32);
    /// Regenerate the cached projection from the current parameters.
    fn update_projection(&mut self);
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// `render` submits exactly one frame and blocks until it has been handed to
/// the backend. It must not mutate the scene or the camera.
pub trait Renderer<S: ?Sized, C: ?Sized> {
    /// Set the output size in logical pixels.
    fn set_output_size(&mut self, width: u32, height: u32);

    /// Set the ratio between physical and logical pixels.
    fn set_pixel_density(&mut self, ratio: f64);

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &S, camera: &C) -> Result<(), RenderError>;
}

/// Interactive camera controls that advance internal state once per frame.
///
/// Damped controls only move the camera from inside `update`; skipping the
/// call freezes the camera.
pub trait CameraControls<C: ?Sized> {
    fn update(&mut self, camera: &mut C);
}

/// Placeholder controls for loops without any camera interaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl<C: ?Sized> CameraControls<C> for NoControls {
    fn update(&mut self, _camera: &mut C) {}
}

/// The windowing environment the loop runs in.
pub trait Host {
    /// Current drawable-area size in logical pixels.
    fn window_size(&self) -> ViewportSize;

    /// Physical pixels per logical pixel reported by the display.
    fn device_pixel_density(&self) -> f64;

    /// Ask for one more frame before the next repaint.
    fn request_frame(&mut self);
}

/// Notifications a host delivers to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The drawable area or the device pixel density changed.
    Resized,
    /// A frame previously requested with [`Host::request_frame`] is due.
    Frame,
}
