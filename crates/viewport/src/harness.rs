//! Synchronous host used by tests and the headless CLI.
//!
//! Frame requests are recorded instead of waiting for a display refresh;
//! [`ManualHost::pump`] turns each pending request into a tick.

use crate::clock::FrameClock;
use crate::controller::{LoopState, ViewportLoop};
use crate::error::LoopError;
use crate::traits::{Camera, CameraControls, Host, Renderer};
use crate::viewport::ViewportSize;

#[derive(Debug, Clone)]
pub struct ManualHost {
    size: ViewportSize,
    density: f64,
    pending: bool,
    requests: u64,
}

impl ManualHost {
    pub fn new(width: u32, height: u32, density: f64) -> Self {
        Self {
            size: ViewportSize::new(width, height),
            density,
            pending: false,
            requests: 0,
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.size = ViewportSize::new(width, height);
    }

    pub fn set_device_pixel_density(&mut self, density: f64) {
        self.density = density;
    }

    /// Whether the loop asked for a frame that has not been delivered yet.
    pub fn frame_pending(&self) -> bool {
        self.pending
    }

    /// Total number of frame requests seen.
    pub fn frame_requests(&self) -> u64 {
        self.requests
    }

    /// Consume the pending frame request, if any.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    /// Start the loop if it is idle, then deliver requested frames until none
    /// is pending or `max_frames` frames have been rendered.
    ///
    /// Returns the number of frames rendered by this call. A render failure is
    /// returned as-is; the failed tick requested nothing, so pumping again
    /// renders nothing.
    pub fn pump<S, C, R, K, T>(
        &mut self,
        lp: &mut ViewportLoop<S, C, R, K, T>,
        max_frames: u64,
    ) -> Result<u64, LoopError>
    where
        C: Camera,
        R: Renderer<S, C>,
        K: CameraControls<C>,
        T: FrameClock,
    {
        let before = lp.frames();
        if max_frames == 0 {
            return Ok(0);
        }

        if lp.state() == LoopState::Idle {
            lp.start(self)?;
        }

        while lp.frames() - before < max_frames && self.take_frame_request() {
            lp.tick(self)?;
        }

        Ok(lp.frames() - before)
    }
}

impl Host for ManualHost {
    fn window_size(&self) -> ViewportSize {
        self.size
    }

    fn device_pixel_density(&self) -> f64 {
        self.density
    }

    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_recorded_and_taken() {
        let mut host = ManualHost::new(10, 20, 1.5);
        assert!(!host.frame_pending());

        host.request_frame();
        host.request_frame();
        assert!(host.frame_pending());
        assert_eq!(host.frame_requests(), 2);

        assert!(host.take_frame_request());
        assert!(!host.take_frame_request());
    }

    #[test]
    fn reports_window() {
        let mut host = ManualHost::new(10, 20, 1.5);
        assert_eq!(host.window_size(), ViewportSize::new(10, 20));
        assert_eq!(host.device_pixel_density(), 1.5);

        host.set_window_size(30, 40);
        host.set_device_pixel_density(3.0);
        assert_eq!(host.window_size(), ViewportSize::new(30, 40));
        assert_eq!(host.device_pixel_density(), 3.0);
    }
}
