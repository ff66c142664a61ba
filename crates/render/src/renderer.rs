use glam::EulerRot;
use std::fmt::Write;
use viewloop_camera::Orbitable;
use viewloop_scene::Scene;
use viewloop_viewport::{Camera, RenderError, Renderer, ViewportSize};

/// Debug text renderer: a stand-in for the GPU backend.
///
/// Each frame produces a human-readable description of the camera and the
/// scene. Useful for CLI output, logging, and testing the loop. It can be
/// armed to fail on a given frame to simulate losing the graphics context.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    output_size: ViewportSize,
    pixel_density: f64,
    frames: u64,
    last_frame: Option<String>,
    fail_at: Option<u64>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self {
            pixel_density: 1.0,
            ..Self::default()
        }
    }

    /// Fail with a context-loss error when asked to render frame `frame`
    /// (0-based).
    pub fn fail_at(mut self, frame: u64) -> Self {
        self.fail_at = Some(frame);
        self
    }

    pub fn output_size(&self) -> ViewportSize {
        self.output_size
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    /// Number of frames rendered successfully.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    fn describe<C: Camera + Orbitable>(&self, scene: &Scene, camera: &C) -> String {
        let (pw, ph) = self.output_size.physical(self.pixel_density);
        let eye = camera.eye();
        let target = camera.look_target();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({} @{:.2}x -> {pw}x{ph}) ===",
            self.frames, self.output_size, self.pixel_density
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) aspect={:.4}",
            eye.x,
            eye.y,
            eye.z,
            target.x,
            target.y,
            target.z,
            camera.aspect()
        );
        let _ = writeln!(out, "Meshes: {}", scene.len());

        for (id, mesh) in scene.meshes() {
            let p = mesh.transform.position;
            let (rx, ry, rz) = mesh.transform.rotation.to_euler(EulerRot::XYZ);
            let _ = writeln!(
                out,
                "  [{}] {} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
                id.short(),
                mesh.name,
                p.x,
                p.y,
                p.z,
                rx,
                ry,
                rz
            );
        }

        out
    }
}

impl<C: Camera + Orbitable> Renderer<Scene, C> for DebugTextRenderer {
    fn set_output_size(&mut self, width: u32, height: u32) {
        self.output_size = ViewportSize::new(width, height);
    }

    fn set_pixel_density(&mut self, ratio: f64) {
        self.pixel_density = ratio;
    }

    fn render(&mut self, scene: &Scene, camera: &C) -> Result<(), RenderError> {
        if self.fail_at == Some(self.frames) {
            return Err(RenderError::ContextLost(format!(
                "debug renderer armed to fail at frame {}",
                self.frames
            )));
        }

        let text = self.describe(scene, camera);
        tracing::trace!("{text}");
        self.last_frame = Some(text);
        self.frames += 1;
        Ok(())
    }
}
