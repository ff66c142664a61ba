use glam::{Mat4, Vec3};
use viewloop_viewport::{Camera, CameraConfig};

/// Cameras that can be placed by orbit controls.
pub trait Orbitable {
    fn eye(&self) -> Vec3;
    fn look_target(&self) -> Vec3;
    fn set_view(&mut self, eye: Vec3, target: Vec3);

    /// Zoom the lens by `factor` (below 1 zooms in) without moving the eye.
    ///
    /// Returns `false` for cameras that zoom by moving closer instead.
    fn zoom_lens(&mut self, _factor: f32) -> bool {
        false
    }
}

/// Smallest orthographic half-height reachable by zooming.
const MIN_HALF_HEIGHT: f32 = 1e-3;

fn usable_aspect(aspect: f32) -> bool {
    aspect.is_finite() && aspect > 0.0
}

/// Perspective camera with a cached projection matrix.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut cam = Self::new(config.fov_degrees, aspect, config.near, config.far);
        cam.position = Vec3::from_array(config.position);
        cam.target = Vec3::from_array(config.target);
        cam
    }

    /// The projection as of the last `update_projection` call.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

impl Camera for PerspectiveCamera {
    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn update_projection(&mut self) {
        if !usable_aspect(self.aspect) {
            tracing::debug!(aspect = self.aspect, "degenerate aspect, projection kept");
            return;
        }
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }
}

impl Orbitable for PerspectiveCamera {
    fn eye(&self) -> Vec3 {
        self.position
    }

    fn look_target(&self) -> Vec3 {
        self.target
    }

    fn set_view(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        self.target = target;
    }
}

/// Orthographic camera whose horizontal extent follows the aspect ratio.
///
/// The frustum spans `[-half_height * aspect, half_height * aspect]`
/// horizontally and `[-half_height, half_height]` vertically, so a square
/// stays square on a wide canvas.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub half_height: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new(1.0, 16.0 / 9.0, 0.1, 100.0)
    }
}

impl OrthographicCamera {
    pub fn new(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            half_height,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }
}

impl Camera for OrthographicCamera {
    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn update_projection(&mut self) {
        if !usable_aspect(self.aspect) {
            tracing::debug!(aspect = self.aspect, "degenerate aspect, projection kept");
            return;
        }
        let half_width = self.half_height * self.aspect;
        self.projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -self.half_height,
            self.half_height,
            self.near,
            self.far,
        );
    }
}

impl Orbitable for OrthographicCamera {
    fn eye(&self) -> Vec3 {
        self.position
    }

    fn look_target(&self) -> Vec3 {
        self.target
    }

    fn set_view(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        self.target = target;
    }

    /// Moving an orthographic camera does not change its image size, so zoom
    /// scales the frustum and refreshes the projection.
    fn zoom_lens(&mut self, factor: f32) -> bool {
        if factor.is_finite() && factor > 0.0 {
            self.half_height = (self.half_height * factor).max(MIN_HALF_HEIGHT);
            self.update_projection();
        }
        true
    }
}
