use crate::camera::Orbitable;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;
use viewloop_viewport::{CameraControls, ControlsConfig};

/// Keeps the polar angle away from the poles so `look_at` stays defined.
const POLAR_EPSILON: f32 = 1e-6;

/// Orbit controls: rotate around a target, dolly toward it, pan across it.
///
/// Input methods only accumulate motion. The camera moves in
/// [`CameraControls::update`]: all at once without damping, or a
/// `damping_factor` fraction per update with damping, so the camera keeps
/// gliding after input stops. Assumes a +Y up vector.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    target: Vec3,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
    pending_pan: Vec2,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            target: Vec3::ZERO,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
            pending_pan: Vec2::ZERO,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ControlsConfig, target: Vec3) -> Self {
        Self {
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            ..Self::new(target)
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Queue a rotation in radians. Positive `azimuth` swings the camera to
    /// the left around the target, positive `polar` swings it up.
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        self.pending_theta -= azimuth * self.rotate_speed;
        self.pending_phi -= polar * self.rotate_speed;
    }

    /// Queue a rotation from a pointer drag, where a drag across the full
    /// viewport height turns the camera once around.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate(2.0 * PI * dx / height, 2.0 * PI * dy / height);
    }

    /// Queue a zoom. Positive steps zoom in: perspective cameras move toward
    /// the target, orthographic cameras narrow their frustum.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= 0.95_f32.powf(steps * self.zoom_speed);
    }

    /// Queue a pan in viewport fractions: `(1.0, 0.0)` drags the scene one
    /// viewport height to the right.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vec2::new(dx, dy) * self.pan_speed;
    }

    /// Whether queued motion remains to be applied.
    pub fn is_moving(&self) -> bool {
        const REST: f32 = 1e-5;
        self.pending_theta.abs() > REST
            || self.pending_phi.abs() > REST
            || (self.pending_scale - 1.0).abs() > REST
            || self.pending_pan.length() > REST
    }

    fn step_fraction(&self) -> f32 {
        if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        }
    }
}

impl<C: Orbitable> CameraControls<C> for OrbitControls {
    fn update(&mut self, camera: &mut C) {
        let fraction = self.step_fraction();
        let offset = camera.eye() - self.target;

        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        theta += self.pending_theta * fraction;
        phi += self.pending_phi * fraction;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let scale = if self.pending_scale != 1.0 && camera.zoom_lens(self.pending_scale) {
            1.0
        } else {
            self.pending_scale
        };
        radius = (radius * scale).clamp(self.min_distance, self.max_distance);

        if self.pending_pan != Vec2::ZERO {
            let forward = (-offset).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            let pan = self.pending_pan * fraction * radius.max(f32::EPSILON);
            self.target += -right * pan.x + up * pan.y;
        }

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.set_view(self.target + offset, self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.pending_theta *= keep;
            self.pending_phi *= keep;
            self.pending_pan *= keep;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_pan = Vec2::ZERO;
        }
        self.pending_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use std::f32::consts::FRAC_PI_2;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::default();
        cam.position = position;
        cam.target = Vec3::ZERO;
        cam
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn idle_update_keeps_camera() {
        let mut cam = camera_at(Vec3::new(1.0, 1.0, 2.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.update(&mut cam);
        assert!(close(cam.position, Vec3::new(1.0, 1.0, 2.0)));
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);

        controls.rotate(-FRAC_PI_2, 0.0);
        controls.update(&mut cam);

        assert!(close(cam.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!(!controls.is_moving());

        controls.update(&mut cam);
        assert!(close(cam.position, Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn damped_rotation_glides_and_converges() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;

        controls.rotate(-FRAC_PI_2, 0.0);
        controls.update(&mut cam);
        let first = cam.position;
        assert!(!close(first, Vec3::new(0.0, 0.0, 5.0)));
        assert!(!close(first, Vec3::new(5.0, 0.0, 0.0)));

        // No new input, but the camera keeps moving.
        controls.update(&mut cam);
        assert!(!close(cam.position, first));
        assert!(controls.is_moving());

        for _ in 0..300 {
            controls.update(&mut cam);
        }
        assert!(close(cam.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!(!controls.is_moving());
    }

    #[test]
    fn damped_controls_freeze_without_update() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.rotate(1.0, 0.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn rotation_preserves_distance() {
        let mut cam = camera_at(Vec3::new(1.0, 1.0, 2.0));
        let distance = cam.position.length();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.rotate(0.7, 0.3);
        controls.update(&mut cam);
        assert!((cam.position.length() - distance).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.rotate(0.0, 10.0);
        controls.update(&mut cam);
        assert!(!cam.position.is_nan());
        assert!(!cam.view().is_nan());

        controls.max_polar_angle = FRAC_PI_2;
        controls.rotate(0.0, -10.0);
        controls.update(&mut cam);
        assert!(cam.position.y >= -1e-4);
    }

    #[test]
    fn zoom_moves_toward_target_and_clamps() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.zoom(1.0);
        controls.update(&mut cam);
        assert!((cam.position.z - 9.5).abs() < 1e-4);

        controls.min_distance = 2.0;
        controls.zoom(500.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_zoom_narrows_view_without_moving() {
        use crate::camera::OrthographicCamera;

        let mut cam = OrthographicCamera::new(2.0, 1.0, 0.1, 100.0);
        cam.position = Vec3::new(0.0, 0.0, 5.0);
        let mut controls = OrbitControls::new(Vec3::ZERO);

        controls.zoom(1.0);
        controls.update(&mut cam);

        assert!((cam.half_height - 1.9).abs() < 1e-5);
        assert!(close(cam.position, Vec3::new(0.0, 0.0, 5.0)));
        assert!(!controls.is_moving());
    }

    #[test]
    fn pan_moves_target() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.pan(0.1, 0.0);
        controls.update(&mut cam);
        assert!(controls.target().x < 0.0);
        assert_eq!(cam.target, controls.target());
        assert!(((cam.position - cam.target).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pixel_drag_over_full_height_is_full_turn() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.rotate_by_pixels(300.0, 0.0, 600.0);
        controls.update(&mut cam);
        assert!(close(cam.position, Vec3::new(0.0, 0.0, -5.0)));
    }
}
