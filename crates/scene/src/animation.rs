//! Ready-made per-frame update hooks.
//!
//! Both hooks derive the transform from elapsed time rather than accumulating
//! deltas, so the motion looks the same at any frame rate.

use crate::scene::Scene;
use glam::{Quat, Vec3};
use viewloop_common::MeshId;
use viewloop_viewport::FrameTime;

/// Rotates a mesh at a constant angular velocity (radians per second, per axis).
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    pub mesh: MeshId,
    pub rate: Vec3,
}

impl Spin {
    pub fn new(mesh: MeshId, rate: Vec3) -> Self {
        Self { mesh, rate }
    }

    pub fn apply(&self, scene: &mut Scene, time: FrameTime) {
        if let Some(mesh) = scene.get_mut(self.mesh) {
            let angles = self.rate * time.elapsed as f32;
            mesh.transform.rotation =
                Quat::from_euler(glam::EulerRot::XYZ, angles.x, angles.y, angles.z);
        }
    }

    /// Turn into a hook for [`viewloop_viewport::ViewportLoop::add_update`].
    pub fn into_hook(self) -> impl FnMut(&mut Scene, FrameTime) + 'static {
        move |scene: &mut Scene, time: FrameTime| self.apply(scene, time)
    }
}

/// Moves a mesh on a horizontal circle around its starting point.
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    pub mesh: MeshId,
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    origin: Option<Vec3>,
}

impl Drift {
    pub fn new(mesh: MeshId, radius: f32, speed: f32) -> Self {
        Self {
            mesh,
            radius,
            speed,
            origin: None,
        }
    }

    pub fn apply(&mut self, scene: &mut Scene, time: FrameTime) {
        let Some(mesh) = scene.get_mut(self.mesh) else {
            return;
        };
        let origin = *self.origin.get_or_insert(mesh.transform.position);
        let angle = self.speed * time.elapsed as f32;
        mesh.transform.position =
            origin + Vec3::new(angle.cos() - 1.0, 0.0, angle.sin()) * self.radius;
    }

    pub fn into_hook(mut self) -> impl FnMut(&mut Scene, FrameTime) + 'static {
        move |scene: &mut Scene, time: FrameTime| self.apply(scene, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewloop_common::{Rgba, Transform};

    fn at(elapsed: f64) -> FrameTime {
        FrameTime {
            elapsed,
            delta: 0.0,
            frame: 0,
        }
    }

    #[test]
    fn spin_follows_elapsed_time() {
        let mut scene = Scene::new();
        let id = scene.add("cube", Transform::default(), Rgba::WHITE);
        let mut hook = Spin::new(id, Vec3::new(0.15, 0.1, 0.0)).into_hook();

        hook(&mut scene, at(0.0));
        assert_eq!(scene.get(id).unwrap().transform.rotation, Quat::IDENTITY);

        hook(&mut scene, at(10.0));
        let expected = Quat::from_euler(glam::EulerRot::XYZ, 1.5, 1.0, 0.0);
        assert!(scene.get(id).unwrap().transform.rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn drift_starts_at_origin_and_circles() {
        let mut scene = Scene::new();
        let id = scene.add("cube", Transform::at(Vec3::new(2.0, 1.0, 0.0)), Rgba::WHITE);
        let mut drift = Drift::new(id, 1.0, std::f32::consts::PI);

        drift.apply(&mut scene, at(0.0));
        assert!(scene.get(id).unwrap().transform.position.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-6));

        // Half a turn: opposite side of the circle.
        drift.apply(&mut scene, at(1.0));
        assert!(scene.get(id).unwrap().transform.position.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn hooks_ignore_missing_meshes() {
        let mut scene = Scene::new();
        let gone = scene.add("gone", Transform::default(), Rgba::WHITE);
        scene.remove(gone);

        Spin::new(gone, Vec3::ONE).apply(&mut scene, at(1.0));
        Drift::new(gone, 1.0, 1.0).apply(&mut scene, at(1.0));
        assert!(scene.is_empty());
    }
}
