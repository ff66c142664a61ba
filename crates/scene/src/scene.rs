use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use viewloop_common::{MeshId, Rgba, Transform};

/// A unit box with a transform and a flat colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub transform: Transform,
    pub color: Rgba,
}

/// The set of meshes drawn each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    meshes: BTreeMap<MeshId, Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Three boxes in a row, as laid out by the lighting demos.
    pub fn demo() -> Self {
        let mut scene = Self::new();
        scene.add("left", Transform::at(Vec3::new(-1.5, 0.0, 0.0)), Rgba::from_hex(0x6c5ce7));
        scene.add("center", Transform::default(), Rgba::from_hex(0xf1c40f));
        scene.add("right", Transform::at(Vec3::new(1.5, 0.0, 0.0)), Rgba::from_hex(0xffabac));
        scene
    }

    /// Add a mesh and return its id.
    pub fn add(&mut self, name: impl Into<String>, transform: Transform, color: Rgba) -> MeshId {
        let id = MeshId::new();
        let name = name.into();
        tracing::debug!(id = %id.short(), %name, "mesh added");
        self.meshes.insert(
            id,
            Mesh {
                name,
                transform,
                color,
            },
        );
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    /// Look a mesh up by name. Returns the first match in id order.
    pub fn find(&self, name: &str) -> Option<MeshId> {
        self.meshes
            .iter()
            .find(|(_, mesh)| mesh.name == name)
            .map(|(id, _)| *id)
    }

    pub fn meshes(&self) -> &BTreeMap<MeshId, Mesh> {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert_eq!(scene.len(), 0);
    }

    #[test]
    fn add_get_remove() {
        let mut scene = Scene::new();
        let id = scene.add("cube", Transform::at(Vec3::new(1.0, 2.0, 3.0)), Rgba::WHITE);

        let mesh = scene.get(id).unwrap();
        assert_eq!(mesh.name, "cube");
        assert_eq!(mesh.transform.position, Vec3::new(1.0, 2.0, 3.0));

        scene.get_mut(id).unwrap().color = Rgba::from_hex(0x00ff00);
        assert_eq!(scene.get(id).unwrap().color.0[1], 1.0);

        assert!(scene.remove(id).is_some());
        assert!(scene.get(id).is_none());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn demo_scene_has_three_boxes() {
        let scene = Scene::demo();
        assert_eq!(scene.len(), 3);
        let left = scene.find("left").unwrap();
        assert_eq!(scene.get(left).unwrap().transform.position.x, -1.5);
        assert!(scene.find("missing").is_none());
    }
}
