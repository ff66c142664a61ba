//! Cameras and camera controls for the viewport loop.
//!
//! # Invariants
//! - A camera's projection matrix only changes inside `update_projection`.
//! - Orbit controls only move the camera inside `update`.

mod camera;
mod orbit;

pub use camera::{Orbitable, OrthographicCamera, PerspectiveCamera};
pub use orbit::OrbitControls;
