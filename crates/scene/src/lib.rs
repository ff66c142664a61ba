//! Scene: the meshes a viewport loop renders and its update hooks mutate.
//!
//! # Invariants
//! - Iteration order is deterministic (BTreeMap keyed by mesh id).
//! - Renderers only read the scene; mutation happens in update hooks.

pub mod animation;
mod scene;

pub use animation::{Drift, Spin};
pub use scene::{Mesh, Scene};
