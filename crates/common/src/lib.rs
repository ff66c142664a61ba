//! Shared types used across the viewloop crates.

mod types;

pub use types::{MeshId, Rgba, Transform};
