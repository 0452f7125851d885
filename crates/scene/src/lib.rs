//! Scene graph for the lightbox demo.
//!
//! The graph owns every renderable or lightable node. Lights and meshes are
//! inserted once at startup; light helpers come and go as their visibility
//! toggles change.
//!
//! # Invariants
//! - All mutations flow through explicit graph operations.
//! - A helper proxy is a node of the graph iff its binding is visible.
//! - Node ids are never reused.

pub mod graph;
pub mod helper;
pub mod light;
pub mod object;

pub use graph::{Node, SceneError, SceneGraph};
pub use helper::{HelperBinding, HelperKind, HelperLine, LightHelper, Refreshable};
pub use light::{Light, LightKind, LightParam};
pub use object::{Geometry, Mesh, SharedMaterial, StandardMaterial};

pub fn crate_info() -> &'static str {
    "lightbox-scene v0.1.0"
}
