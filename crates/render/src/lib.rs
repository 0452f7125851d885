//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene graph and camera; they never mutate them.
//! - One `render` call is one draw of the whole scene.
//!
//! The GPU backend lives in `lightbox-render-wgpu`. `DebugTextRenderer`
//! produces a readable frame description for the CLI and for tests.

mod camera;
mod renderer;

pub use camera::PerspectiveCamera;
pub use renderer::{
    CameraSnapshot, DebugTextRenderer, HelperSnapshot, LightSnapshot, MeshSnapshot, Renderer,
    SceneSnapshot,
};

pub fn crate_info() -> &'static str {
    "lightbox-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
