//! wgpu render backend for the lightbox demo.
//!
//! Draws every mesh lit by every light in the scene graph, then the visible
//! light helpers as lines. Shading is a small forward model, not a
//! physically exact one.
//!
//! # Invariants
//! - Renderer never mutates the scene graph or the camera.
//! - One `render` call draws the whole scene once.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::{MAX_LIGHTS, SurfaceFrame, WgpuRenderer};
