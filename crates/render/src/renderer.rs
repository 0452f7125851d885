use glam::Vec3;
use lightbox_common::NodeId;
use lightbox_scene::{LightKind, SceneGraph};
use serde::Serialize;

use crate::camera::PerspectiveCamera;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and the camera, then produces output.
/// It never mutates either.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Draw one frame of the scene as seen by `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Self::Output;
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightSnapshot {
    pub id: NodeId,
    pub kind: &'static str,
    pub color: String,
    pub intensity: f32,
    pub position: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshSnapshot {
    pub id: NodeId,
    pub name: String,
    pub geometry: &'static str,
    pub position: Vec3,
    pub rotation: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelperSnapshot {
    pub id: NodeId,
    pub light: NodeId,
    pub lines: usize,
    pub refreshes: u32,
}

/// Plain-data view of everything a frame would draw.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub camera: CameraSnapshot,
    pub lights: Vec<LightSnapshot>,
    pub meshes: Vec<MeshSnapshot>,
    pub helpers: Vec<HelperSnapshot>,
}

impl SceneSnapshot {
    pub fn capture(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        let lights = scene
            .lights()
            .map(|(id, light)| LightSnapshot {
                id,
                kind: light.type_name(),
                color: light.color.to_string(),
                intensity: light.intensity,
                position: light.position,
                ground_color: match light.kind {
                    LightKind::Hemisphere { ground_color } => Some(ground_color.to_string()),
                    _ => None,
                },
            })
            .collect();
        let meshes = scene
            .meshes()
            .map(|(id, mesh)| {
                let material = mesh.material.get();
                MeshSnapshot {
                    id,
                    name: mesh.name.clone(),
                    geometry: mesh.geometry.name(),
                    position: mesh.transform.position,
                    rotation: mesh.transform.rotation,
                    roughness: material.roughness,
                    metalness: material.metalness,
                }
            })
            .collect();
        let helpers = scene
            .helpers()
            .map(|(id, helper)| HelperSnapshot {
                id,
                light: helper.light(),
                lines: helper.lines().len(),
                refreshes: helper.refresh_count(),
            })
            .collect();
        Self {
            camera: CameraSnapshot {
                position: camera.position,
                target: camera.target(),
                fov: camera.fov,
                aspect: camera.aspect,
            },
            lights,
            meshes,
            helpers,
        }
    }
}

impl std::fmt::Display for SceneSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = &self.camera;
        writeln!(
            f,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            c.position.x, c.position.y, c.position.z, c.target.x, c.target.y, c.target.z, c.fov,
            c.aspect
        )?;
        writeln!(f, "Lights: {}", self.lights.len())?;
        for light in &self.lights {
            write!(
                f,
                "  [{}] {} color={} intensity={:.3}",
                light.id, light.kind, light.color, light.intensity
            )?;
            if let Some(ground) = &light.ground_color {
                write!(f, " ground={ground}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Meshes: {}", self.meshes.len())?;
        for mesh in &self.meshes {
            writeln!(
                f,
                "  [{}] {} ({}) pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3}) roughness={:.3}",
                mesh.id,
                mesh.name,
                mesh.geometry,
                mesh.position.x,
                mesh.position.y,
                mesh.position.z,
                mesh.rotation.x,
                mesh.rotation.y,
                mesh.rotation.z,
                mesh.roughness
            )?;
        }
        writeln!(f, "Helpers: {}", self.helpers.len())?;
        for helper in &self.helpers {
            writeln!(
                f,
                "  [{}] light={} lines={} refreshes={}",
                helper.id, helper.light, helper.lines, helper.refreshes
            )?;
        }
        Ok(())
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of each frame. Useful for CLI
/// output, logging, and testing the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    draw_calls: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> String {
        self.draw_calls += 1;
        tracing::trace!(frame = self.draw_calls, "debug text render");
        format!(
            "=== Frame {} ===\n{}",
            self.draw_calls,
            SceneSnapshot::capture(scene, camera)
        )
    }
}
