use std::cell::RefCell;
use std::rc::Rc;

use lightbox_common::{Color, Transform};
use serde::{Deserialize, Serialize};

/// Parametric geometry descriptor. Tessellation is left to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
}

impl Geometry {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Torus { .. } => "torus",
            Self::Plane { .. } => "plane",
        }
    }
}

/// Physically-inspired surface description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// A material shared by several meshes.
///
/// Cloning the handle adds a user; every clone sees the same material, so a
/// write through any handle is observed by all meshes holding one.
#[derive(Debug, Clone, Default)]
pub struct SharedMaterial(Rc<RefCell<StandardMaterial>>);

impl SharedMaterial {
    pub fn new(material: StandardMaterial) -> Self {
        Self(Rc::new(RefCell::new(material)))
    }

    /// Snapshot of the current material values.
    pub fn get(&self) -> StandardMaterial {
        *self.0.borrow()
    }

    pub fn update(&self, f: impl FnOnce(&mut StandardMaterial)) {
        f(&mut *self.0.borrow_mut());
    }

    /// Number of live handles, including the owner's.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn same_as(&self, other: &SharedMaterial) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A renderable mesh node.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: SharedMaterial,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: &SharedMaterial) -> Self {
        Self {
            name: name.into(),
            geometry,
            material: material.clone(),
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meshes_share_one_material() {
        let material = SharedMaterial::new(StandardMaterial::default());
        let cube = Mesh::new(
            "cube",
            Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
            &material,
        );
        let plane = Mesh::new(
            "plane",
            Geometry::Plane {
                width: 1.0,
                height: 1.0,
            },
            &material,
        );
        assert_eq!(material.handle_count(), 3);

        material.update(|m| m.roughness = 0.25);
        assert_eq!(cube.material.get().roughness, 0.25);
        assert_eq!(plane.material.get().roughness, 0.25);
        assert!(cube.material.same_as(&plane.material));
    }
}
