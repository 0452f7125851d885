use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use lightbox_scene::Geometry;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Triangle list with counter-clockwise front faces.
#[derive(Debug, Default)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

pub(crate) fn tessellate(geometry: &Geometry) -> MeshData {
    match *geometry {
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments.max(3), height_segments.max(2)),
        Geometry::Box {
            width,
            height,
            depth,
        } => cuboid(Vec3::new(width, height, depth) * 0.5),
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(radius, tube, radial_segments.max(3), tubular_segments.max(3)),
        Geometry::Plane { width, height } => plane(width, height),
    }
}

/// Quad grid indices over a `(columns + 1) x (rows + 1)` vertex lattice.
fn grid_indices(indices: &mut Vec<u32>, columns: u32, rows: u32) {
    let stride = columns + 1;
    for row in 0..rows {
        for col in 0..columns {
            let a = row * stride + col + 1;
            let b = row * stride + col;
            let c = (row + 1) * stride + col;
            let d = (row + 1) * stride + col + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

fn sphere(radius: f32, columns: u32, rows: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        for col in 0..=columns {
            let u = col as f32 / columns as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.vertices.push(Vertex::new(normal * radius, normal));
        }
    }
    grid_indices(&mut mesh.indices, columns, rows);
    mesh
}

fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.vertices
                .push(Vertex::new(position, (position - center).normalize()));
        }
    }
    let stride = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

/// Axis-aligned box with flat-shaded faces.
fn cuboid(half: Vec3) -> MeshData {
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut mesh = MeshData::default();
    for (normal, right, up) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * half;
        let (r, u) = (right * half, up * half);
        for corner in [center - r - u, center + r - u, center + r + u, center - r + u] {
            mesh.vertices.push(Vertex::new(corner, normal));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Plane in XY facing +Z.
fn plane(width: f32, height: f32) -> MeshData {
    let (w, h) = (width * 0.5, height * 0.5);
    let vertices = [
        Vec3::new(-w, -h, 0.0),
        Vec3::new(w, -h, 0.0),
        Vec3::new(w, h, 0.0),
        Vec3::new(-w, h, 0.0),
    ]
    .into_iter()
    .map(|p| Vertex::new(p, Vec3::Z))
    .collect();
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let p = |i: usize| Vec3::from_array(mesh.vertices[mesh.indices[tri * 3 + i] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    fn assert_well_formed(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.normal).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_lattice_sizes() {
        let mesh = tessellate(&Geometry::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        });
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.indices.len(), 32 * 32 * 6);
        assert_well_formed(&mesh);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.position).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn torus_lattice_sizes() {
        let mesh = tessellate(&Geometry::Torus {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 32,
            tubular_segments: 64,
        });
        assert_eq!(mesh.vertices.len(), 33 * 65);
        assert_eq!(mesh.indices.len(), 32 * 64 * 6);
        assert_well_formed(&mesh);
    }

    #[test]
    fn box_faces_point_outward() {
        let mesh = tessellate(&Geometry::Box {
            width: 0.75,
            height: 0.75,
            depth: 0.75,
        });
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_well_formed(&mesh);
        for tri in 0..12 {
            let n = face_normal(&mesh, tri);
            let first = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!(n.dot(first) > 0.0);
        }
        assert!(
            mesh.vertices
                .iter()
                .all(|v| v.position.iter().all(|c| c.abs() <= 0.375 + 1e-6))
        );
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = tessellate(&Geometry::Plane {
            width: 5.0,
            height: 5.0,
        });
        assert_well_formed(&mesh);
        assert!(face_normal(&mesh, 0).z > 0.0);
        assert!(face_normal(&mesh, 1).z > 0.0);
    }
}
