//! The demo scene: six lights, four meshes on one material, an orbit camera
//! and the debug panel wired to all of it.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use lightbox_common::{Color, NodeId, Transform};
use lightbox_input::{Action, OrbitControls};
use lightbox_render::PerspectiveCamera;
use lightbox_scene::{
    Geometry, HelperBinding, HelperKind, Light, LightParam, Mesh, Node, SceneError, SceneGraph,
    SharedMaterial, StandardMaterial,
};
use lightbox_tools::{DebugPanel, MaterialField, PanelError};

use crate::viewport::ViewportState;

/// Rotation of the animated meshes `elapsed` seconds after start.
pub fn rotation_at(elapsed: f32) -> Vec3 {
    Vec3::new(
        (0.15 * elapsed).rem_euclid(TAU),
        (0.1 * elapsed).rem_euclid(TAU),
        0.0,
    )
}

/// Node ids of the six demo lights.
#[derive(Debug, Clone, Copy)]
pub struct LightSet {
    pub ambient: NodeId,
    pub directional: NodeId,
    pub hemisphere: NodeId,
    pub point: NodeId,
    pub rect_area: NodeId,
    pub spot: NodeId,
}

impl LightSet {
    pub fn build(graph: &mut SceneGraph) -> Self {
        let mut add = |light: Light| graph.insert(Node::Light(light));
        let set = Self {
            ambient: add(Light::ambient(Color::from_hex(0xffffff), 0.5)),
            directional: add(
                Light::directional(Color::from_hex(0x00fffc), 0.3)
                    .with_position(Vec3::new(1.0, 0.25, 0.0)),
            ),
            hemisphere: add(Light::hemisphere(
                Color::from_hex(0xff0000),
                Color::from_hex(0x0000ff),
                0.3,
            )),
            point: add(
                Light::point(Color::from_hex(0xff9000), 0.5, 5.0, 2.0)
                    .with_position(Vec3::new(1.0, -0.5, 1.0)),
            ),
            rect_area: add(
                Light::rect_area(Color::from_hex(0x4e00ff), 2.0, 1.0, 1.0)
                    .with_position(Vec3::new(-1.5, 0.0, 1.5))
                    .with_target(Vec3::ZERO),
            ),
            spot: add(
                Light::spot(Color::from_hex(0x78ff00), 0.5, 10.0, PI * 0.1, 0.05, 1.0)
                    .with_position(Vec3::new(0.0, 2.0, 3.0))
                    .with_target(Vec3::new(-0.25, 0.0, 0.0)),
            ),
        };
        tracing::debug!("lights created: {set:?}");
        set
    }

    pub fn all(&self) -> [NodeId; 6] {
        [
            self.ambient,
            self.directional,
            self.hemisphere,
            self.point,
            self.rect_area,
            self.spot,
        ]
    }
}

/// The four demo meshes and the material they share.
#[derive(Debug, Clone)]
pub struct ObjectSet {
    pub sphere: NodeId,
    pub cube: NodeId,
    pub torus: NodeId,
    pub plane: NodeId,
    pub material: SharedMaterial,
}

impl ObjectSet {
    pub fn build(graph: &mut SceneGraph) -> Self {
        let material = SharedMaterial::new(StandardMaterial {
            roughness: 0.4,
            ..StandardMaterial::default()
        });

        let sphere = Mesh::new(
            "sphere",
            Geometry::Sphere {
                radius: 0.5,
                width_segments: 32,
                height_segments: 32,
            },
            &material,
        )
        .with_transform(Transform::from_position(Vec3::new(-1.5, 0.0, 0.0)));
        let cube = Mesh::new(
            "cube",
            Geometry::Box {
                width: 0.75,
                height: 0.75,
                depth: 0.75,
            },
            &material,
        );
        let torus = Mesh::new(
            "torus",
            Geometry::Torus {
                radius: 0.3,
                tube: 0.2,
                radial_segments: 32,
                tubular_segments: 64,
            },
            &material,
        )
        .with_transform(Transform::from_position(Vec3::new(1.5, 0.0, 0.0)));
        let plane = Mesh::new(
            "plane",
            Geometry::Plane {
                width: 5.0,
                height: 5.0,
            },
            &material,
        )
        .with_transform(Transform {
            position: Vec3::new(0.0, -0.65, 0.0),
            rotation: Vec3::new(-PI * 0.5, 0.0, 0.0),
            ..Transform::default()
        });

        Self {
            sphere: graph.insert(Node::Mesh(sphere)),
            cube: graph.insert(Node::Mesh(cube)),
            torus: graph.insert(Node::Mesh(torus)),
            plane: graph.insert(Node::Mesh(plane)),
            material,
        }
    }

    /// Meshes that spin over time. The plane stays put.
    pub fn animated(&self) -> [NodeId; 3] {
        [self.sphere, self.cube, self.torus]
    }

    /// Set the animated meshes' rotation for `elapsed` seconds.
    pub fn animate(&self, graph: &mut SceneGraph, elapsed: f32) -> Result<(), SceneError> {
        let rotation = rotation_at(elapsed);
        for id in self.animated() {
            graph.mesh_mut(id)?.transform.rotation = rotation;
        }
        Ok(())
    }
}

/// Window-independent startup options.
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub damping: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
            damping: true,
        }
    }
}

/// Everything the demo mutates, owned in one place.
#[derive(Debug)]
pub struct DemoScene {
    pub graph: SceneGraph,
    pub lights: LightSet,
    pub objects: ObjectSet,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub viewport: ViewportState,
    pub panel: DebugPanel,
}

impl DemoScene {
    pub fn new(config: DemoConfig) -> Result<Self, PanelError> {
        let mut graph = SceneGraph::new();
        let lights = LightSet::build(&mut graph);
        let objects = ObjectSet::build(&mut graph);
        let panel = build_panel(&graph, &lights, &objects.material)?;

        let viewport = ViewportState::new(config.width, config.height, config.device_pixel_ratio);
        let mut camera = PerspectiveCamera::new(75.0, viewport.aspect(), 0.1, 100.0)
            .with_position(Vec3::new(1.0, 2.0, 4.0));
        let controls = OrbitControls::new(Vec3::ZERO).with_damping(config.damping);
        camera.look_at(controls.target);

        tracing::info!(
            "demo scene ready: {} nodes, {} panel controls",
            graph.len(),
            panel.len()
        );
        Ok(Self {
            graph,
            lights,
            objects,
            camera,
            controls,
            viewport,
            panel,
        })
    }

    /// Apply a window resize to the viewport and camera.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> bool {
        self.viewport
            .resize(width, height, device_pixel_ratio, &mut self.camera)
    }

    /// Queue camera motion for the next frame.
    pub fn handle_action(&mut self, action: Action) {
        self.controls
            .handle(action, &self.camera, self.viewport.height());
    }

    /// Set a panel control by its `folder.control` path from text.
    pub fn set_control(&mut self, path: &str, input: &str) -> Result<(), PanelError> {
        let id = self.panel.find(path)?;
        let value = self.panel.parse_value(id, input)?;
        self.panel.apply(&mut self.graph, id, value)
    }
}

/// Folders and controls, in display order.
fn build_panel(
    graph: &SceneGraph,
    lights: &LightSet,
    material: &SharedMaterial,
) -> Result<DebugPanel, PanelError> {
    let mut panel = DebugPanel::new();

    let ambient = panel.add_folder("Ambient");
    panel.add_light_slider(graph, ambient, lights.ambient, LightParam::Intensity, 0.0..=1.0, 0.001)?;

    let directional = panel.add_folder("Directional");
    panel.add_light_slider(
        graph,
        directional,
        lights.directional,
        LightParam::Intensity,
        0.0..=1.0,
        0.001,
    )?;
    panel.add_light_color(graph, directional, lights.directional)?;
    panel.add_helper_toggle(
        directional,
        HelperBinding::new(lights.directional, HelperKind::Directional { size: 0.2 }),
    );

    let hemisphere = panel.add_folder("Hemisphere");
    panel.add_light_slider(
        graph,
        hemisphere,
        lights.hemisphere,
        LightParam::Intensity,
        0.0..=1.0,
        0.001,
    )?;
    panel.add_helper_toggle(
        hemisphere,
        HelperBinding::new(lights.hemisphere, HelperKind::Hemisphere { size: 0.1 }),
    );

    let point = panel.add_folder("Point");
    panel.add_light_slider(graph, point, lights.point, LightParam::Intensity, 0.0..=1.0, 0.001)?;
    panel.add_helper_toggle(
        point,
        HelperBinding::new(lights.point, HelperKind::Point { size: 0.2 }),
    );

    let rect_area = panel.add_folder("Rectangular Area");
    panel.add_light_slider(
        graph,
        rect_area,
        lights.rect_area,
        LightParam::Intensity,
        0.0..=5.0,
        0.01,
    )?;
    panel.add_helper_toggle(
        rect_area,
        HelperBinding::new(lights.rect_area, HelperKind::RectArea),
    );

    let spot = panel.add_folder("Spot");
    for (param, range, step) in [
        (LightParam::Intensity, 0.0..=1.0, 0.001),
        (LightParam::Distance, 0.0..=100.0, 1.0),
        (LightParam::Angle, 0.0..=PI, 0.001),
        (LightParam::Penumbra, 0.0..=1.0, 0.001),
        (LightParam::Decay, 0.0..=5.0, 0.01),
    ] {
        panel.add_light_slider(graph, spot, lights.spot, param, range, step)?;
    }
    panel.add_helper_toggle(spot, HelperBinding::new(lights.spot, HelperKind::Spot));

    let surface = panel.add_folder("Material");
    panel.add_material_slider(surface, material, MaterialField::Roughness, 0.0..=1.0, 0.001);
    panel.add_material_slider(surface, material, MaterialField::Metalness, 0.0..=1.0, 0.001);

    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::LightKind;
    use lightbox_tools::ControlValue;

    #[test]
    fn rotation_wraps_into_one_turn() {
        assert_eq!(rotation_at(0.0), Vec3::ZERO);
        let r = rotation_at(10.0);
        assert!((r.x - 1.5).abs() < 1e-5);
        assert!((r.y - 1.0).abs() < 1e-5);

        let late = rotation_at(1000.0);
        assert!((0.0..TAU).contains(&late.x));
        assert!((late.x - (150.0f32).rem_euclid(TAU)).abs() < 1e-3);
    }

    #[test]
    fn scene_has_six_lights_and_four_meshes() {
        let demo = DemoScene::new(DemoConfig::default()).unwrap();
        assert_eq!(demo.graph.lights().count(), 6);
        assert_eq!(demo.graph.meshes().count(), 4);
        assert_eq!(demo.graph.helpers().count(), 0);
        // Four meshes, the set's own handle and two panel sliders.
        assert_eq!(demo.objects.material.handle_count(), 7);
        assert_eq!(demo.objects.material.get().roughness, 0.4);
    }

    #[test]
    fn spot_light_matches_demo_setup() {
        let demo = DemoScene::new(DemoConfig::default()).unwrap();
        let spot = demo.graph.light(demo.lights.spot).unwrap();
        assert_eq!(spot.position, Vec3::new(0.0, 2.0, 3.0));
        match spot.kind {
            LightKind::Spot {
                target,
                distance,
                angle,
                ..
            } => {
                assert_eq!(target, Vec3::new(-0.25, 0.0, 0.0));
                assert_eq!(distance, 10.0);
                assert!((angle - PI * 0.1).abs() < 1e-6);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn panel_folders_follow_demo_order() {
        let demo = DemoScene::new(DemoConfig::default()).unwrap();
        let names: Vec<&str> = demo.panel.folders().iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "Ambient",
                "Directional",
                "Hemisphere",
                "Point",
                "Rectangular Area",
                "Spot",
                "Material"
            ]
        );
        assert_eq!(demo.panel.folders()[5].controls().len(), 6);
    }

    #[test]
    fn animate_leaves_plane_alone() {
        let mut demo = DemoScene::new(DemoConfig::default()).unwrap();
        let plane_before = demo.graph.mesh(demo.objects.plane).unwrap().transform;
        demo.objects.animate(&mut demo.graph, 4.0).unwrap();
        for id in demo.objects.animated() {
            assert_eq!(
                demo.graph.mesh(id).unwrap().transform.rotation,
                rotation_at(4.0)
            );
        }
        assert_eq!(
            demo.graph.mesh(demo.objects.plane).unwrap().transform,
            plane_before
        );
    }

    #[test]
    fn set_control_from_text() {
        let mut demo = DemoScene::new(DemoConfig::default()).unwrap();
        demo.set_control("rectangular-area.intensity", "4.5").unwrap();
        assert_eq!(demo.graph.light(demo.lights.rect_area).unwrap().intensity, 4.5);

        demo.set_control("material.roughness", "0.9").unwrap();
        let id = demo.panel.find("material.roughness").unwrap();
        assert_eq!(
            demo.panel.value(&demo.graph, id).unwrap(),
            ControlValue::Number(0.9)
        );
        assert!(demo.set_control("ambient.color", "#ffffff").is_err());
    }

    #[test]
    fn camera_starts_looking_at_origin() {
        let demo = DemoScene::new(DemoConfig {
            width: 800.0,
            height: 400.0,
            ..DemoConfig::default()
        })
        .unwrap();
        assert_eq!(demo.camera.position, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(demo.camera.target(), Vec3::ZERO);
        assert_eq!(demo.camera.aspect, 2.0);
        assert!(demo.controls.enable_damping);
    }
}
