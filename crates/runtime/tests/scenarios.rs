//! End-to-end behavior of the demo driven through the render loop.

use std::time::Duration;

use glam::Vec2;
use lightbox_input::Action;
use lightbox_render::{DebugTextRenderer, SceneSnapshot};
use lightbox_runtime::{
    Clock, DemoConfig, DemoScene, FrameScheduler, ManualTime, RenderLoop, rotation_at,
};
use lightbox_scene::{LightKind, Refreshable};
use lightbox_tools::ControlValue;

#[derive(Default)]
struct Scheduler(u32);

impl FrameScheduler for Scheduler {
    fn request_frame(&mut self) {
        self.0 += 1;
    }
}

struct Harness {
    demo: DemoScene,
    render_loop: RenderLoop,
    time: ManualTime,
    renderer: DebugTextRenderer,
    scheduler: Scheduler,
}

impl Harness {
    fn new() -> Self {
        let time = ManualTime::new();
        let mut render_loop = RenderLoop::new(Clock::new(time.clone()));
        let mut scheduler = Scheduler::default();
        render_loop.start(&mut scheduler).unwrap();
        Self {
            demo: DemoScene::new(DemoConfig::default()).unwrap(),
            render_loop,
            time,
            renderer: DebugTextRenderer::new(),
            scheduler,
        }
    }

    fn frame_at(&mut self, seconds: f32) -> String {
        self.time.set(Duration::from_secs_f32(seconds));
        self.render_loop
            .frame(&mut self.demo, &mut self.renderer, &mut self.scheduler)
            .unwrap()
    }
}

#[test]
fn meshes_rotate_with_elapsed_time() {
    let mut h = Harness::new();
    h.frame_at(12.5);
    for id in h.demo.objects.animated() {
        let rotation = h.demo.graph.mesh(id).unwrap().transform.rotation;
        assert_eq!(rotation, rotation_at(12.5));
    }
    let plane = h.demo.graph.mesh(h.demo.objects.plane).unwrap();
    assert_eq!(plane.transform.rotation.y, 0.0);
}

#[test]
fn resize_then_frame_uses_new_aspect() {
    let mut h = Harness::new();
    h.demo.resize(1000.0, 500.0, 3.0);
    assert_eq!(h.demo.camera.aspect, 2.0);
    assert_eq!(h.demo.viewport.pixel_ratio(), 2.0);
    assert_eq!(h.demo.viewport.surface_size(), (2000, 1000));

    let out = h.frame_at(0.1);
    assert!(out.contains("aspect=2.000"));
}

#[test]
fn directional_slider_shows_in_next_draw_only() {
    let mut h = Harness::new();
    let before = SceneSnapshot::capture(&h.demo.graph, &h.demo.camera);

    h.demo.set_control("directional.intensity", "0.8").unwrap();
    let directional = h.demo.graph.light(h.demo.lights.directional).unwrap();
    assert_eq!(directional.intensity, 0.8);

    let out = h.frame_at(0.016);
    assert!(out.contains("directional color=#00fffc intensity=0.800"));

    let after = SceneSnapshot::capture(&h.demo.graph, &h.demo.camera);
    for (a, b) in before.lights.iter().zip(&after.lights) {
        if a.id != h.demo.lights.directional {
            assert_eq!(a.intensity, b.intensity);
            assert_eq!(a.color, b.color);
        }
    }
}

#[test]
fn shared_roughness_reaches_all_meshes() {
    let mut h = Harness::new();
    h.demo.set_control("material.roughness", "0.75").unwrap();
    h.frame_at(0.0);
    let snapshot = SceneSnapshot::capture(&h.demo.graph, &h.demo.camera);
    assert_eq!(snapshot.meshes.len(), 4);
    assert!(snapshot.meshes.iter().all(|m| m.roughness == 0.75));
}

#[test]
fn spot_helper_matches_light_within_one_frame() {
    let mut h = Harness::new();
    let toggle = h.demo.panel.find("spot.helper").unwrap();
    h.demo
        .panel
        .apply(&mut h.demo.graph, toggle, ControlValue::Flag(true))
        .unwrap();

    let (helper_id, helper) = h.demo.graph.helpers().next().unwrap();
    assert!(helper.lines().is_empty());

    h.frame_at(0.016);
    let helper = h.demo.graph.helper(helper_id).unwrap();
    assert_eq!(helper.refresh_count(), 1);

    let light = h.demo.graph.light(h.demo.lights.spot).unwrap();
    let mut expected = helper.clone();
    expected.refresh(light);
    assert_eq!(helper.lines(), expected.lines());

    // Later frames do not refresh again.
    h.frame_at(0.032);
    assert_eq!(h.demo.graph.helper(helper_id).unwrap().refresh_count(), 1);
}

#[test]
fn helper_membership_follows_every_toggle() {
    let mut h = Harness::new();
    let paths = [
        "directional.helper",
        "hemisphere.helper",
        "point.helper",
        "rectangular-area.helper",
        "spot.helper",
    ];
    for (i, path) in paths.iter().enumerate() {
        h.demo.set_control(path, "true").unwrap();
        assert_eq!(h.demo.graph.helpers().count(), i + 1);
    }
    h.frame_at(0.5);
    assert!(h.demo.graph.helpers().all(|(_, helper)| !helper.lines().is_empty()));

    h.demo.set_control("point.helper", "false").unwrap();
    assert_eq!(h.demo.graph.helpers().count(), 4);
    let point = h.demo.lights.point;
    assert!(h.demo.graph.helpers().all(|(_, helper)| helper.light() != point));

    h.demo.panel.reset(&mut h.demo.graph).unwrap();
    assert_eq!(h.demo.graph.helpers().count(), 0);
}

#[test]
fn reset_restores_spot_parameters() {
    let mut h = Harness::new();
    h.demo.set_control("spot.angle", "1.2").unwrap();
    h.demo.set_control("spot.distance", "250").unwrap();
    let spot = h.demo.graph.light(h.demo.lights.spot).unwrap();
    match spot.kind {
        LightKind::Spot { angle, distance, .. } => {
            assert_eq!(angle, 1.2);
            assert_eq!(distance, 100.0);
        }
        _ => unreachable!(),
    }

    h.demo.panel.reset(&mut h.demo.graph).unwrap();
    let spot = h.demo.graph.light(h.demo.lights.spot).unwrap();
    match spot.kind {
        LightKind::Spot { angle, distance, .. } => {
            assert!((angle - std::f32::consts::PI * 0.1).abs() < 1e-6);
            assert_eq!(distance, 10.0);
        }
        _ => unreachable!(),
    }
}

#[test]
fn damped_orbit_keeps_moving_after_drag() {
    let mut h = Harness::new();
    h.frame_at(0.0);
    h.demo.handle_action(Action::Rotate(Vec2::new(40.0, 0.0)));

    h.frame_at(0.016);
    let first = h.demo.camera.position;
    h.frame_at(0.032);
    let second = h.demo.camera.position;
    assert_ne!(first, second);
    assert_eq!(h.demo.camera.target(), h.demo.controls.target);
}

#[test]
fn cancelled_loop_draws_no_more() {
    let mut h = Harness::new();
    h.frame_at(0.0);
    h.render_loop.token().cancel();
    h.time.set(Duration::from_secs(1));
    assert!(
        h.render_loop
            .frame(&mut h.demo, &mut h.renderer, &mut h.scheduler)
            .is_none()
    );
    assert_eq!(h.renderer.draw_calls(), 1);
}
