//! Light helpers: wireframe gizmos that visualize a light's placement.
//!
//! A helper's shape is derived from its light but is not kept in sync
//! automatically. Callers refresh it through [`Refreshable`]; the
//! [`HelperBinding`] schedules one refresh each time the helper is shown.

use std::f32::consts::TAU;

use glam::Vec3;
use lightbox_common::{Color, NodeId};

use crate::graph::{Node, SceneError, SceneGraph};
use crate::light::{Light, LightKind};

const CIRCLE_SEGMENTS: usize = 16;
const SPOT_RIM_SEGMENTS: usize = 32;
const SPOT_UNBOUNDED_LENGTH: f32 = 1000.0;

/// Something whose shape is derived from live light state.
pub trait Refreshable {
    /// Rebuild internal geometry from the light's current state.
    fn refresh(&mut self, light: &Light);
}

/// Which gizmo to draw, with its size where the gizmo has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HelperKind {
    Directional { size: f32 },
    Hemisphere { size: f32 },
    Point { size: f32 },
    Spot,
    RectArea,
}

/// A world-space line segment of a helper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelperLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// Visualization proxy for a single light.
#[derive(Debug, Clone)]
pub struct LightHelper {
    light: NodeId,
    kind: HelperKind,
    lines: Vec<HelperLine>,
    refresh_count: u32,
}

impl LightHelper {
    /// Creates a helper with no shape; it draws nothing until refreshed.
    pub fn new(light: NodeId, kind: HelperKind) -> Self {
        Self {
            light,
            kind,
            lines: Vec::new(),
            refresh_count: 0,
        }
    }

    pub fn light(&self) -> NodeId {
        self.light
    }

    pub fn kind(&self) -> HelperKind {
        self.kind
    }

    pub fn lines(&self) -> &[HelperLine] {
        &self.lines
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }
}

impl Refreshable for LightHelper {
    fn refresh(&mut self, light: &Light) {
        self.lines.clear();
        self.refresh_count += 1;
        match (self.kind, light.kind) {
            (HelperKind::Directional { size }, LightKind::Directional { target }) => {
                directional_lines(&mut self.lines, light, target, size)
            }
            (HelperKind::Hemisphere { size }, LightKind::Hemisphere { ground_color }) => {
                hemisphere_lines(&mut self.lines, light, ground_color, size)
            }
            (HelperKind::Point { size }, LightKind::Point { .. }) => {
                point_lines(&mut self.lines, light, size)
            }
            (
                HelperKind::Spot,
                LightKind::Spot {
                    target,
                    distance,
                    angle,
                    ..
                },
            ) => spot_lines(&mut self.lines, light, target, distance, angle),
            (
                HelperKind::RectArea,
                LightKind::RectArea {
                    width,
                    height,
                    look_at,
                },
            ) => rect_lines(&mut self.lines, light, look_at, width, height),
            (kind, _) => {
                tracing::warn!(
                    "{kind:?} helper cannot visualize a {} light",
                    light.type_name()
                );
            }
        }
    }
}

/// Right and up axes perpendicular to `forward`.
fn basis(forward: Vec3) -> (Vec3, Vec3) {
    let hint = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let right = forward.cross(hint).normalize();
    let up = right.cross(forward);
    (right, up)
}

fn push_loop(lines: &mut Vec<HelperLine>, points: &[Vec3], color: Color) {
    for (i, &start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        lines.push(HelperLine { start, end, color });
    }
}

fn circle(center: Vec3, a: Vec3, b: Vec3, radius: f32, segments: usize) -> Vec<Vec3> {
    (0..segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * TAU;
            center + (a * theta.cos() + b * theta.sin()) * radius
        })
        .collect()
}

fn directional_lines(lines: &mut Vec<HelperLine>, light: &Light, target: Vec3, size: f32) {
    let forward = (target - light.position).normalize_or(Vec3::NEG_Y);
    let (right, up) = basis(forward);
    let p = light.position;
    let square = [
        p - right * size + up * size,
        p + right * size + up * size,
        p + right * size - up * size,
        p - right * size - up * size,
    ];
    push_loop(lines, &square, light.color);
    lines.push(HelperLine {
        start: p,
        end: target,
        color: light.color,
    });
}

fn hemisphere_lines(lines: &mut Vec<HelperLine>, light: &Light, ground: Color, size: f32) {
    let p = light.position;
    let top = p + Vec3::Y * size;
    let bottom = p - Vec3::Y * size;
    let ring = [
        p + Vec3::X * size,
        p + Vec3::Z * size,
        p - Vec3::X * size,
        p - Vec3::Z * size,
    ];
    let sky = light.color;
    let middle = Color::new(
        (sky.r + ground.r) * 0.5,
        (sky.g + ground.g) * 0.5,
        (sky.b + ground.b) * 0.5,
    );
    for &corner in &ring {
        lines.push(HelperLine {
            start: top,
            end: corner,
            color: sky,
        });
        lines.push(HelperLine {
            start: bottom,
            end: corner,
            color: ground,
        });
    }
    push_loop(lines, &ring, middle);
}

fn point_lines(lines: &mut Vec<HelperLine>, light: &Light, size: f32) {
    let p = light.position;
    for (a, b) in [(Vec3::X, Vec3::Y), (Vec3::Y, Vec3::Z), (Vec3::Z, Vec3::X)] {
        push_loop(lines, &circle(p, a, b, size, CIRCLE_SEGMENTS), light.color);
    }
}

fn spot_lines(
    lines: &mut Vec<HelperLine>,
    light: &Light,
    target: Vec3,
    distance: f32,
    angle: f32,
) {
    let length = if distance > 0.0 {
        distance
    } else {
        SPOT_UNBOUNDED_LENGTH
    };
    let radius = length * angle.tan();
    let forward = (target - light.position).normalize_or(Vec3::NEG_Y);
    let (right, up) = basis(forward);
    let apex = light.position;
    let center = apex + forward * length;
    for axis in [right, up, -right, -up] {
        lines.push(HelperLine {
            start: apex,
            end: center + axis * radius,
            color: light.color,
        });
    }
    push_loop(
        lines,
        &circle(center, right, up, radius, SPOT_RIM_SEGMENTS),
        light.color,
    );
}

fn rect_lines(
    lines: &mut Vec<HelperLine>,
    light: &Light,
    look_at: Vec3,
    width: f32,
    height: f32,
) {
    let forward = (look_at - light.position).normalize_or(Vec3::NEG_Z);
    let (right, up) = basis(forward);
    let (hw, hh) = (width * 0.5, height * 0.5);
    let p = light.position;
    let corners = [
        p - right * hw + up * hh,
        p + right * hw + up * hh,
        p + right * hw - up * hh,
        p - right * hw - up * hh,
    ];
    push_loop(lines, &corners, light.color);
}

/// Pairs a light with its helper and keeps the helper's graph membership in
/// step with a visibility flag.
///
/// The helper is owned by the binding while hidden and by the graph while
/// visible, so "visible" and "in the graph" cannot disagree.
#[derive(Debug)]
pub struct HelperBinding {
    light: NodeId,
    detached: Option<LightHelper>,
    attached: Option<NodeId>,
}

impl HelperBinding {
    pub fn new(light: NodeId, kind: HelperKind) -> Self {
        Self {
            light,
            detached: Some(LightHelper::new(light, kind)),
            attached: None,
        }
    }

    pub fn light(&self) -> NodeId {
        self.light
    }

    pub fn is_visible(&self) -> bool {
        self.attached.is_some()
    }

    /// Graph node of the helper while it is visible.
    pub fn node(&self) -> Option<NodeId> {
        self.attached
    }

    /// Shows or hides the helper. Showing inserts the proxy into the graph
    /// and schedules a shape refresh for the next frame boundary.
    pub fn set_visible(&mut self, graph: &mut SceneGraph, visible: bool) -> Result<(), SceneError> {
        if visible {
            if let Some(helper) = self.detached.take() {
                let id = graph.insert(Node::Helper(helper));
                graph.schedule_refresh(id);
                self.attached = Some(id);
                tracing::debug!("helper for light {} shown as {id}", self.light);
            }
        } else if let Some(id) = self.attached.take() {
            match graph.remove(id) {
                Some(Node::Helper(helper)) => {
                    self.detached = Some(helper);
                    tracing::debug!("helper {id} for light {} hidden", self.light);
                }
                Some(other) => {
                    // Put back whatever was there; the binding lost its helper.
                    graph.insert_with_id(id, other);
                    return Err(SceneError::WrongNodeType {
                        id,
                        expected: "helper",
                    });
                }
                None => return Err(SceneError::NodeNotFound(id)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot() -> Light {
        Light::spot(Color::from_hex(0x78ff00), 0.5, 10.0, 0.1 * std::f32::consts::PI, 0.05, 1.0)
            .with_position(Vec3::new(0.0, 2.0, 3.0))
            .with_target(Vec3::new(-0.25, 0.0, 0.0))
    }

    #[test]
    fn new_helper_has_no_shape() {
        let helper = LightHelper::new(NodeId(1), HelperKind::Spot);
        assert!(helper.lines().is_empty());
        assert_eq!(helper.refresh_count(), 0);
    }

    #[test]
    fn spot_cone_follows_light() {
        let light = spot();
        let mut helper = LightHelper::new(NodeId(1), HelperKind::Spot);
        helper.refresh(&light);
        assert_eq!(helper.lines().len(), 4 + SPOT_RIM_SEGMENTS);

        let forward = light.direction().unwrap();
        let radius = 10.0 * (0.1 * std::f32::consts::PI).tan();
        for line in &helper.lines()[..4] {
            assert_eq!(line.start, light.position);
            let offset = line.end - (light.position + forward * 10.0);
            assert!((offset.length() - radius).abs() < 1e-4);
        }
    }

    #[test]
    fn spot_without_distance_uses_long_cone() {
        let mut light = spot();
        light
            .set_scalar(crate::light::LightParam::Distance, 0.0)
            .unwrap();
        let mut helper = LightHelper::new(NodeId(1), HelperKind::Spot);
        helper.refresh(&light);
        let tip = helper.lines()[0].end;
        assert!((tip - light.position).length() > 999.0);
    }

    #[test]
    fn point_helper_draws_three_circles() {
        let light = Light::point(Color::WHITE, 0.5, 5.0, 2.0).with_position(Vec3::ONE);
        let mut helper = LightHelper::new(NodeId(1), HelperKind::Point { size: 0.2 });
        helper.refresh(&light);
        assert_eq!(helper.lines().len(), 3 * CIRCLE_SEGMENTS);
        for line in helper.lines() {
            assert!(((line.start - Vec3::ONE).length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn hemisphere_uses_sky_and_ground_colors() {
        let sky = Color::from_hex(0xff0000);
        let ground = Color::from_hex(0x0000ff);
        let light = Light::hemisphere(sky, ground, 0.3);
        let mut helper = LightHelper::new(NodeId(1), HelperKind::Hemisphere { size: 0.1 });
        helper.refresh(&light);
        assert!(helper.lines().iter().any(|l| l.color == sky));
        assert!(helper.lines().iter().any(|l| l.color == ground));
    }

    #[test]
    fn mismatched_kind_draws_nothing() {
        let light = Light::ambient(Color::WHITE, 1.0);
        let mut helper = LightHelper::new(NodeId(1), HelperKind::Spot);
        helper.refresh(&light);
        assert!(helper.lines().is_empty());
        assert_eq!(helper.refresh_count(), 1);
    }

    #[test]
    fn binding_tracks_graph_membership() {
        let mut graph = SceneGraph::new();
        let light = graph.insert(Node::Light(spot()));
        let mut binding = HelperBinding::new(light, HelperKind::Spot);
        assert!(!binding.is_visible());
        assert_eq!(graph.helpers().count(), 0);

        binding.set_visible(&mut graph, true).unwrap();
        let node = binding.node().unwrap();
        assert!(binding.is_visible());
        assert!(graph.contains(node));
        assert_eq!(graph.pending_refreshes(), 1);

        // Showing twice does not duplicate the proxy.
        binding.set_visible(&mut graph, true).unwrap();
        assert_eq!(graph.helpers().count(), 1);

        binding.set_visible(&mut graph, false).unwrap();
        assert!(!binding.is_visible());
        assert!(!graph.contains(node));
        assert_eq!(graph.helpers().count(), 0);
    }

    #[test]
    fn helper_survives_hide_and_show() {
        let mut graph = SceneGraph::new();
        let light = graph.insert(Node::Light(spot()));
        let mut binding = HelperBinding::new(light, HelperKind::Spot);

        binding.set_visible(&mut graph, true).unwrap();
        graph.apply_refreshes();
        binding.set_visible(&mut graph, false).unwrap();
        binding.set_visible(&mut graph, true).unwrap();
        graph.apply_refreshes();

        let node = binding.node().unwrap();
        let helper = graph.helper(node).unwrap();
        assert_eq!(helper.refresh_count(), 2);
    }
}
