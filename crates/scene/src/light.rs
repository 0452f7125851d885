use glam::Vec3;
use lightbox_common::Color;
use serde::{Deserialize, Serialize};

use crate::graph::SceneError;

/// Type-specific light parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction.
    Ambient,
    /// Parallel rays travelling from the light's position toward `target`.
    Directional { target: Vec3 },
    /// Sky/ground blend; the light's own color is the sky color.
    Hemisphere { ground_color: Color },
    /// Omnidirectional emitter. A `distance` of zero means no cutoff.
    Point { distance: f32, decay: f32 },
    /// Rectangular emitter facing `look_at`.
    RectArea { width: f32, height: f32, look_at: Vec3 },
    /// Cone of light toward `target`. `angle` is the half-angle in radians.
    Spot {
        target: Vec3,
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
    },
}

/// Numeric light fields reachable from the debug panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightParam {
    Intensity,
    Distance,
    Angle,
    Penumbra,
    Decay,
    Width,
    Height,
}

impl LightParam {
    pub fn name(self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::Distance => "distance",
            Self::Angle => "angle",
            Self::Penumbra => "penumbra",
            Self::Decay => "decay",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

impl std::fmt::Display for LightParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A light source in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub kind: LightKind,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::ZERO,
            kind: LightKind::Ambient,
        }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            kind: LightKind::Directional { target: Vec3::ZERO },
        }
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self {
            color: sky,
            intensity,
            position: Vec3::Y,
            kind: LightKind::Hemisphere {
                ground_color: ground,
            },
        }
    }

    pub fn point(color: Color, intensity: f32, distance: f32, decay: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::ZERO,
            kind: LightKind::Point { distance, decay },
        }
    }

    pub fn rect_area(color: Color, intensity: f32, width: f32, height: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::ZERO,
            kind: LightKind::RectArea {
                width,
                height,
                look_at: Vec3::NEG_Z,
            },
        }
    }

    pub fn spot(
        color: Color,
        intensity: f32,
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
    ) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            kind: LightKind::Spot {
                target: Vec3::ZERO,
                distance,
                angle,
                penumbra,
                decay,
            },
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Points directional, spot and rect-area lights at `point`.
    /// Other kinds have no orientation and are left untouched.
    pub fn with_target(mut self, point: Vec3) -> Self {
        match &mut self.kind {
            LightKind::Directional { target } | LightKind::Spot { target, .. } => *target = point,
            LightKind::RectArea { look_at, .. } => *look_at = point,
            _ => {}
        }
        self
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            LightKind::Ambient => "ambient",
            LightKind::Directional { .. } => "directional",
            LightKind::Hemisphere { .. } => "hemisphere",
            LightKind::Point { .. } => "point",
            LightKind::RectArea { .. } => "rect-area",
            LightKind::Spot { .. } => "spot",
        }
    }

    /// Point the light aims at, if it has an orientation.
    pub fn target(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { target } | LightKind::Spot { target, .. } => Some(target),
            LightKind::RectArea { look_at, .. } => Some(look_at),
            _ => None,
        }
    }

    /// Unit direction from the light toward its target.
    pub fn direction(&self) -> Option<Vec3> {
        self.target()
            .map(|target| (target - self.position).normalize_or(Vec3::NEG_Y))
    }

    pub fn scalar(&self, param: LightParam) -> Option<f32> {
        match (param, self.kind) {
            (LightParam::Intensity, _) => Some(self.intensity),
            (LightParam::Distance, LightKind::Point { distance, .. })
            | (LightParam::Distance, LightKind::Spot { distance, .. }) => Some(distance),
            (LightParam::Decay, LightKind::Point { decay, .. })
            | (LightParam::Decay, LightKind::Spot { decay, .. }) => Some(decay),
            (LightParam::Angle, LightKind::Spot { angle, .. }) => Some(angle),
            (LightParam::Penumbra, LightKind::Spot { penumbra, .. }) => Some(penumbra),
            (LightParam::Width, LightKind::RectArea { width, .. }) => Some(width),
            (LightParam::Height, LightKind::RectArea { height, .. }) => Some(height),
            _ => None,
        }
    }

    pub fn set_scalar(&mut self, param: LightParam, value: f32) -> Result<(), SceneError> {
        let type_name = self.type_name();
        let slot = match (param, &mut self.kind) {
            (LightParam::Intensity, _) => &mut self.intensity,
            (LightParam::Distance, LightKind::Point { distance, .. })
            | (LightParam::Distance, LightKind::Spot { distance, .. }) => distance,
            (LightParam::Decay, LightKind::Point { decay, .. })
            | (LightParam::Decay, LightKind::Spot { decay, .. }) => decay,
            (LightParam::Angle, LightKind::Spot { angle, .. }) => angle,
            (LightParam::Penumbra, LightKind::Spot { penumbra, .. }) => penumbra,
            (LightParam::Width, LightKind::RectArea { width, .. }) => width,
            (LightParam::Height, LightKind::RectArea { height, .. }) => height,
            _ => {
                return Err(SceneError::UnsupportedParam {
                    light: type_name,
                    param,
                });
            }
        };
        *slot = value;
        Ok(())
    }
}
