use std::ops::RangeInclusive;

use lightbox_common::{Color, NodeId};
use lightbox_scene::{HelperBinding, LightParam, SceneError, SceneGraph, SharedMaterial};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "control {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub usize);

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("no such control: {0}")]
    UnknownControl(ControlId),
    #[error("no control named {0:?}")]
    UnknownPath(String),
    #[error("{control} takes a {expected} value")]
    ValueMismatch {
        control: String,
        expected: &'static str,
    },
    #[error("cannot read {input:?} as a {expected}")]
    Parse {
        input: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Widget shape of a control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider {
        range: RangeInclusive<f32>,
        step: f32,
    },
    Color,
    Toggle,
}

impl ControlKind {
    fn value_name(&self) -> &'static str {
        match self {
            Self::Slider { .. } => "number",
            Self::Color => "color",
            Self::Toggle => "flag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    Number(f32),
    Color(Color),
    Flag(bool),
}

impl std::fmt::Display for ControlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialField {
    Roughness,
    Metalness,
}

/// What a control reads and writes.
#[derive(Debug)]
enum Binding {
    Light { node: NodeId, param: LightParam },
    LightColor { node: NodeId },
    Material {
        material: SharedMaterial,
        field: MaterialField,
    },
    Helper(HelperBinding),
}

#[derive(Debug)]
pub struct Control {
    name: String,
    folder: FolderId,
    kind: ControlKind,
    binding: Binding,
    initial: ControlValue,
}

impl Control {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> FolderId {
        self.folder
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    /// Value the control had when it was added.
    pub fn initial(&self) -> ControlValue {
        self.initial
    }
}

#[derive(Debug)]
pub struct Folder {
    name: String,
    controls: Vec<ControlId>,
}

impl Folder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controls(&self) -> &[ControlId] {
        &self.controls
    }
}

/// Collapsible folders of controls bound to live scene fields.
///
/// Controls read their value from the scene on demand, so the panel never
/// holds a stale copy. Writes are clamped to the declared slider range.
#[derive(Debug, Default)]
pub struct DebugPanel {
    folders: Vec<Folder>,
    controls: Vec<Control>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&mut self, name: impl Into<String>) -> FolderId {
        let id = FolderId(self.folders.len());
        self.folders.push(Folder {
            name: name.into(),
            controls: Vec::new(),
        });
        id
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(id.0)
    }

    pub fn control(&self, id: ControlId) -> Result<&Control, PanelError> {
        self.controls
            .get(id.0)
            .ok_or(PanelError::UnknownControl(id))
    }

    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &Control)> {
        self.controls
            .iter()
            .enumerate()
            .map(|(i, control)| (ControlId(i), control))
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Slider over a numeric light field.
    pub fn add_light_slider(
        &mut self,
        graph: &SceneGraph,
        folder: FolderId,
        node: NodeId,
        param: LightParam,
        range: RangeInclusive<f32>,
        step: f32,
    ) -> Result<ControlId, PanelError> {
        let light = graph.light(node)?;
        let current = light
            .scalar(param)
            .ok_or(SceneError::UnsupportedParam {
                light: light.type_name(),
                param,
            })?;
        Ok(self.push(
            folder,
            param.name(),
            ControlKind::Slider { range, step },
            Binding::Light { node, param },
            ControlValue::Number(current),
        ))
    }

    pub fn add_light_color(
        &mut self,
        graph: &SceneGraph,
        folder: FolderId,
        node: NodeId,
    ) -> Result<ControlId, PanelError> {
        let color = graph.light(node)?.color;
        Ok(self.push(
            folder,
            "color",
            ControlKind::Color,
            Binding::LightColor { node },
            ControlValue::Color(color),
        ))
    }

    pub fn add_material_slider(
        &mut self,
        folder: FolderId,
        material: &SharedMaterial,
        field: MaterialField,
        range: RangeInclusive<f32>,
        step: f32,
    ) -> ControlId {
        let current = material_field(material, field);
        let name = match field {
            MaterialField::Roughness => "roughness",
            MaterialField::Metalness => "metalness",
        };
        self.push(
            folder,
            name,
            ControlKind::Slider { range, step },
            Binding::Material {
                material: material.clone(),
                field,
            },
            ControlValue::Number(current),
        )
    }

    /// Toggle that shows or hides a light helper. The panel takes ownership
    /// of the binding.
    pub fn add_helper_toggle(&mut self, folder: FolderId, binding: HelperBinding) -> ControlId {
        let visible = binding.is_visible();
        self.push(
            folder,
            "helper",
            ControlKind::Toggle,
            Binding::Helper(binding),
            ControlValue::Flag(visible),
        )
    }

    fn push(
        &mut self,
        folder: FolderId,
        name: &str,
        kind: ControlKind,
        binding: Binding,
        initial: ControlValue,
    ) -> ControlId {
        let id = ControlId(self.controls.len());
        self.controls.push(Control {
            name: name.to_string(),
            folder,
            kind,
            binding,
            initial,
        });
        if let Some(folder) = self.folders.get_mut(folder.0) {
            folder.controls.push(id);
        }
        id
    }

    /// Current value of the bound field.
    pub fn value(&self, graph: &SceneGraph, id: ControlId) -> Result<ControlValue, PanelError> {
        let control = self.control(id)?;
        let value = match &control.binding {
            Binding::Light { node, param } => {
                let light = graph.light(*node)?;
                let v = light.scalar(*param).ok_or(SceneError::UnsupportedParam {
                    light: light.type_name(),
                    param: *param,
                })?;
                ControlValue::Number(v)
            }
            Binding::LightColor { node } => ControlValue::Color(graph.light(*node)?.color),
            Binding::Material { material, field } => {
                ControlValue::Number(material_field(material, *field))
            }
            Binding::Helper(binding) => ControlValue::Flag(binding.is_visible()),
        };
        Ok(value)
    }

    /// Write `value` through the control into the scene.
    pub fn apply(
        &mut self,
        graph: &mut SceneGraph,
        id: ControlId,
        value: ControlValue,
    ) -> Result<(), PanelError> {
        let label = self.label(id)?;
        let control = self
            .controls
            .get_mut(id.0)
            .ok_or(PanelError::UnknownControl(id))?;
        let mismatch = || PanelError::ValueMismatch {
            control: label.clone(),
            expected: control.kind.value_name(),
        };

        match (&control.kind, &mut control.binding, value) {
            (ControlKind::Slider { range, .. }, binding, ControlValue::Number(v)) => {
                if v.is_nan() {
                    return Err(mismatch());
                }
                let v = v.clamp(*range.start(), *range.end());
                match binding {
                    Binding::Light { node, param } => {
                        graph.light_mut(*node)?.set_scalar(*param, v)?;
                    }
                    Binding::Material { material, field } => material.update(|m| match field {
                        MaterialField::Roughness => m.roughness = v,
                        MaterialField::Metalness => m.metalness = v,
                    }),
                    _ => return Err(mismatch()),
                }
                tracing::debug!("{label} = {v}");
            }
            (ControlKind::Color, Binding::LightColor { node }, ControlValue::Color(c)) => {
                graph.light_mut(*node)?.color = c;
                tracing::debug!("{label} = {c}");
            }
            (ControlKind::Toggle, Binding::Helper(binding), ControlValue::Flag(on)) => {
                binding.set_visible(graph, on)?;
                tracing::debug!("{label} = {on}");
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// Restore every control to the value it had when it was added.
    pub fn reset(&mut self, graph: &mut SceneGraph) -> Result<(), PanelError> {
        for i in 0..self.controls.len() {
            let initial = self.controls[i].initial;
            self.apply(graph, ControlId(i), initial)?;
        }
        tracing::info!("panel reset ({} controls)", self.controls.len());
        Ok(())
    }

    /// Look a control up by `folder.control`, e.g. `spot.angle` or
    /// `rectangular-area.helper`. Matching ignores case; spaces in folder
    /// names are written as `-`.
    pub fn find(&self, path: &str) -> Result<ControlId, PanelError> {
        let wanted = path.to_ascii_lowercase();
        self.controls()
            .find(|(id, _)| self.path(*id).is_some_and(|p| p == wanted))
            .map(|(id, _)| id)
            .ok_or_else(|| PanelError::UnknownPath(path.to_string()))
    }

    /// Dotted lookup key of a control.
    pub fn path(&self, id: ControlId) -> Option<String> {
        let control = self.controls.get(id.0)?;
        let folder = self.folders.get(control.folder.0)?;
        Some(format!(
            "{}.{}",
            folder.name.to_ascii_lowercase().replace(' ', "-"),
            control.name
        ))
    }

    /// Parse text into a value suited to the control's kind.
    pub fn parse_value(&self, id: ControlId, input: &str) -> Result<ControlValue, PanelError> {
        let control = self.control(id)?;
        let input = input.trim();
        let parse_err = || PanelError::Parse {
            input: input.to_string(),
            expected: control.kind.value_name(),
        };
        match control.kind {
            ControlKind::Slider { .. } => input
                .parse::<f32>()
                .map(ControlValue::Number)
                .map_err(|_| parse_err()),
            ControlKind::Color => {
                let hex = input.strip_prefix('#').unwrap_or(input);
                if hex.len() != 6 {
                    return Err(parse_err());
                }
                u32::from_str_radix(hex, 16)
                    .map(|h| ControlValue::Color(Color::from_hex(h)))
                    .map_err(|_| parse_err())
            }
            ControlKind::Toggle => match input {
                "true" | "on" | "1" => Ok(ControlValue::Flag(true)),
                "false" | "off" | "0" => Ok(ControlValue::Flag(false)),
                _ => Err(parse_err()),
            },
        }
    }

    fn label(&self, id: ControlId) -> Result<String, PanelError> {
        self.path(id).ok_or(PanelError::UnknownControl(id))
    }
}

fn material_field(material: &SharedMaterial, field: MaterialField) -> f32 {
    let m = material.get();
    match field {
        MaterialField::Roughness => m.roughness,
        MaterialField::Metalness => m.metalness,
    }
}
