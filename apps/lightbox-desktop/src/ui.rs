use egui::Context as EguiContext;
use lightbox_common::Color;
use lightbox_runtime::DemoScene;
use lightbox_tools::{Control, ControlId, ControlKind, ControlValue};

/// Draw the debug panel and write any edits back into the scene.
pub fn draw_panel(ctx: &EguiContext, demo: &mut DemoScene) {
    let mut edits: Vec<(ControlId, ControlValue)> = Vec::new();
    let mut reset = false;

    egui::Window::new("Lights")
        .default_width(280.0)
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .show(ctx, |ui| {
            if ui.button("reset").clicked() {
                reset = true;
            }
            for folder in demo.panel.folders() {
                egui::CollapsingHeader::new(folder.name()).show(ui, |ui| {
                    for &id in folder.controls() {
                        let (Ok(control), Ok(value)) =
                            (demo.panel.control(id), demo.panel.value(&demo.graph, id))
                        else {
                            continue;
                        };
                        if let Some(edited) = control_widget(ui, control, value) {
                            edits.push((id, edited));
                        }
                    }
                });
            }
            ui.separator();
            let eye = demo.camera.position;
            ui.small(format!(
                "camera ({:.2}, {:.2}, {:.2})  LMB orbit | RMB pan | wheel zoom",
                eye.x, eye.y, eye.z
            ));
        });

    if reset {
        if let Err(err) = demo.panel.reset(&mut demo.graph) {
            tracing::error!("panel reset failed: {err}");
        }
    }
    for (id, value) in edits {
        if let Err(err) = demo.panel.apply(&mut demo.graph, id, value) {
            tracing::warn!("panel edit rejected: {err}");
        }
    }
}

fn control_widget(ui: &mut egui::Ui, control: &Control, value: ControlValue) -> Option<ControlValue> {
    match (control.kind(), value) {
        (ControlKind::Slider { range, step }, ControlValue::Number(mut v)) => ui
            .add(
                egui::Slider::new(&mut v, range.clone())
                    .step_by(*step as f64)
                    .text(control.name()),
            )
            .changed()
            .then_some(ControlValue::Number(v)),
        (ControlKind::Color, ControlValue::Color(color)) => {
            let mut rgb = color.to_array();
            let changed = ui
                .horizontal(|ui| {
                    let response = ui.color_edit_button_rgb(&mut rgb);
                    ui.label(control.name());
                    response.changed()
                })
                .inner;
            changed.then(|| ControlValue::Color(Color::from(rgb)))
        }
        (ControlKind::Toggle, ControlValue::Flag(mut on)) => ui
            .checkbox(&mut on, control.name())
            .changed()
            .then_some(ControlValue::Flag(on)),
        _ => None,
    }
}
