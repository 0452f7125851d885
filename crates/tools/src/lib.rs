//! Developer tooling: the debug panel that exposes light and material
//! fields for live tweaking.
//!
//! # Invariants
//! - A control never caches its field; reads go to the scene.
//! - Slider writes are clamped to the declared range.
//! - `reset` restores the value each control had when it was added.

pub mod panel;

pub use panel::{
    Control, ControlId, ControlKind, ControlValue, DebugPanel, Folder, FolderId, MaterialField,
    PanelError,
};

pub fn crate_info() -> &'static str {
    "lightbox-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
