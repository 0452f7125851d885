//! Viewport input: pointer events mapped to camera actions, and damped
//! orbit controls that turn those actions into camera motion.
//!
//! # Invariants
//! - The orbit controls consume actions, never raw window events.
//! - Camera motion only happens inside `OrbitControls::update`.

pub mod action;
pub mod orbit;

pub use action::{Action, PointerButton, PointerTracker};
pub use orbit::OrbitControls;

pub fn crate_info() -> &'static str {
    "lightbox-input v0.1.0"
}
