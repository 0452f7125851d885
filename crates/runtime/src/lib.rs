//! Runtime for the lightbox demo: the scene context, its clock and viewport,
//! and the loop that advances and draws one frame at a time.
//!
//! # Invariants
//! - Frames are strictly sequential; a frame's mutations are drawn before
//!   the next frame starts.
//! - The loop goes Idle to Running once and stops only through its
//!   cancellation token.
//! - Orbit controls are advanced exactly once per frame.

pub mod clock;
pub mod demo;
pub mod render_loop;
pub mod viewport;

pub use clock::{Clock, ManualTime, MonotonicTime, TimeSource};
pub use demo::{DemoConfig, DemoScene, LightSet, ObjectSet, rotation_at};
pub use render_loop::{CancellationToken, FrameScheduler, LoopError, LoopState, RenderLoop};
pub use viewport::{MAX_PIXEL_RATIO, ViewportState};

pub fn crate_info() -> &'static str {
    "lightbox-runtime v0.1.0"
}
