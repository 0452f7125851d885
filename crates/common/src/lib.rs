//! Shared types used by every lightbox crate.

pub mod types;

pub use types::{Color, NodeId, Transform};
