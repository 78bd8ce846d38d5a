//! Gyre engine crate.
//!
//! The smallest correct loop that owns a GPU context and emits one frame per
//! draw call: device/queue acquisition, an externally-owned presentable
//! surface reached through a binding, and per-frame rotation animation.

pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod renderer;
pub mod surface;
