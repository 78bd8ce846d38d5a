//! GPU device + frame-pacing management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - compiling the draw pass and its per-frame uniform slots
//! - bounding frames in flight and draining them at teardown

mod gpu;
mod sync;

pub use gpu::DeviceInit;
pub(crate) use gpu::DeviceContext;
