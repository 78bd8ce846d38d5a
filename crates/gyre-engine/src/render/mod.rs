//! Frame state + the draw pass.
//!
//! Convention: the pass owns its GPU resources (pipeline, buffers); per-frame
//! uniform data rotates through one slot per frame in flight.

mod frame_state;
mod spin;

pub use frame_state::{DEFAULT_ANGLE_INCREMENT, FrameState};
pub(crate) use spin::SpinPass;
