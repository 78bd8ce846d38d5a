use std::f32::consts::TAU;

/// Default per-frame angle increment in radians.
///
/// Roughly one revolution every five seconds at 60 Hz.
pub const DEFAULT_ANGLE_INCREMENT: f32 = 0.02;

/// Mutable per-frame animation state.
///
/// The angle advances exactly once per draw call, including calls that skip
/// GPU work because no drawable was available; animation time keeps moving
/// while a surface is mid-resize.
#[derive(Debug, Clone)]
pub struct FrameState {
    angle: f32,
    increment: f32,
    frame_index: u64,
}

impl FrameState {
    /// State starting at angle zero with a fixed per-frame `increment`.
    pub fn new(increment: f32) -> Self {
        Self {
            angle: 0.0,
            increment,
            frame_index: 0,
        }
    }

    /// Advances one frame and returns the new angle.
    ///
    /// The angle wraps modulo one full turn; the frame counter wraps at the
    /// u64 boundary.
    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + self.increment) % TAU;
        self.frame_index = self.frame_index.wrapping_add(1);
        self.angle
    }

    /// Current rotation angle in radians, wrapped modulo one full turn.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Monotonic frame counter (number of advances so far).
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(DEFAULT_ANGLE_INCREMENT)
    }
}
