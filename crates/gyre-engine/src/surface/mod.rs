//! Presentable-surface bindings.
//!
//! The core never creates or owns the native presentable layer; it reaches
//! it through [`SurfaceBinding`], which is queried each frame for the next
//! drawable target and its current size.

mod offscreen;
mod window;

pub use offscreen::OffscreenSurface;
pub use window::{SurfaceInit, WindowSurface};

use crate::error::InitError;

/// One acquired drawable target.
///
/// Short-lived; for swapchain-backed bindings, holding it prevents
/// acquisition of subsequent frames.
pub struct Drawable {
    /// Render-attachment view of the target texture.
    pub view: wgpu::TextureView,

    /// Target size in physical pixels.
    pub size: (u32, u32),

    /// The swapchain texture behind `view`, when the target is presentable.
    presentable: Option<wgpu::SurfaceTexture>,
}

impl Drawable {
    pub(crate) fn presentable(
        view: wgpu::TextureView,
        size: (u32, u32),
        texture: wgpu::SurfaceTexture,
    ) -> Self {
        Self {
            view,
            size,
            presentable: Some(texture),
        }
    }

    pub(crate) fn transient(view: wgpu::TextureView, size: (u32, u32)) -> Self {
        Self {
            view,
            size,
            presentable: None,
        }
    }

    /// Schedules presentation of the target.
    ///
    /// Must be called after the frame's commands are submitted; presentation
    /// is queue-ordered behind them. A no-op for offscreen targets.
    pub fn present(self) {
        if let Some(texture) = self.presentable {
            texture.present();
        }
    }
}

/// Outcome of a per-frame drawable query.
pub enum Acquire {
    /// A drawable is ready for this frame.
    Ready(Drawable),

    /// No drawable this frame (mid-resize, minimized, timeout). A normal
    /// transient condition; the caller skips the frame.
    NotReady,

    /// The surface or its device is gone; only external re-initialization
    /// can recover.
    Lost,
}

/// Externally-owned presentable target, as seen by the renderer.
///
/// Implementations reference a compositor-managed layer (or an offscreen
/// texture); the native target's lifetime is managed by the host and must
/// exceed the renderer's.
pub trait SurfaceBinding {
    /// Creates the underlying wgpu surface, if any. First init step.
    fn connect(&mut self, instance: &wgpu::Instance) -> Result<(), InitError>;

    /// Surface used for adapter compatibility selection, if any.
    fn compat_surface(&self) -> Option<&wgpu::Surface<'static>> {
        None
    }

    /// Configures the binding against the chosen adapter/device and reports
    /// the render target format.
    fn configure(
        &mut self,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
    ) -> Result<wgpu::TextureFormat, InitError>;

    /// Queries the next drawable target and its current size.
    fn acquire(&mut self, device: &wgpu::Device) -> Acquire;
}
