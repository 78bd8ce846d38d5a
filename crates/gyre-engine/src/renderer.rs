//! Renderer facade: lifecycle + the per-frame submission protocol.

use crate::device::{DeviceContext, DeviceInit};
use crate::error::InitError;
use crate::render::FrameState;
use crate::surface::{Acquire, SurfaceBinding};

/// The rendering core.
///
/// Composes an externally-owned presentable surface (reached through its
/// binding), an exclusively-owned GPU context, and the per-frame animation
/// state.
///
/// Lifecycle: [`new`](Self::new) → [`init`](Self::init) (uninitialized →
/// ready) → repeated [`draw_frame`](Self::draw_frame) → drop (drains
/// in-flight GPU work, then releases GPU resources).
pub struct Renderer<S: SurfaceBinding> {
    surface: S,
    device: Option<DeviceContext>,
    frame: FrameState,
    frames_submitted: u64,
    lost: bool,
    warned_not_ready: bool,
}

impl<S: SurfaceBinding> Renderer<S> {
    /// Wraps `surface`. Pure bookkeeping; no GPU work, cannot fail.
    ///
    /// The native target behind `surface` must stay alive for this
    /// renderer's whole lifetime.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            device: None,
            frame: FrameState::default(),
            frames_submitted: 0,
            lost: false,
            warned_not_ready: false,
        }
    }

    /// One-time GPU setup with default parameters.
    ///
    /// See [`init_with`](Self::init_with).
    pub async fn init(&mut self) -> Result<(), InitError> {
        self.init_with(DeviceInit::default()).await
    }

    /// One-time GPU setup: adapter, device and queue acquisition, surface
    /// attachment, pipeline compilation, uniform slot allocation.
    ///
    /// On failure the renderer stays uninitialized and
    /// [`draw_frame`](Self::draw_frame) remains a rejected no-op.
    ///
    /// Calling this on an already-initialized renderer re-initializes
    /// explicitly: in-flight work is drained, the old GPU context is torn
    /// down, and a fresh one is built. This is also the reset path after
    /// device loss.
    pub async fn init_with(&mut self, init: DeviceInit) -> Result<(), InitError> {
        if let Some(old) = self.device.take() {
            log::info!("re-initializing GPU context");
            drop(old); // drains in-flight frames first
        }
        self.lost = false;
        self.warned_not_ready = false;

        let context = DeviceContext::acquire(&mut self.surface, &init).await?;
        log::info!("GPU context ready: {}", context.adapter_info().name);
        self.device = Some(context);
        Ok(())
    }

    /// Blocking wrapper around [`init`](Self::init).
    pub fn init_blocking(&mut self) -> Result<(), InitError> {
        pollster::block_on(self.init())
    }

    /// Blocking wrapper around [`init_with`](Self::init_with).
    pub fn init_with_blocking(&mut self, init: DeviceInit) -> Result<(), InitError> {
        pollster::block_on(self.init_with(init))
    }

    /// Encodes, submits, and presents one frame.
    ///
    /// Before a successful [`init`](Self::init), and after device loss, this
    /// is a rejected no-op: no state changes, one warning is logged.
    ///
    /// In the ready state the angle advances exactly once per call — also
    /// when the surface has no drawable available and the frame is skipped,
    /// which is a normal transient condition, not an error.
    ///
    /// Returns without waiting for GPU completion of the submitted frame; it
    /// blocks only while the frames-in-flight bound is reached.
    pub fn draw_frame(&mut self) {
        if self.lost {
            return;
        }
        let Some(context) = self.device.as_mut() else {
            if !self.warned_not_ready {
                log::warn!("draw_frame called before a successful init; ignored");
                self.warned_not_ready = true;
            }
            return;
        };

        let angle = self.frame.advance();

        match self.surface.acquire(context.device()) {
            Acquire::Ready(drawable) => {
                context.render(&drawable, angle, self.frame.frame_index());
                self.frames_submitted += 1;
                // Queue-ordered behind the commands just submitted.
                drawable.present();
            }
            Acquire::NotReady => {
                log::debug!("no drawable available; frame skipped");
            }
            Acquire::Lost => {
                log::error!("presentable surface lost; rendering stopped until re-init");
                self.lost = true;
            }
        }
    }

    /// True when initialized and the surface has not been lost.
    pub fn is_ready(&self) -> bool {
        self.device.is_some() && !self.lost
    }

    /// Current animation angle in radians.
    pub fn angle(&self) -> f32 {
        self.frame.angle()
    }

    /// Total frames submitted to the GPU queue (skipped frames excluded).
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Frames currently submitted but not yet completed by the GPU.
    pub fn frames_in_flight(&self) -> usize {
        self.device.as_ref().map_or(0, DeviceContext::in_flight)
    }

    /// Adapter description, when initialized.
    pub fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.device.as_ref().map(DeviceContext::adapter_info)
    }

    /// The surface binding.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface binding (e.g. to forward resizes).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DEFAULT_ANGLE_INCREMENT;
    use crate::surface::OffscreenSurface;

    // ── pre-init behavior (no GPU required) ───────────────────────────────

    #[test]
    fn construction_performs_no_gpu_work() {
        let renderer = Renderer::new(OffscreenSurface::new(8, 8));
        assert!(!renderer.is_ready());
        assert_eq!(renderer.frames_in_flight(), 0);
        assert!(renderer.adapter_info().is_none());
    }

    #[test]
    fn draw_before_init_is_a_rejected_noop() {
        let mut renderer = Renderer::new(OffscreenSurface::new(64, 64));
        for _ in 0..3 {
            renderer.draw_frame();
        }
        assert!(!renderer.is_ready());
        assert_eq!(renderer.angle(), 0.0);
        assert_eq!(renderer.frames_submitted(), 0);
    }

    // ── init failure ──────────────────────────────────────────────────────

    #[test]
    fn unsatisfiable_device_request_fails_init() {
        let mut renderer = Renderer::new(OffscreenSurface::new(64, 64));
        let init = DeviceInit {
            // No adapter grants a u32::MAX texture limit, so this fails on
            // real hardware and on adapter-less machines alike.
            required_limits: wgpu::Limits {
                max_texture_dimension_2d: u32::MAX,
                ..wgpu::Limits::default()
            },
            ..DeviceInit::default()
        };
        assert!(renderer.init_with_blocking(init).is_err());
        assert!(!renderer.is_ready());

        renderer.draw_frame();
        assert_eq!(renderer.angle(), 0.0);
        assert_eq!(renderer.frames_submitted(), 0);
    }

    #[test]
    fn zero_sized_target_fails_init() {
        let mut renderer = Renderer::new(OffscreenSurface::new(0, 0));
        // Adapter-less machines fail earlier in the chain; either way init
        // reports an error and the renderer stays uninitialized.
        assert!(renderer.init_blocking().is_err());
        assert!(!renderer.is_ready());
    }

    // ── GPU-backed properties (skipped when no adapter is present) ────────

    fn try_init(width: u32, height: u32) -> Option<Renderer<OffscreenSurface>> {
        let mut renderer = Renderer::new(OffscreenSurface::new(width, height));
        match renderer.init_blocking() {
            Ok(()) => Some(renderer),
            Err(err) => {
                eprintln!("skipping GPU-backed test: {err}");
                None
            }
        }
    }

    #[test]
    fn sixty_frames_advance_and_submit() {
        let Some(mut renderer) = try_init(64, 64) else {
            return;
        };
        for _ in 0..60 {
            renderer.draw_frame();
        }
        assert_eq!(renderer.frames_submitted(), 60);
        assert!((renderer.angle() - 60.0 * DEFAULT_ANGLE_INCREMENT).abs() < 1e-3);
        assert!(renderer.frames_in_flight() <= 3);
    }

    #[test]
    fn reinit_rebuilds_the_context() {
        let Some(mut renderer) = try_init(32, 32) else {
            return;
        };
        renderer.draw_frame();
        renderer.init_blocking().expect("re-init failed");
        assert!(renderer.is_ready());
        renderer.draw_frame();
        assert_eq!(renderer.frames_submitted(), 2);
    }

    #[test]
    fn teardown_with_frames_in_flight_completes() {
        let Some(mut renderer) = try_init(32, 32) else {
            return;
        };
        for _ in 0..5 {
            renderer.draw_frame();
        }
        // Drop drains the inflight gate before buffers are released.
        drop(renderer);
    }

    // ── transient surface unavailability ──────────────────────────────────

    /// Binding that reports "no drawable" for a configurable number of
    /// acquires before delegating to a real offscreen target.
    struct FlakySurface {
        inner: OffscreenSurface,
        unavailable: u32,
    }

    impl SurfaceBinding for FlakySurface {
        fn connect(&mut self, instance: &wgpu::Instance) -> Result<(), InitError> {
            self.inner.connect(instance)
        }

        fn configure(
            &mut self,
            adapter: &wgpu::Adapter,
            device: &wgpu::Device,
        ) -> Result<wgpu::TextureFormat, InitError> {
            self.inner.configure(adapter, device)
        }

        fn acquire(&mut self, device: &wgpu::Device) -> Acquire {
            if self.unavailable > 0 {
                self.unavailable -= 1;
                return Acquire::NotReady;
            }
            self.inner.acquire(device)
        }
    }

    #[test]
    fn skipped_frames_still_advance_the_angle() {
        let surface = FlakySurface {
            inner: OffscreenSurface::new(32, 32),
            unavailable: 3,
        };
        let mut renderer = Renderer::new(surface);
        if let Err(err) = renderer.init_blocking() {
            eprintln!("skipping GPU-backed test: {err}");
            return;
        }

        for _ in 0..3 {
            renderer.draw_frame();
        }
        assert_eq!(renderer.frames_submitted(), 0);
        assert!((renderer.angle() - 3.0 * DEFAULT_ANGLE_INCREMENT).abs() < 1e-5);

        // Drawables come back; submission resumes.
        renderer.draw_frame();
        assert_eq!(renderer.frames_submitted(), 1);
    }

    // ── surface loss ──────────────────────────────────────────────────────

    /// Binding whose drawable source dies after init.
    struct DyingSurface {
        inner: OffscreenSurface,
    }

    impl SurfaceBinding for DyingSurface {
        fn connect(&mut self, instance: &wgpu::Instance) -> Result<(), InitError> {
            self.inner.connect(instance)
        }

        fn configure(
            &mut self,
            adapter: &wgpu::Adapter,
            device: &wgpu::Device,
        ) -> Result<wgpu::TextureFormat, InitError> {
            self.inner.configure(adapter, device)
        }

        fn acquire(&mut self, _device: &wgpu::Device) -> Acquire {
            Acquire::Lost
        }
    }

    #[test]
    fn lost_surface_latches_out_of_ready() {
        let surface = DyingSurface {
            inner: OffscreenSurface::new(32, 32),
        };
        let mut renderer = Renderer::new(surface);
        if let Err(err) = renderer.init_blocking() {
            eprintln!("skipping GPU-backed test: {err}");
            return;
        }

        renderer.draw_frame();
        assert!(!renderer.is_ready());
        let angle_after_loss = renderer.angle();

        // Further draws are rejected until an external re-init.
        renderer.draw_frame();
        assert_eq!(renderer.angle(), angle_after_loss);
        assert_eq!(renderer.frames_submitted(), 0);
    }
}
