use crate::error::InitError;
use crate::render::SpinPass;
use crate::surface::{Drawable, SurfaceBinding};

use super::sync::InflightGate;

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when
/// a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter preference passed to wgpu.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly
    /// necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Upper bound on submitted-but-incomplete frames (clamped to >= 1).
    ///
    /// Two keeps the GPU busy while the CPU prepares the next frame; larger
    /// values add latency without improving throughput for this workload.
    pub frames_in_flight: usize,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            frames_in_flight: 2,
        }
    }
}

/// Owns wgpu core objects and the per-frame submission state.
///
/// Exists only between a successful init and teardown; the facade treats it
/// as the marker of the *ready* state. Never rebuilt implicitly — device
/// loss is handled by explicit re-initialization, not inside the draw call.
///
/// Field order is release order: pass resources drop before the queue and
/// device, which drop before the adapter and instance.
pub(crate) struct DeviceContext {
    pass: SpinPass,
    gate: InflightGate,
    overrun_warned: bool,
    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    instance: wgpu::Instance,
}

impl DeviceContext {
    /// One-time GPU setup against `surface`.
    ///
    /// Acquisition order: instance → surface connect → adapter → device and
    /// queue → surface configure → pipeline and uniform slots. Any failure
    /// unwinds completely; no partial context is ever returned.
    pub(crate) async fn acquire<S: SurfaceBinding>(
        surface: &mut S,
        init: &DeviceInit,
    ) -> Result<Self, InitError> {
        // Use all backends to let wgpu pick the platform-optimal one.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        surface.connect(&instance)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface.compat_surface(),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("gyre device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let format = surface.configure(&adapter, &device)?;

        let frames_in_flight = init.frames_in_flight.max(1);

        // Pipeline/shader rejection is reported asynchronously by wgpu;
        // catch it here so a bad pipeline fails init instead of the first
        // draw.
        let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pass = SpinPass::new(&device, format, frames_in_flight);
        if let Some(err) = error_scope.pop().await {
            return Err(InitError::Pipeline(err.to_string()));
        }

        Ok(Self {
            pass,
            gate: InflightGate::new(frames_in_flight),
            overrun_warned: false,
            queue,
            device,
            adapter,
            instance,
        })
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub(crate) fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// Encodes, submits, and completion-tracks one frame.
    ///
    /// Blocks only while the inflight bound is reached; never waits for the
    /// frame submitted here.
    pub(crate) fn render(&mut self, drawable: &Drawable, angle: f32, frame_index: u64) {
        let slot = (frame_index % self.pass.slot_count() as u64) as usize;

        // The slot's previous frame must be off the GPU before its uniform
        // buffer is rewritten.
        let queue = &self.queue;
        let within_bound = self.gate.acquire(|| {
            // An empty submit drives device maintenance so completion
            // callbacks can fire while this thread waits.
            queue.submit(std::iter::empty::<wgpu::CommandBuffer>());
        });
        if !within_bound && !self.overrun_warned {
            log::warn!("frames-in-flight bound overrun; GPU is not reporting completion");
            self.overrun_warned = true;
        }

        self.pass
            .write_uniform(&self.queue, slot, angle, drawable.size);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gyre frame encoder"),
            });
        self.pass.encode(&mut encoder, &drawable.view, slot);

        self.queue.submit(std::iter::once(encoder.finish()));

        let token = self.gate.completion_token();
        self.queue.on_submitted_work_done(move || token.complete());
    }

    /// Waits for every in-flight frame to complete.
    pub(crate) fn drain(&self) {
        let queue = &self.queue;
        self.gate.drain(|| {
            queue.submit(std::iter::empty::<wgpu::CommandBuffer>());
        });
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        // The per-frame buffers the GPU may still read are released right
        // after this returns.
        self.drain();
    }
}
