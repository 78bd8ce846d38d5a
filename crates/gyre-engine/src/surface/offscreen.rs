use crate::error::InitError;

use super::{Acquire, Drawable, SurfaceBinding};

/// Binding that renders into an ordinary texture instead of a swapchain.
///
/// Presentation is a no-op and a drawable is always available. Used for
/// headless operation and by GPU-backed tests.
pub struct OffscreenSurface {
    size: (u32, u32),
    format: wgpu::TextureFormat,
    target: Option<wgpu::Texture>,
}

impl OffscreenSurface {
    /// Creates a binding with a fixed target size (must be non-zero).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            target: None,
        }
    }
}

impl SurfaceBinding for OffscreenSurface {
    fn connect(&mut self, _instance: &wgpu::Instance) -> Result<(), InitError> {
        Ok(())
    }

    fn configure(
        &mut self,
        _adapter: &wgpu::Adapter,
        device: &wgpu::Device,
    ) -> Result<wgpu::TextureFormat, InitError> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(InitError::ZeroSize);
        }

        self.target = Some(device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gyre offscreen target"),
            size: wgpu::Extent3d {
                width: self.size.0,
                height: self.size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        }));

        Ok(self.format)
    }

    fn acquire(&mut self, _device: &wgpu::Device) -> Acquire {
        let Some(target) = self.target.as_ref() else {
            return Acquire::Lost;
        };

        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        Acquire::Ready(Drawable::transient(view, self.size))
    }
}
