use std::sync::Arc;

use crate::error::InitError;

use super::{Acquire, Drawable, SurfaceBinding};

/// Surface configuration preferences.
///
/// Keep this structure stable and minimal. Add configuration flags only when
/// a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct SurfaceInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and paces submission to the display.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for SurfaceInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Binding over a compositor-managed window handle.
///
/// Owns only the wgpu surface object; the native window is shared with the
/// host, which keeps it alive for the renderer's whole lifetime and forwards
/// resize notifications via [`resize`](Self::resize).
pub struct WindowSurface<W> {
    window: Arc<W>,
    init: SurfaceInit,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    size: (u32, u32),
}

impl<W> WindowSurface<W> {
    /// Wraps `window`. `size` is the current drawable size in physical
    /// pixels; hosts pass the window's inner size.
    pub fn new(window: Arc<W>, size: (u32, u32), init: SurfaceInit) -> Self {
        Self {
            window,
            init,
            surface: None,
            config: None,
            size,
        }
    }

    /// Records a new drawable size.
    ///
    /// Reconfiguration happens lazily on the next acquire. A zero dimension
    /// suspends acquisition until a non-zero resize arrives; wgpu cannot
    /// configure a 0x0 surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Current drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl<W> SurfaceBinding for WindowSurface<W>
where
    Arc<W>: Into<wgpu::SurfaceTarget<'static>>,
{
    fn connect(&mut self, instance: &wgpu::Instance) -> Result<(), InitError> {
        let surface = instance.create_surface(Arc::clone(&self.window))?;
        self.surface = Some(surface);
        self.config = None;
        Ok(())
    }

    fn compat_surface(&self) -> Option<&wgpu::Surface<'static>> {
        self.surface.as_ref()
    }

    fn configure(
        &mut self,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
    ) -> Result<wgpu::TextureFormat, InitError> {
        let Some(surface) = self.surface.as_ref() else {
            return Err(InitError::NoSurfaceFormat);
        };

        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(InitError::ZeroSize);
        }

        let caps = surface.get_capabilities(adapter);
        let format = choose_surface_format(&caps.formats, self.init.prefer_srgb)
            .ok_or(InitError::NoSurfaceFormat)?;
        let alpha_mode = choose_alpha_mode(&caps.alpha_modes, self.init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: self.init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        self.config = Some(config);

        Ok(format)
    }

    fn acquire(&mut self, device: &wgpu::Device) -> Acquire {
        let (Some(surface), Some(config)) = (self.surface.as_ref(), self.config.as_mut()) else {
            return Acquire::Lost;
        };

        // Zero-sized targets cannot be configured; treat as mid-resize.
        if self.size.0 == 0 || self.size.1 == 0 {
            return Acquire::NotReady;
        }

        if (config.width, config.height) != self.size {
            config.width = self.size.0;
            config.height = self.size.1;
            surface.configure(device, config);
        }

        match surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Acquire::Ready(Drawable::presentable(
                    view,
                    (config.width, config.height),
                    texture,
                ))
            }
            Err(err) => match classify_surface_error(&err) {
                // Reconfiguring now lets the next frame recover.
                ErrorDisposition::Reconfigure => {
                    surface.configure(device, config);
                    Acquire::NotReady
                }
                ErrorDisposition::Skip => Acquire::NotReady,
                ErrorDisposition::Lost => Acquire::Lost,
            },
        }
    }
}

/// What to do after a failed drawable acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ErrorDisposition {
    /// Surface needs reconfiguration; rendering may resume next frame.
    Reconfigure,
    /// Transient error; skip the current frame.
    Skip,
    /// Fatal error (commonly OOM); requires external re-initialization.
    Lost,
}

pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> ErrorDisposition {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => ErrorDisposition::Reconfigure,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => ErrorDisposition::Skip,
        wgpu::SurfaceError::OutOfMemory => ErrorDisposition::Lost,
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if formats.contains(&f) {
                return Some(f);
            }
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── choose_surface_format ─────────────────────────────────────────────

    #[test]
    fn srgb_preference_picks_bgra_first() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn srgb_preference_accepts_rgba_when_bgra_missing() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
    }

    #[test]
    fn srgb_preference_falls_back_to_first_supported() {
        let formats = [wgpu::TextureFormat::Rgba16Float, wgpu::TextureFormat::Rgba8Unorm];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Rgba16Float)
        );
    }

    #[test]
    fn no_preference_takes_first_supported() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );
    }

    #[test]
    fn empty_format_list_yields_none() {
        assert_eq!(choose_surface_format(&[], true), None);
    }

    // ── choose_alpha_mode ─────────────────────────────────────────────────

    #[test]
    fn requested_alpha_mode_honored_when_supported() {
        let supported = [
            wgpu::CompositeAlphaMode::Opaque,
            wgpu::CompositeAlphaMode::PreMultiplied,
        ];
        assert_eq!(
            choose_alpha_mode(&supported, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::PreMultiplied
        );
    }

    #[test]
    fn unsupported_request_falls_back_to_first_supported() {
        let supported = [wgpu::CompositeAlphaMode::Opaque];
        assert_eq!(
            choose_alpha_mode(&supported, Some(wgpu::CompositeAlphaMode::PostMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn empty_support_list_falls_back_to_auto() {
        assert_eq!(choose_alpha_mode(&[], None), wgpu::CompositeAlphaMode::Auto);
    }

    // ── classify_surface_error ────────────────────────────────────────────

    #[test]
    fn lost_and_outdated_reconfigure() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Lost),
            ErrorDisposition::Reconfigure
        );
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Outdated),
            ErrorDisposition::Reconfigure
        );
    }

    #[test]
    fn timeout_skips_the_frame() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::Timeout),
            ErrorDisposition::Skip
        );
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(
            classify_surface_error(&wgpu::SurfaceError::OutOfMemory),
            ErrorDisposition::Lost
        );
    }
}
