use thiserror::Error;

/// Failures surfaced by [`Renderer::init`](crate::renderer::Renderer::init).
///
/// Initialization either succeeds completely or leaves the renderer
/// uninitialized; no partial GPU state survives a failed init.
#[derive(Debug, Error)]
pub enum InitError {
    /// No GPU adapter compatible with the requested surface was found.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The native presentable layer could not be wrapped in a surface.
    #[error("failed to create presentable surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// The adapter refused the requested device features or limits.
    #[error("failed to acquire GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface reports no texture format usable as a render target.
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    /// Pipeline or shader compilation was rejected by the device.
    #[error("render pipeline rejected: {0}")]
    Pipeline(String),

    /// The drawable target has a zero dimension at init time.
    #[error("drawable target has zero size")]
    ZeroSize,
}
