use thiserror::Error;

/// Failures raised by the WebGPU backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is out of memory")]
    OutOfMemory,

    #[error("invalid texture data: {0}")]
    InvalidTexture(String),
}
