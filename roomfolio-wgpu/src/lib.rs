//! Roomfolio WebGPU backend.
//!
//! Owns the device, the canvas surface and every GPU resource of the page.
//! The runtime hands it one [`RenderFrame`](roomfolio_gpu_shared::frame::RenderFrame)
//! per animation frame.

mod backend;
mod error;
mod handle;

pub use backend::{GpuBackend, GpuMesh, GpuTexture};
pub use error::BackendError;
pub use handle::HandleStore;
