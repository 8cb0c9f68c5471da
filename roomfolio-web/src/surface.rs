use roomfolio_gpu_shared::frame::{MeshData, MeshHandle, RenderFrame, TextureData, TextureHandle};

use crate::error::ExperienceError;
use crate::resources::VideoInfo;
use crate::sizes::Viewport;

/// What the experience needs from a renderer. The browser build implements it
/// over the wgpu backend; tests use a recording fake.
pub trait RenderSurface {
    /// Match the drawing buffer to the viewport (device pixels).
    fn resize(&mut self, viewport: &Viewport);

    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle;

    fn upload_texture(&mut self, texture: &TextureData) -> Result<TextureHandle, ExperienceError>;

    /// Texture streaming frames of the named video asset, if the surface can show video.
    fn video_texture(&mut self, asset: &str, info: &VideoInfo) -> Option<TextureHandle>;

    fn draw(&mut self, frame: &RenderFrame) -> Result<(), ExperienceError>;
}
