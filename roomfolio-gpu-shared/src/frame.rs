use crate::uniforms::FrameUniforms;
use glam::Mat4;

/// Opaque handle to a mesh uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Opaque handle to a texture uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Mesh data ready for upload. Attributes are flat arrays
/// (3 floats per position/normal, 2 per uv).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// True when attribute arrays agree on the vertex count and every index is in range.
    pub fn is_consistent(&self) -> bool {
        let n = self.vertex_count();
        self.positions.len() == n * 3
            && self.normals.len() == n * 3
            && self.uvs.len() == n * 2
            && self.indices.iter().all(|&i| (i as usize) < n)
    }
}

/// RGBA8 texture data ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// One mesh drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub base_color: [f32; 4],
    pub texture: Option<TextureHandle>,
    pub unlit: bool,
}

/// Everything the backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub uniforms: FrameUniforms,
    /// Linear RGB clear color.
    pub clear_color: [f32; 3],
    pub draws: Vec<DrawCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            uvs: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_mesh_consistent() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.is_consistent());
    }

    #[test]
    fn test_mesh_index_out_of_range() {
        let mut mesh = triangle();
        mesh.indices.push(3);
        assert!(!mesh.is_consistent());
    }

    #[test]
    fn test_mesh_missing_uvs() {
        let mut mesh = triangle();
        mesh.uvs.truncate(4);
        assert!(!mesh.is_consistent());
    }
}
