use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::math::normal_matrix;

/// Per-frame uniform block (`@group(0) @binding(0)` in `room.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = direction the sun light travels, w unused
    pub sun_direction: [f32; 4],
    /// rgb = linear color, w = intensity
    pub sun_color: [f32; 4],
    /// rgb = linear color, w = intensity
    pub ambient_color: [f32; 4],
    /// x = exposure
    pub params: [f32; 4],
}

impl FrameUniforms {
    pub fn new(
        view_proj: Mat4,
        sun_position: Vec3,
        sun_color: [f32; 3],
        sun_intensity: f32,
        ambient_color: [f32; 3],
        ambient_intensity: f32,
        exposure: f32,
    ) -> Self {
        // Directional light aimed at the origin from its position.
        let dir = (-sun_position).normalize_or_zero();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            sun_direction: [dir.x, dir.y, dir.z, 0.0],
            sun_color: [sun_color[0], sun_color[1], sun_color[2], sun_intensity],
            ambient_color: [ambient_color[0], ambient_color[1], ambient_color[2], ambient_intensity],
            params: [exposure, 0.0, 0.0, 0.0],
        }
    }
}

/// Per-draw uniform block (`@group(1) @binding(0)`), written at a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x = unlit
    pub flags: [u32; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4, base_color: [f32; 4], unlit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix(&model).to_cols_array_2d(),
            base_color,
            flags: [unlit as u32, 0, 0, 0],
        }
    }
}

/// Stride between object blocks in the dynamic uniform buffer.
/// WebGPU requires dynamic offsets aligned to 256 bytes.
pub const OBJECT_UNIFORM_STRIDE: u64 = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn test_object_block_fits_stride() {
        assert!(std::mem::size_of::<ObjectUniforms>() as u64 <= OBJECT_UNIFORM_STRIDE);
    }

    #[test]
    fn test_sun_direction_points_at_origin() {
        let u = FrameUniforms::new(
            Mat4::IDENTITY,
            Vec3::new(0.0, 10.0, 0.0),
            [1.0; 3],
            3.0,
            [1.0; 3],
            1.0,
            1.75,
        );
        assert_eq!(u.sun_direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(u.sun_color[3], 3.0);
        assert_eq!(u.params[0], 1.75);
    }

    #[test]
    fn test_unlit_flag() {
        let u = ObjectUniforms::new(Mat4::IDENTITY, [1.0; 4], true);
        assert_eq!(u.flags[0], 1);
        let u = ObjectUniforms::new(Mat4::IDENTITY, [1.0; 4], false);
        assert_eq!(u.flags[0], 0);
    }
}
