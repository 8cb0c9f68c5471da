use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use roomfolio_gpu_shared::frame::{DrawCommand, MeshData, MeshHandle};
use roomfolio_gpu_shared::math::linear_from_hex;

use crate::surface::RenderSurface;

const PLANE_SIZE: f32 = 100.0;
const CIRCLE_RADIUS: f32 = 5.0;
const CIRCLE_SEGMENTS: u32 = 64;

const PLANE_COLOR: u32 = 0xffe6a2;
const CIRCLE_COLORS: [u32; 3] = [0xe5a1aa, 0x8395cd, 0x7ad0ac];
const CIRCLE_POSITIONS: [[f32; 3]; 3] = [[0.0, -0.29, 0.0], [2.0, -0.28, 0.0], [0.0, -0.27, 0.0]];

pub const CIRCLE_COUNT: usize = 3;

struct Circle {
    color: [f32; 4],
    position: Vec3,
    scale: f32,
}

/// Ground plane plus three colored discs that grow as sections are scrolled through.
pub struct Floor {
    plane: MeshHandle,
    disc: MeshHandle,
    plane_color: [f32; 4],
    circles: [Circle; CIRCLE_COUNT],
}

impl Floor {
    pub fn build<S: RenderSurface + ?Sized>(surface: &mut S) -> Self {
        let plane = surface.upload_mesh(&plane_mesh(PLANE_SIZE));
        let disc = surface.upload_mesh(&disc_mesh(CIRCLE_RADIUS, CIRCLE_SEGMENTS));
        let circles = [0, 1, 2].map(|i| Circle {
            color: rgba(CIRCLE_COLORS[i]),
            position: Vec3::from(CIRCLE_POSITIONS[i]),
            scale: 0.0,
        });
        Self {
            plane,
            disc,
            plane_color: rgba(PLANE_COLOR),
            circles,
        }
    }

    pub fn set_circle_scale(&mut self, index: usize, scale: f32) {
        if let Some(c) = self.circles.get_mut(index) {
            c.scale = scale.max(0.0);
        }
    }

    pub fn circle_scale(&self, index: usize) -> Option<f32> {
        self.circles.get(index).map(|c| c.scale)
    }

    pub fn draws(&self, out: &mut Vec<DrawCommand>) {
        out.push(DrawCommand {
            mesh: self.plane,
            model: Mat4::from_translation(Vec3::new(0.0, -0.3, 0.0)),
            base_color: self.plane_color,
            texture: None,
            unlit: false,
        });
        for c in self.circles.iter().filter(|c| c.scale > 0.0) {
            out.push(DrawCommand {
                mesh: self.disc,
                model: Mat4::from_translation(c.position) * Mat4::from_scale(Vec3::splat(c.scale)),
                base_color: c.color,
                texture: None,
                unlit: false,
            });
        }
    }
}

fn rgba(hex: u32) -> [f32; 4] {
    let [r, g, b] = linear_from_hex(hex);
    [r, g, b, 1.0]
}

/// Square in the XZ plane facing +Y.
fn plane_mesh(size: f32) -> MeshData {
    let h = size / 2.0;
    MeshData {
        positions: vec![-h, 0.0, -h, h, 0.0, -h, h, 0.0, h, -h, 0.0, h],
        normals: [0.0, 1.0, 0.0].repeat(4),
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Triangle fan disc in the XZ plane facing +Y.
fn disc_mesh(radius: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData {
        positions: vec![0.0, 0.0, 0.0],
        normals: vec![0.0, 1.0, 0.0],
        uvs: vec![0.5, 0.5],
        indices: Vec::new(),
    };
    for i in 0..segments {
        let a = i as f32 / segments as f32 * TAU;
        let (s, c) = a.sin_cos();
        mesh.positions.extend([c * radius, 0.0, s * radius]);
        mesh.normals.extend([0.0, 1.0, 0.0]);
        mesh.uvs.extend([0.5 + c * 0.5, 0.5 + s * 0.5]);
    }
    for i in 0..segments {
        let cur = 1 + i;
        let next = 1 + (i + 1) % segments;
        // counter-clockwise seen from above
        mesh.indices.extend([0, next, cur]);
    }
    mesh
}
