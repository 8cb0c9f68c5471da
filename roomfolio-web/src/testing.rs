//! Test doubles shared by the unit tests.

use glam::Mat4;
use roomfolio_gpu_shared::frame::{MeshData, MeshHandle, RenderFrame, TextureData, TextureHandle};

use crate::error::ExperienceError;
use crate::model::{ModelNode, ModelPart, RoomModel};
use crate::resources::VideoInfo;
use crate::sizes::Viewport;
use crate::surface::RenderSurface;
use crate::transform::Transform;

/// Surface that records what it was asked to do.
#[derive(Default)]
pub struct RecordingSurface {
    pub meshes: usize,
    pub textures: usize,
    pub videos: Vec<String>,
    pub frames: Vec<RenderFrame>,
    pub resizes: Vec<Viewport>,
    next: u64,
}

impl RecordingSurface {
    fn next(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl RenderSurface for RecordingSurface {
    fn resize(&mut self, viewport: &Viewport) {
        self.resizes.push(*viewport);
    }

    fn upload_mesh(&mut self, _mesh: &MeshData) -> MeshHandle {
        self.meshes += 1;
        MeshHandle(self.next())
    }

    fn upload_texture(&mut self, _texture: &TextureData) -> Result<TextureHandle, ExperienceError> {
        self.textures += 1;
        Ok(TextureHandle(self.next()))
    }

    fn video_texture(&mut self, asset: &str, _info: &VideoInfo) -> Option<TextureHandle> {
        self.videos.push(asset.to_string());
        Some(TextureHandle(self.next()))
    }

    fn draw(&mut self, frame: &RenderFrame) -> Result<(), ExperienceError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

pub fn triangle() -> MeshData {
    MeshData {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
    }
}

pub fn node(name: &str, parent: Option<usize>, mesh: Option<usize>, texture: Option<usize>) -> ModelNode {
    ModelNode {
        name: name.into(),
        parent,
        transform: Transform::IDENTITY,
        world: Mat4::IDENTITY,
        parts: mesh
            .map(|mesh| ModelPart {
                mesh,
                base_color: [0.8, 0.8, 0.8, 1.0],
                texture,
            })
            .into_iter()
            .collect(),
    }
}

/// Room with a screen, a loader cube and the default intro nodes.
pub fn sample_room() -> RoomModel {
    let mut nodes = vec![
        node("Room", None, None, None),
        node("Screen", Some(0), Some(0), None),
        node("Cube", Some(0), Some(1), None),
        node("Desks", Some(0), Some(2), Some(0)),
    ];
    for name in ["Shelves", "Computer", "Chair", "Aquarium", "Clock", "Lamp", "Flowers"] {
        nodes.push(node(name, Some(0), Some(2), None));
    }
    let texture = TextureData {
        width: 1,
        height: 1,
        rgba: vec![255; 4],
    };
    match RoomModel::from_parts(nodes, vec![triangle(), triangle(), triangle()], vec![texture]) {
        Ok(model) => model,
        Err(e) => panic!("sample room is malformed: {e}"),
    }
}
