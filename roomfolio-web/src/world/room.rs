use glam::{Mat4, Quat, Vec3};
use roomfolio_gpu_shared::frame::{DrawCommand, MeshHandle, TextureHandle};
use roomfolio_gpu_shared::math::damp;

use crate::config::SceneConfig;
use crate::error::ExperienceError;
use crate::model::RoomModel;
use crate::sizes::DeviceClass;
use crate::surface::RenderSurface;
use crate::timeline::Ease;
use crate::transform::{compute_world_transforms, Transform};

/// Radians of yaw at the viewport edge.
const POINTER_YAW: f32 = 0.05;
const POINTER_DAMPING: f32 = 0.1;

/// Share of the reveal each node's pop-in takes.
const REVEAL_SLOT: f32 = 0.3;

/// Uniform scale of the whole room per device class.
pub fn base_scale(device: DeviceClass) -> f32 {
    match device {
        DeviceClass::Desktop => 0.11,
        DeviceClass::Mobile => 0.07,
    }
}

/// The loaded room: its node hierarchy, GPU handles, and the root transform
/// driven by the intro, the pointer and the scroll controls.
pub struct Room {
    model: RoomModel,
    meshes: Vec<MeshHandle>,
    textures: Vec<TextureHandle>,
    base: Vec<Transform>,
    /// Nodes drawn with the video texture.
    screen: Vec<bool>,
    video: Option<TextureHandle>,
    cube: Option<usize>,
    intro: Vec<usize>,
    pub position: Vec3,
    pub scale: f32,
    yaw: f32,
    yaw_target: f32,
}

impl Room {
    pub fn build<S: RenderSurface + ?Sized>(
        model: &RoomModel,
        scene: &SceneConfig,
        video: Option<TextureHandle>,
        device: DeviceClass,
        surface: &mut S,
    ) -> Result<Self, ExperienceError> {
        let meshes = model.meshes.iter().map(|m| surface.upload_mesh(m)).collect();
        let textures = model
            .textures
            .iter()
            .map(|t| surface.upload_texture(t))
            .collect::<Result<Vec<_>, _>>()?;

        let mut screen = vec![false; model.nodes.len()];
        match model.find_node(&scene.screen_node) {
            Some(idx) => {
                for i in model.subtree(idx) {
                    screen[i] = true;
                }
            }
            None => log::warn!("Screen node `{}` not found in model", scene.screen_node),
        }

        let cube = model.find_node(&scene.cube_node);
        if cube.is_none() {
            log::warn!("Loader cube `{}` not found in model", scene.cube_node);
        }

        let intro: Vec<usize> = scene
            .intro_nodes
            .iter()
            .filter_map(|name| {
                let found = model.find_node(name);
                if found.is_none() {
                    log::warn!("Intro node `{name}` not found in model");
                }
                found
            })
            .collect();

        let mut room = Self {
            model: model.clone(),
            meshes,
            textures,
            base: model.nodes.iter().map(|n| n.transform).collect(),
            screen,
            video,
            cube,
            intro,
            position: Vec3::ZERO,
            scale: base_scale(device),
            yaw: 0.0,
            yaw_target: 0.0,
        };
        room.set_reveal(0.0);
        room.set_cube_scale(0.0);
        room.update_transforms();
        Ok(room)
    }

    /// Pop intro nodes in one after another as `progress` goes 0 -> 1.
    pub fn set_reveal(&mut self, progress: f32) {
        let n = self.intro.len();
        let step = if n > 1 {
            (1.0 - REVEAL_SLOT) / (n - 1) as f32
        } else {
            0.0
        };
        for (k, &idx) in self.intro.iter().enumerate() {
            let local = ((progress - k as f32 * step) / REVEAL_SLOT).clamp(0.0, 1.0);
            let s = Ease::BackOut.apply(local);
            self.model.nodes[idx].transform.scale = self.base[idx].scale * s;
        }
    }

    pub fn set_cube_scale(&mut self, scale: f32) {
        if let Some(idx) = self.cube {
            self.model.nodes[idx].transform.scale = self.base[idx].scale * scale;
        }
    }

    pub fn set_cube_rotation(&mut self, yaw: f32) {
        if let Some(idx) = self.cube {
            self.model.nodes[idx].transform.rotation =
                self.base[idx].rotation * Quat::from_rotation_y(yaw);
        }
    }

    /// Aim the room's yaw at the pointer; `pointer_x` is in `[-1, 1]`.
    pub fn follow_pointer(&mut self, pointer_x: f32) {
        self.yaw_target = pointer_x * POINTER_YAW;
        self.yaw = damp(self.yaw, self.yaw_target, POINTER_DAMPING);
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn root_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw),
            self.position,
        )
    }

    pub fn update_transforms(&mut self) {
        let root = self.root_matrix();
        compute_world_transforms(&mut self.model.nodes, root);
    }

    pub fn model(&self) -> &RoomModel {
        &self.model
    }

    pub fn node_scale(&self, name: &str) -> Option<Vec3> {
        self.model
            .find_node(name)
            .map(|i| self.model.nodes[i].transform.scale)
    }

    /// Nodes collapsed to zero scale by the intro, together with their descendants.
    fn hidden_nodes(&self) -> Vec<bool> {
        let mut hidden = vec![false; self.model.nodes.len()];
        for (i, node) in self.model.nodes.iter().enumerate() {
            let collapsed = node.transform.scale.cmpeq(Vec3::ZERO).any();
            hidden[i] = collapsed || node.parent.is_some_and(|p| hidden[p]);
        }
        hidden
    }

    pub fn draws(&self, out: &mut Vec<DrawCommand>) {
        let hidden = self.hidden_nodes();
        for (i, node) in self.model.nodes.iter().enumerate() {
            if node.parts.is_empty() || hidden[i] {
                continue;
            }
            for part in &node.parts {
                let on_screen = self.screen[i] && self.video.is_some();
                out.push(DrawCommand {
                    mesh: self.meshes[part.mesh],
                    model: node.world,
                    base_color: if on_screen { [1.0; 4] } else { part.base_color },
                    texture: if on_screen {
                        self.video
                    } else {
                        part.texture.map(|t| self.textures[t])
                    },
                    unlit: on_screen,
                });
            }
        }
    }
}
