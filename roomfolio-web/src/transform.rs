use glam::{Mat4, Quat, Vec3};

use crate::model::ModelNode;

/// Local transform of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute world matrices for all nodes, composing parent * local under `root`.
/// Nodes must be ordered parents before children.
pub fn compute_world_transforms(nodes: &mut [ModelNode], root: Mat4) {
    let n = nodes.len();
    for i in 0..n {
        let local = nodes[i].transform.matrix();
        let parent = match nodes[i].parent {
            Some(p) if p < i => nodes[p].world,
            Some(p) => {
                log::warn!("Node {i} listed before its parent {p}");
                root
            }
            None => root,
        };
        nodes[i].world = parent * local;
    }
}
