use glam::{Mat4, Quat, Vec3};
use gltf::image::Format;
use roomfolio_gpu_shared::frame::{MeshData, TextureData};

use crate::error::ExperienceError;
use crate::transform::{compute_world_transforms, Transform};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Script a site's `decoder_path` directory has to contain.
pub const DRACO_DECODER_SCRIPT: &str = "draco_decoder.js";

/// Draco attribute ids of one compressed primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DracoAttributes {
    pub position: u32,
    pub normal: Option<u32>,
    pub uv: Option<u32>,
}

/// Decodes `KHR_draco_mesh_compression` payloads. Attributes the decoder
/// leaves empty are filled with defaults by the model loader.
pub trait DracoDecoder {
    fn decode(
        &mut self,
        compressed: &[u8],
        attributes: &DracoAttributes,
    ) -> Result<MeshData, ExperienceError>;
}

/// One primitive of a node: mesh + material.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    /// Index into `RoomModel::meshes`.
    pub mesh: usize,
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    /// Index into `RoomModel::textures`.
    pub texture: Option<usize>,
}

/// A node of the room hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub parent: Option<usize>,
    pub transform: Transform,
    pub world: Mat4,
    pub parts: Vec<ModelPart>,
}

/// Decoded room model: nodes ordered parents first, CPU-side geometry and images.
#[derive(Debug, Clone, Default)]
pub struct RoomModel {
    pub nodes: Vec<ModelNode>,
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureData>,
}

impl RoomModel {
    /// Decode a binary glTF (`.glb`) file with uncompressed geometry.
    pub fn from_glb(bytes: &[u8]) -> Result<Self, ExperienceError> {
        Self::from_glb_with(bytes, None)
    }

    /// Whether the file declares `KHR_draco_mesh_compression` as required.
    pub fn requires_draco(bytes: &[u8]) -> Result<bool, ExperienceError> {
        let header = gltf::Gltf::from_slice_without_validation(bytes)?;
        Ok(header.extensions_required().any(|ext| ext == DRACO_EXTENSION))
    }

    /// Decode a glTF file, handing Draco-compressed primitives to `draco`.
    /// Without a decoder such files are `UnsupportedModel`.
    pub fn from_glb_with(
        bytes: &[u8],
        draco: Option<&mut dyn DracoDecoder>,
    ) -> Result<Self, ExperienceError> {
        let header = gltf::Gltf::from_slice_without_validation(bytes)?;
        let compressed = header.extensions_required().any(|ext| ext == DRACO_EXTENSION);
        let (document, buffers, images) = if compressed {
            if draco.is_none() {
                return Err(ExperienceError::UnsupportedModel(format!(
                    "meshes use {DRACO_EXTENSION}; set `decoder_path` or export the model uncompressed"
                )));
            }
            // The validating importer rejects unknown required extensions.
            let gltf::Gltf { document, blob } = header;
            let buffers = gltf::import_buffers(&document, None, blob)?;
            let images = gltf::import_images(&document, None, &buffers)?;
            (document, buffers, images)
        } else {
            gltf::import_slice(bytes)?
        };

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| ExperienceError::Model("file contains no scene".into()))?;

        let mut builder = ModelBuilder {
            document: &document,
            buffers: &buffers,
            images: &images,
            draco,
            model: RoomModel::default(),
            image_slots: vec![None; images.len()],
        };
        for root in scene.nodes() {
            builder.visit(&root, None)?;
        }

        let mut model = builder.model;
        compute_world_transforms(&mut model.nodes, Mat4::IDENTITY);
        log::info!(
            "Decoded model: {} nodes, {} meshes, {} textures",
            model.nodes.len(),
            model.meshes.len(),
            model.textures.len()
        );
        Ok(model)
    }

    /// Assemble a model from already decoded data.
    pub fn from_parts(
        mut nodes: Vec<ModelNode>,
        meshes: Vec<MeshData>,
        textures: Vec<TextureData>,
    ) -> Result<Self, ExperienceError> {
        for (i, node) in nodes.iter().enumerate() {
            if node.parent.is_some_and(|p| p >= i) {
                return Err(ExperienceError::Model(format!(
                    "node `{}` is listed before its parent",
                    node.name
                )));
            }
            for part in &node.parts {
                if part.mesh >= meshes.len() || part.texture.is_some_and(|t| t >= textures.len()) {
                    return Err(ExperienceError::Model(format!(
                        "node `{}` refers to missing data",
                        node.name
                    )));
                }
            }
        }
        compute_world_transforms(&mut nodes, Mat4::IDENTITY);
        Ok(Self {
            nodes,
            meshes,
            textures,
        })
    }

    /// Index of the first node with this name, ignoring ASCII case.
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.name.eq_ignore_ascii_case(name))
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// `index` and every node below it.
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut inside = vec![false; self.nodes.len()];
        let mut out = Vec::new();
        for (i, node) in self.nodes.iter().enumerate().skip(index) {
            if i == index || node.parent.is_some_and(|p| inside[p]) {
                inside[i] = true;
                out.push(i);
            }
        }
        out
    }
}

struct ModelBuilder<'a, 'd> {
    document: &'a gltf::Document,
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    draco: Option<&'d mut dyn DracoDecoder>,
    model: RoomModel,
    /// glTF image index -> index in `model.textures`
    image_slots: Vec<Option<usize>>,
}

impl ModelBuilder<'_, '_> {
    fn visit(&mut self, node: &gltf::Node, parent: Option<usize>) -> Result<(), ExperienceError> {
        let (t, r, s) = node.transform().decomposed();
        let parts = match node.mesh() {
            Some(mesh) => self.parts(&mesh)?,
            None => Vec::new(),
        };

        let index = self.model.nodes.len();
        self.model.nodes.push(ModelNode {
            name: node.name().unwrap_or_default().to_string(),
            parent,
            transform: Transform {
                position: Vec3::from(t),
                rotation: Quat::from_array(r),
                scale: Vec3::from(s),
            },
            world: Mat4::IDENTITY,
            parts,
        });

        for child in node.children() {
            self.visit(&child, Some(index))?;
        }
        Ok(())
    }

    fn parts(&mut self, mesh: &gltf::Mesh) -> Result<Vec<ModelPart>, ExperienceError> {
        let mut parts = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping non-triangle primitive in mesh `{}`",
                    mesh.name().unwrap_or_default()
                );
                continue;
            }

            let name = mesh.name().unwrap_or_default();
            let data = match primitive.extension_value(DRACO_EXTENSION) {
                Some(ext) => self.draco_mesh(ext, name)?,
                None => match self.read_mesh(&primitive) {
                    Some(data) => data,
                    None => {
                        log::warn!("Skipping primitive without positions in mesh `{name}`");
                        continue;
                    }
                },
            };
            if !data.is_consistent() {
                return Err(ExperienceError::Model(format!(
                    "mesh `{}` has mismatched attributes",
                    mesh.name().unwrap_or_default()
                )));
            }

            let pbr = primitive.material().pbr_metallic_roughness();
            let texture = match pbr.base_color_texture() {
                Some(info) => Some(self.texture(info.texture().source().index())?),
                None => None,
            };

            self.model.meshes.push(data);
            parts.push(ModelPart {
                mesh: self.model.meshes.len() - 1,
                base_color: pbr.base_color_factor(),
                texture,
            });
        }
        Ok(parts)
    }

    fn read_mesh(&self, primitive: &gltf::Primitive) -> Option<MeshData> {
        let buffers = self.buffers;
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
        let count = positions.len();

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(n) => n.collect(),
            None => vec![[0.0, 1.0, 0.0]; count],
        };
        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(tc) => tc.into_f32().collect(),
            None => vec![[0.0, 0.0]; count],
        };
        let indices: Vec<u32> = match reader.read_indices() {
            Some(idx) => idx.into_u32().collect(),
            None => (0..count as u32).collect(),
        };

        Some(MeshData {
            positions: positions.into_iter().flatten().collect(),
            normals: normals.into_iter().flatten().collect(),
            uvs: uvs.into_iter().flatten().collect(),
            indices,
        })
    }

    fn draco_mesh(
        &mut self,
        ext: &gltf::json::Value,
        name: &str,
    ) -> Result<MeshData, ExperienceError> {
        let (view, attributes) = draco_info(ext)
            .ok_or_else(|| ExperienceError::Model(format!("mesh `{name}` has a malformed {DRACO_EXTENSION} entry")))?;
        let view = self
            .document
            .views()
            .nth(view)
            .ok_or_else(|| ExperienceError::Model(format!("mesh `{name}` points at a missing buffer view")))?;
        let compressed = self
            .buffers
            .get(view.buffer().index())
            .and_then(|b| b.0.get(view.offset()..view.offset() + view.length()))
            .ok_or_else(|| ExperienceError::Model(format!("mesh `{name}` points past its buffer")))?;
        let decoder = self
            .draco
            .as_deref_mut()
            .ok_or_else(|| ExperienceError::UnsupportedModel(format!("mesh `{name}` is Draco-compressed")))?;

        let mut data = decoder.decode(compressed, &attributes)?;
        let count = data.positions.len() / 3;
        if data.normals.is_empty() {
            data.normals = [0.0, 1.0, 0.0].repeat(count);
        }
        if data.uvs.is_empty() {
            data.uvs = vec![0.0; count * 2];
        }
        if data.indices.is_empty() {
            data.indices = (0..count as u32).collect();
        }
        Ok(data)
    }

    fn texture(&mut self, image: usize) -> Result<usize, ExperienceError> {
        if let Some(Some(slot)) = self.image_slots.get(image) {
            return Ok(*slot);
        }
        let data = self
            .images
            .get(image)
            .ok_or_else(|| ExperienceError::Model(format!("missing image {image}")))?;
        self.model.textures.push(to_rgba8(data)?);
        let slot = self.model.textures.len() - 1;
        self.image_slots[image] = Some(slot);
        Ok(slot)
    }
}

/// Buffer view and attribute ids of a `KHR_draco_mesh_compression` entry.
fn draco_info(ext: &gltf::json::Value) -> Option<(usize, DracoAttributes)> {
    let view = ext.get("bufferView")?.as_u64()? as usize;
    let attrs = ext.get("attributes")?;
    let id = |key: &str| attrs.get(key).and_then(|v| v.as_u64()).map(|v| v as u32);
    Some((
        view,
        DracoAttributes {
            position: id("POSITION")?,
            normal: id("NORMAL"),
            uv: id("TEXCOORD_0"),
        },
    ))
}

/// Expand an 8-bit glTF image to RGBA8.
fn to_rgba8(image: &gltf::image::Data) -> Result<TextureData, ExperienceError> {
    let px = &image.pixels;
    let rgba = match image.format {
        Format::R8G8B8A8 => px.clone(),
        Format::R8G8B8 => px.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 255]).collect(),
        Format::R8G8 => px.chunks_exact(2).flat_map(|c| [c[0], c[1], 0, 255]).collect(),
        Format::R8 => px.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            return Err(ExperienceError::Model(format!(
                "unsupported texture format {other:?}"
            )))
        }
    };
    Ok(TextureData {
        width: image.width,
        height: image.height,
        rgba,
    })
}
