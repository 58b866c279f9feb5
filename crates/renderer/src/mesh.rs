//! GPU mesh: one static vertex array, its textures, one draw call.

use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexBufferLayout, VertexStepMode};

use asset::MeshVertex;

use crate::error::RenderError;
use crate::gpu::{Gpu, TextureId, VertexArrayId};
use crate::shader::Shader;

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };

    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl From<MeshVertex> for Vertex {
    fn from(v: MeshVertex) -> Self {
        Self::new(v.position, v.normal, v.uv)
    }
}

/// What a texture contributes to the material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Emission,
}

impl TextureKind {
    pub const ALL: [TextureKind; 3] = [Self::Diffuse, Self::Specular, Self::Emission];

    pub fn name(self) -> &'static str {
        match self {
            Self::Diffuse => "Diffuse",
            Self::Specular => "Specular",
            Self::Emission => "Emission",
        }
    }
}

/// Kind plus 1-based position among the mesh's textures of that kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse(u32),
    Specular(u32),
    Emission(u32),
}

impl TextureSlot {
    pub fn new(kind: TextureKind, n: u32) -> Self {
        match kind {
            TextureKind::Diffuse => Self::Diffuse(n),
            TextureKind::Specular => Self::Specular(n),
            TextureKind::Emission => Self::Emission(n),
        }
    }

    pub fn kind(self) -> TextureKind {
        match self {
            Self::Diffuse(_) => TextureKind::Diffuse,
            Self::Specular(_) => TextureKind::Specular,
            Self::Emission(_) => TextureKind::Emission,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Self::Diffuse(n) | Self::Specular(n) | Self::Emission(n) => n,
        }
    }

    /// e.g. `material.textureDiffuse1`
    pub fn uniform_name(self) -> String {
        format!("material.texture{}{}", self.kind().name(), self.number())
    }
}

/// An uploaded texture together with its role and source file.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedTexture {
    pub id: TextureId,
    pub kind: TextureKind,
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshTexture {
    pub texture: LoadedTexture,
    pub slot: TextureSlot,
    pub uniform: String,
}

pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<MeshTexture>,
    vao: VertexArrayId,
}

impl Mesh {
    /// Indexed mesh. Texture `i` will be bound to unit `i`.
    pub fn new(
        gpu: &mut dyn Gpu,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<LoadedTexture>,
    ) -> Result<Self, RenderError> {
        let limit = gpu.max_texture_units();
        if textures.len() > limit as usize {
            return Err(RenderError::TooManyTextures {
                count: textures.len(),
                limit,
            });
        }

        let vao = gpu.create_vertex_array(&vertices, &indices);
        Ok(Self {
            vertices,
            indices,
            textures: assign_slots(textures),
            vao,
        })
    }

    /// Mesh drawn straight from its vertex list.
    pub fn unindexed(
        gpu: &mut dyn Gpu,
        vertices: Vec<Vertex>,
        textures: Vec<LoadedTexture>,
    ) -> Result<Self, RenderError> {
        Self::new(gpu, vertices, Vec::new(), textures)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[MeshTexture] {
        &self.textures
    }

    pub fn draw(&self, gpu: &mut dyn Gpu, shader: &Shader) {
        for (unit, t) in self.textures.iter().enumerate() {
            gpu.bind_texture(unit as u32, t.texture.id);
            match shader.texture_slot(t.slot) {
                Some(sampler) => sampler.set(gpu, unit as i32),
                None => log::trace!("'{}' not active in {:?}", t.uniform, shader.id()),
            }
        }

        if self.indices.is_empty() {
            gpu.draw_arrays(self.vao, self.vertices.len() as u32);
        } else {
            gpu.draw_elements(self.vao, self.indices.len() as u32);
        }
    }
}

fn assign_slots(textures: Vec<LoadedTexture>) -> Vec<MeshTexture> {
    let (mut diffuse, mut specular, mut emission) = (0, 0, 0);
    textures
        .into_iter()
        .map(|texture| {
            let counter = match texture.kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
                TextureKind::Emission => &mut emission,
            };
            *counter += 1;
            let slot = TextureSlot::new(texture.kind, *counter);
            MeshTexture {
                uniform: slot.uniform_name(),
                texture,
                slot,
            }
        })
        .collect()
}
