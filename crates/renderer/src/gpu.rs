//! The graphics API surface the renderer draws through.
//!
//! Handles are plain indices owned by the backend. Every object lives until
//! the backend is dropped.

use asset::TextureData;

use crate::error::ShaderError;
use crate::mesh::Vertex;
use crate::uniform::{UniformKind, UniformValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Index of a uniform slot within one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    pub kind: UniformKind,
    pub location: UniformLocation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Texture units a program can sample from.
pub const MAX_TEXTURE_UNITS: u32 = 8;

pub trait Gpu {
    /// Compile both stages and link them into a program.
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ShaderError>;

    /// Every uniform slot of a linked program, flattened to scalar/vector/matrix leaves.
    fn active_uniforms(&self, program: ProgramId) -> Vec<UniformInfo>;

    /// Program used by subsequent draws.
    fn use_program(&mut self, program: ProgramId);

    /// Store a value in a program's uniform slot. Draws snapshot the values current at draw time.
    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue);

    /// Upload the texture with its full mip chain.
    fn create_texture(&mut self, data: &TextureData) -> TextureId;

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn max_texture_units(&self) -> u32 {
        MAX_TEXTURE_UNITS
    }

    /// Static vertex buffer plus (possibly empty) index buffer.
    fn create_vertex_array(&mut self, vertices: &[Vertex], indices: &[u32]) -> VertexArrayId;

    /// Triangle list over the first `count` vertices.
    fn draw_arrays(&mut self, vao: VertexArrayId, count: u32);

    /// Indexed triangle list over the first `count` indices.
    fn draw_elements(&mut self, vao: VertexArrayId, count: u32);

    fn set_polygon_mode(&mut self, mode: PolygonMode);
}
