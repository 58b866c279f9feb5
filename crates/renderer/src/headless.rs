//! Recording [`Gpu`] implementation: no device, every call is kept for inspection.

use std::collections::HashMap;

use asset::{TextureData, TextureFormat};

use crate::error::ShaderError;
use crate::gpu::{
    Gpu, PolygonMode, ProgramId, TextureId, UniformInfo, UniformLocation, VertexArrayId,
};
use crate::mesh::Vertex;
use crate::reflect::{self, ProgramLayout};
use crate::uniform::UniformValue;

#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    CreateProgram(ProgramId),
    UseProgram(ProgramId),
    SetUniform {
        program: ProgramId,
        location: UniformLocation,
        value: UniformValue,
    },
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
        levels: u32,
    },
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    CreateVertexArray {
        vao: VertexArrayId,
        vertices: usize,
        indices: usize,
    },
    DrawArrays {
        vao: VertexArrayId,
        count: u32,
    },
    DrawElements {
        vao: VertexArrayId,
        count: u32,
    },
    SetPolygonMode(PolygonMode),
}

impl GpuCall {
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawArrays { .. } | Self::DrawElements { .. })
    }
}

/// Programs are compiled and linked for real (naga), so uniform reflection
/// matches what the wgpu backend sees.
#[derive(Default)]
pub struct HeadlessGpu {
    calls: Vec<GpuCall>,
    programs: Vec<ProgramLayout>,
    values: HashMap<(ProgramId, UniformLocation), UniformValue>,
    texture_count: u32,
    vertex_array_count: u32,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Drain the log, keeping uniform values and created objects.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn draw_calls(&self) -> Vec<&GpuCall> {
        self.calls.iter().filter(|c| c.is_draw()).collect()
    }

    pub fn texture_uploads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GpuCall::CreateTexture { .. }))
            .count()
    }

    /// Last value stored into `name` of `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let layout = self.programs.get(program.0 as usize)?;
        let index = layout.uniforms.iter().position(|s| s.name == name)?;
        self.values
            .get(&(program, UniformLocation(index as u32)))
            .copied()
    }
}

impl Gpu for HeadlessGpu {
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ShaderError> {
        let layout = reflect::link(vertex, fragment)?;
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(layout);
        self.calls.push(GpuCall::CreateProgram(id));
        Ok(id)
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<UniformInfo> {
        self.programs
            .get(program.0 as usize)
            .map(ProgramLayout::uniform_infos)
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        self.values.insert((program, location), value);
        self.calls.push(GpuCall::SetUniform {
            program,
            location,
            value,
        });
    }

    fn create_texture(&mut self, data: &TextureData) -> TextureId {
        let texture = TextureId(self.texture_count);
        self.texture_count += 1;
        self.calls.push(GpuCall::CreateTexture {
            texture,
            width: data.width,
            height: data.height,
            format: data.format,
            levels: data.mip_level_count(),
        });
        texture
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(GpuCall::BindTexture { unit, texture });
    }

    fn create_vertex_array(&mut self, vertices: &[Vertex], indices: &[u32]) -> VertexArrayId {
        let vao = VertexArrayId(self.vertex_array_count);
        self.vertex_array_count += 1;
        self.calls.push(GpuCall::CreateVertexArray {
            vao,
            vertices: vertices.len(),
            indices: indices.len(),
        });
        vao
    }

    fn draw_arrays(&mut self, vao: VertexArrayId, count: u32) {
        self.calls.push(GpuCall::DrawArrays { vao, count });
    }

    fn draw_elements(&mut self, vao: VertexArrayId, count: u32) {
        self.calls.push(GpuCall::DrawElements { vao, count });
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.calls.push(GpuCall::SetPolygonMode(mode));
    }
}
