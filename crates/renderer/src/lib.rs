//! Renderer: graphics API surface, WGSL program reflection, meshes, models
//! and Phong lighting on top of wgpu.
//! wgpu = 26.x, naga = 26.x, winit = 0.30.x

pub mod error;
pub mod gpu;
pub mod headless;
pub mod lighting;
pub mod mesh;
pub mod model;
pub mod primitives;
pub mod reflect;
pub mod shader;
pub mod texture;
pub mod uniform;
pub mod wgpu_backend;

pub use error::{RenderError, ShaderError, Stage};
pub use gpu::{
    Gpu, MAX_TEXTURE_UNITS, PolygonMode, ProgramId, TextureId, UniformInfo, UniformLocation,
    VertexArrayId,
};
pub use headless::{GpuCall, HeadlessGpu};
pub use lighting::{
    CameraUniforms, LightingUniforms, MaterialUniforms, apply_camera, apply_lighting, apply_material,
};
pub use mesh::{LoadedTexture, Mesh, MeshTexture, TextureKind, TextureSlot, Vertex};
pub use model::Model;
pub use primitives::cube_vertices;
pub use shader::{Shader, Uniform};
pub use texture::{TextureCache, load_texture};
pub use uniform::{UniformKind, UniformType, UniformValue};
pub use wgpu_backend::WgpuBackend;
