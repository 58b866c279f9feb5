//! Asset loading (shader sources, textures, model files) into CPU-side data.
//! Nothing here touches the GPU.

pub mod error;
pub mod import;
pub mod mesh;
pub mod scene;
pub mod shader;
pub mod texture;

pub use error::AssetError;
pub use import::{ImportOptions, load_scene};
pub use mesh::{MeshData, MeshVertex};
pub use scene::{Material, NodeId, SceneGraph, SceneNode, TextureRef};
pub use shader::ShaderSource;
pub use texture::{MipLevel, TextureData, TextureFormat};
