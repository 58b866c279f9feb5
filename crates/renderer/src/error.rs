use std::fmt;

use thiserror::Error;

use crate::uniform::UniformKind;

/// Programmable pipeline stage a diagnostic belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: Stage, log: String },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },

    #[error("no active uniform named '{name}'")]
    UnknownUniform { name: String },

    #[error("uniform '{name}' is {found:?}, requested as {expected:?}")]
    UniformTypeMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Asset(#[from] asset::AssetError),

    #[error("mesh uses {count} textures but only {limit} texture units exist")]
    TooManyTextures { count: usize, limit: u32 },

    #[error("GPU initialisation failed: {0}")]
    Init(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
