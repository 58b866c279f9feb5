//! Shader source files, read fully before compilation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};

/// Text of one shader stage plus where it came from.
#[derive(Clone, Debug)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub text: String,
}

impl ShaderSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        log::debug!("Read shader source {:?} ({} bytes)", path, text.len());
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn from_text(label: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: label.into(),
            text: text.into(),
        }
    }
}
