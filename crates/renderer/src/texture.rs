//! Texture upload and the path-keyed upload cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use asset::{AssetError, TextureData};

use crate::gpu::{Gpu, TextureId};

/// Side of the checkerboard substituted for unreadable textures.
pub const PLACEHOLDER_SIZE: u32 = 64;

/// Decode an image file and upload it with mipmaps.
pub fn load_texture(gpu: &mut dyn Gpu, path: impl AsRef<Path>) -> Result<TextureId, AssetError> {
    let data = TextureData::load(path)?;
    Ok(gpu.create_texture(&data))
}

/// Uploads each file once. Keys are canonical paths, so `a/../b.png` and
/// `b.png` share an entry. One cache can serve any number of models.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<PathBuf, TextureId>,
    uploads: usize,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical form of `path`, or `path` itself when it cannot be resolved.
    pub fn key(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<TextureId> {
        self.entries.get(&Self::key(path.as_ref())).copied()
    }

    pub fn load(&mut self, gpu: &mut dyn Gpu, path: impl AsRef<Path>) -> Result<TextureId, AssetError> {
        let path = path.as_ref();
        let key = Self::key(path);
        if let Some(&id) = self.entries.get(&key) {
            log::debug!("Texture {:?} already uploaded as {:?}", path, id);
            return Ok(id);
        }

        let id = load_texture(gpu, path)?;
        self.uploads += 1;
        self.entries.insert(key, id);
        Ok(id)
    }

    /// Like [`TextureCache::load`], but a failure uploads a checkerboard in its
    /// place (cached under the same path).
    pub fn load_or_placeholder(&mut self, gpu: &mut dyn Gpu, path: impl AsRef<Path>) -> TextureId {
        let path = path.as_ref();
        match self.load(gpu, path) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("{}; using placeholder texture", e);
                let id = gpu.create_texture(&TextureData::checkerboard(PLACEHOLDER_SIZE));
                self.uploads += 1;
                self.entries.insert(Self::key(path), id);
                id
            }
        }
    }

    /// Number of textures this cache has uploaded.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessGpu;

    fn png_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("renderer-tex-{}-{}", tag, std::process::id()));
        fs::create_dir_all(dir.join("sub")).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]))
            .save(dir.join("a.png"))
            .unwrap();
        dir
    }

    #[test]
    fn same_file_uploads_once_across_spellings() {
        let dir = png_dir("dedup");
        let mut gpu = HeadlessGpu::new();
        let mut cache = TextureCache::new();

        let a = cache.load(&mut gpu, dir.join("a.png")).unwrap();
        let b = cache.load(&mut gpu, dir.join("sub/../a.png")).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.uploads(), 1);
        assert_eq!(gpu.texture_uploads(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn upload_carries_full_mip_chain() {
        let dir = png_dir("mips");
        let mut gpu = HeadlessGpu::new();
        load_texture(&mut gpu, dir.join("a.png")).unwrap();
        assert!(matches!(
            gpu.calls(),
            [crate::headless::GpuCall::CreateTexture { levels: 3, width: 4, .. }]
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_gets_one_placeholder() {
        let mut gpu = HeadlessGpu::new();
        let mut cache = TextureCache::new();
        assert!(cache.load(&mut gpu, "nowhere/x.png").is_err());
        assert_eq!(cache.uploads(), 0);

        let a = cache.load_or_placeholder(&mut gpu, "nowhere/x.png");
        let b = cache.load_or_placeholder(&mut gpu, "nowhere/x.png");
        assert_eq!(a, b);
        assert_eq!(gpu.texture_uploads(), 1);
        assert_eq!(cache.get("nowhere/x.png"), Some(a));
    }
}
