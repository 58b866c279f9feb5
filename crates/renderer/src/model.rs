//! A model file turned into meshes, with textures shared through a [`TextureCache`].

use std::path::Path;

use asset::{ImportOptions, SceneGraph, TextureRef};

use crate::error::RenderError;
use crate::gpu::Gpu;
use crate::mesh::{LoadedTexture, Mesh, TextureKind, Vertex};
use crate::shader::Shader;
use crate::texture::TextureCache;

#[derive(Default)]
pub struct Model {
    meshes: Vec<Mesh>,
    /// Distinct textures used by this model.
    textures: Vec<LoadedTexture>,
}

impl Model {
    /// A model with nothing to draw.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(
        gpu: &mut dyn Gpu,
        path: impl AsRef<Path>,
        flip_uvs: bool,
        cache: &mut TextureCache,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let scene = asset::load_scene(path, ImportOptions { flip_uvs })?;
        let model = Self::from_scene(gpu, &scene, cache)?;
        log::info!(
            "Model {:?}: {} meshes, {} textures",
            path,
            model.meshes.len(),
            model.textures.len()
        );
        Ok(model)
    }

    /// [`Model::load`], degrading to an empty model (logged) on failure.
    pub fn load_or_empty(
        gpu: &mut dyn Gpu,
        path: impl AsRef<Path>,
        flip_uvs: bool,
        cache: &mut TextureCache,
    ) -> Self {
        let path = path.as_ref();
        Self::load(gpu, path, flip_uvs, cache).unwrap_or_else(|e| {
            log::error!("Failed to load model {:?}: {}", path, e);
            Self::empty()
        })
    }

    /// Build one mesh per scene mesh, in depth-first node order. Textures that
    /// fail to load are skipped with a warning.
    pub fn from_scene(
        gpu: &mut dyn Gpu,
        scene: &SceneGraph,
        cache: &mut TextureCache,
    ) -> Result<Self, RenderError> {
        let mut model = Self::empty();

        for index in scene.mesh_order() {
            let data = &scene.meshes[index];
            let mut textures = Vec::new();
            if let Some(material) = scene.material_of(index) {
                let slots = [
                    (TextureKind::Diffuse, &material.diffuse),
                    (TextureKind::Specular, &material.specular),
                    (TextureKind::Emission, &material.emission),
                ];
                for (kind, refs) in slots {
                    for tex in refs {
                        if let Some(loaded) = model.texture(gpu, cache, tex, kind) {
                            textures.push(loaded);
                        }
                    }
                }
            }

            let vertices = data.vertices.iter().copied().map(Vertex::from).collect();
            model
                .meshes
                .push(Mesh::new(gpu, vertices, data.indices.clone(), textures)?);
        }

        Ok(model)
    }

    fn texture(
        &mut self,
        gpu: &mut dyn Gpu,
        cache: &mut TextureCache,
        tex: &TextureRef,
        kind: TextureKind,
    ) -> Option<LoadedTexture> {
        match cache.load(gpu, &tex.path) {
            Ok(id) => {
                let loaded = LoadedTexture {
                    id,
                    kind,
                    path: tex.path.clone(),
                };
                if !self.textures.iter().any(|t| t.id == id && t.kind == kind) {
                    self.textures.push(loaded.clone());
                }
                Some(loaded)
            }
            Err(e) => {
                log::warn!("Skipping texture '{}': {}", tex.raw, e);
                None
            }
        }
    }

    pub fn draw(&self, gpu: &mut dyn Gpu, shader: &Shader) {
        for mesh in &self.meshes {
            mesh.draw(gpu, shader);
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &[LoadedTexture] {
        &self.textures
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
