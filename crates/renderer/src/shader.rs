//! Linked shader program with its uniforms resolved once, up front.

use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;

use asset::ShaderSource;
use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::error::{RenderError, ShaderError};
use crate::gpu::{Gpu, MAX_TEXTURE_UNITS, ProgramId, UniformLocation};
use crate::mesh::{TextureKind, TextureSlot};
use crate::uniform::{UniformKind, UniformType, UniformValue};

const UNITS: usize = MAX_TEXTURE_UNITS as usize;

pub struct Shader {
    program: ProgramId,
    uniforms: HashMap<String, (UniformLocation, UniformKind)>,
    /// `material.texture<Kind><n>` handles, indexed `[kind][n - 1]`.
    samplers: [[Option<Uniform<i32>>; UNITS]; TextureKind::ALL.len()],
    named_sets: Cell<usize>,
}

/// A uniform resolved and type-checked against one program.
pub struct Uniform<T> {
    program: ProgramId,
    location: UniformLocation,
    _ty: PhantomData<fn(T)>,
}

impl<T> Clone for Uniform<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Uniform<T> {}

impl<T: UniformType> Uniform<T> {
    fn new(program: ProgramId, location: UniformLocation) -> Self {
        Self {
            program,
            location,
            _ty: PhantomData,
        }
    }

    #[inline]
    pub fn set(self, gpu: &mut dyn Gpu, value: T) {
        gpu.set_uniform(self.program, self.location, value.into_value());
    }

    #[inline]
    pub fn location(self) -> UniformLocation {
        self.location
    }
}

impl Shader {
    pub fn new(gpu: &mut dyn Gpu, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        let program = gpu.create_program(vertex, fragment)?;
        let uniforms: HashMap<_, _> = gpu
            .active_uniforms(program)
            .into_iter()
            .map(|u| (u.name, (u.location, u.kind)))
            .collect();
        log::info!(
            "Linked shader program {:?} ({} uniforms)",
            program,
            uniforms.len()
        );

        let mut samplers = [[None; UNITS]; TextureKind::ALL.len()];
        for kind in TextureKind::ALL {
            for n in 1..=MAX_TEXTURE_UNITS {
                let name = TextureSlot::new(kind, n).uniform_name();
                if let Some(&(location, UniformKind::Int)) = uniforms.get(&name) {
                    samplers[kind as usize][(n - 1) as usize] = Some(Uniform::new(program, location));
                }
            }
        }

        Ok(Self {
            program,
            uniforms,
            samplers,
            named_sets: Cell::new(0),
        })
    }

    /// Read both stage files fully, then compile and link them.
    pub fn from_files(
        gpu: &mut dyn Gpu,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let vs = ShaderSource::load(vertex_path)?;
        let fs = ShaderSource::load(fragment_path)?;
        Self::new(gpu, &vs.text, &fs.text).map_err(|e| {
            log::error!("Shader {:?} + {:?}: {}", vs.path, fs.path, e);
            RenderError::from(e)
        })
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.program
    }

    pub fn use_program(&self, gpu: &mut dyn Gpu) {
        gpu.use_program(self.program);
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Typed handle for `name`; fails when the program has no such uniform or
    /// its type is not `T`.
    pub fn uniform<T: UniformType>(&self, name: &str) -> Result<Uniform<T>, ShaderError> {
        let &(location, found) =
            self.uniforms
                .get(name)
                .ok_or_else(|| ShaderError::UnknownUniform {
                    name: name.to_owned(),
                })?;
        if found != T::KIND {
            return Err(ShaderError::UniformTypeMismatch {
                name: name.to_owned(),
                expected: T::KIND,
                found,
            });
        }
        Ok(Uniform::new(self.program, location))
    }

    /// Like [`Shader::uniform`], but a uniform the program does not use is
    /// `None` (GL treats writes to it as no-ops). A type mismatch is logged.
    pub fn find_uniform<T: UniformType>(&self, name: &str) -> Option<Uniform<T>> {
        match self.uniform(name) {
            Ok(handle) => Some(handle),
            Err(ShaderError::UnknownUniform { .. }) => {
                log::trace!("Uniform '{}' not active in {:?}", name, self.program);
                None
            }
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    /// Sampler-index handle for a mesh texture slot, resolved at link time.
    pub fn texture_slot(&self, slot: TextureSlot) -> Option<Uniform<i32>> {
        let index = slot.number().checked_sub(1)? as usize;
        self.samplers[slot.kind() as usize].get(index).copied().flatten()
    }

    /// How many name-based `set_*` calls this shader has served.
    pub fn named_set_count(&self) -> usize {
        self.named_sets.get()
    }

    pub fn set_bool(&self, gpu: &mut dyn Gpu, name: &str, value: bool) {
        self.set_named(gpu, name, value.into_value());
    }

    pub fn set_int(&self, gpu: &mut dyn Gpu, name: &str, value: i32) {
        self.set_named(gpu, name, UniformValue::Int(value));
    }

    pub fn set_float(&self, gpu: &mut dyn Gpu, name: &str, value: f32) {
        self.set_named(gpu, name, UniformValue::Float(value));
    }

    pub fn set_vec2(&self, gpu: &mut dyn Gpu, name: &str, value: Vec2) {
        self.set_named(gpu, name, UniformValue::Vec2(value));
    }

    pub fn set_vec3(&self, gpu: &mut dyn Gpu, name: &str, value: Vec3) {
        self.set_named(gpu, name, UniformValue::Vec3(value));
    }

    pub fn set_vec4(&self, gpu: &mut dyn Gpu, name: &str, value: Vec4) {
        self.set_named(gpu, name, UniformValue::Vec4(value));
    }

    pub fn set_mat2(&self, gpu: &mut dyn Gpu, name: &str, value: Mat2) {
        self.set_named(gpu, name, UniformValue::Mat2(value));
    }

    pub fn set_mat3(&self, gpu: &mut dyn Gpu, name: &str, value: Mat3) {
        self.set_named(gpu, name, UniformValue::Mat3(value));
    }

    pub fn set_mat4(&self, gpu: &mut dyn Gpu, name: &str, value: Mat4) {
        self.set_named(gpu, name, UniformValue::Mat4(value));
    }

    /// Unknown names are ignored, like an unused uniform in GL.
    fn set_named(&self, gpu: &mut dyn Gpu, name: &str, value: UniformValue) {
        self.named_sets.set(self.named_sets.get() + 1);
        match self.uniforms.get(name) {
            Some(&(location, kind)) if kind == value.kind() => {
                gpu.set_uniform(self.program, location, value);
            }
            Some(&(_, kind)) => {
                log::warn!(
                    "Uniform '{}' is {:?}; ignoring {:?} value",
                    name,
                    kind,
                    value.kind()
                );
            }
            None => log::trace!("Uniform '{}' not active in {:?}", name, self.program),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{GpuCall, HeadlessGpu};

    const PHONG_VS: &str = include_str!("../../../assets/shaders/phong.vert.wgsl");
    const PHONG_FS: &str = include_str!("../../../assets/shaders/phong.frag.wgsl");

    fn phong(gpu: &mut HeadlessGpu) -> Shader {
        Shader::new(gpu, PHONG_VS, PHONG_FS).unwrap()
    }

    #[test]
    fn unknown_name_records_no_call() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);
        gpu.take_calls();

        shader.set_float(&mut gpu, "does.not.exist", 1.0);
        shader.set_vec3(&mut gpu, "pointLights[9].position", Vec3::ONE);
        assert!(gpu.calls().is_empty());
    }

    #[test]
    fn named_set_reaches_the_slot() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);
        shader.set_float(&mut gpu, "material.shininess", 32.0);
        shader.set_bool(&mut gpu, "material.textureDiffuse1", true);
        assert_eq!(
            gpu.uniform(shader.id(), "material.shininess"),
            Some(UniformValue::Float(32.0))
        );
        assert_eq!(
            gpu.uniform(shader.id(), "material.textureDiffuse1"),
            Some(UniformValue::Int(1))
        );
    }

    #[test]
    fn wrong_value_type_is_not_written() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);
        gpu.take_calls();
        shader.set_float(&mut gpu, "model", 1.0);
        assert!(gpu.calls().is_empty());
    }

    #[test]
    fn typed_handles_check_name_and_type() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);

        assert!(matches!(
            shader.uniform::<Vec3>("model"),
            Err(ShaderError::UniformTypeMismatch {
                expected: UniformKind::Vec3,
                found: UniformKind::Mat4,
                ..
            })
        ));
        assert!(matches!(
            shader.uniform::<f32>("nope"),
            Err(ShaderError::UnknownUniform { .. })
        ));

        let model = shader.uniform::<Mat4>("model").unwrap();
        gpu.take_calls();
        model.set(&mut gpu, Mat4::from_scale(Vec3::splat(2.0)));
        assert!(matches!(gpu.calls(), [GpuCall::SetUniform { .. }]));
        assert_eq!(
            gpu.uniform(shader.id(), "model"),
            Some(UniformValue::Mat4(Mat4::from_scale(Vec3::splat(2.0))))
        );
    }

    #[test]
    fn texture_slots_resolve_at_link() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);

        let diffuse = shader.texture_slot(TextureSlot::Diffuse(1)).unwrap();
        assert!(shader.texture_slot(TextureSlot::Specular(1)).is_some());
        assert!(shader.texture_slot(TextureSlot::Diffuse(2)).is_none());
        assert!(shader.texture_slot(TextureSlot::Emission(1)).is_none());
        assert!(shader.texture_slot(TextureSlot::Diffuse(0)).is_none());

        gpu.take_calls();
        diffuse.set(&mut gpu, 3);
        assert_eq!(
            gpu.uniform(shader.id(), "material.textureDiffuse1"),
            Some(UniformValue::Int(3))
        );
        assert_eq!(shader.named_set_count(), 0);
    }

    #[test]
    fn find_uniform_tolerates_absent_names_only() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);
        assert!(shader.find_uniform::<Vec3>("camera.position").is_some());
        assert!(shader.find_uniform::<Vec3>("lightColor").is_none());
        assert!(shader.find_uniform::<f32>("camera.position").is_none());
    }

    #[test]
    fn named_sets_are_counted() {
        let mut gpu = HeadlessGpu::new();
        let shader = phong(&mut gpu);
        shader.set_float(&mut gpu, "material.shininess", 8.0);
        shader.set_float(&mut gpu, "nope", 8.0);
        assert_eq!(shader.named_set_count(), 2);
    }

    #[test]
    fn from_files_reports_missing_file() {
        let mut gpu = HeadlessGpu::new();
        let err = Shader::from_files(&mut gpu, "missing.vert.wgsl", "missing.frag.wgsl").err();
        assert!(matches!(err, Some(RenderError::Asset(_))));
    }

    #[test]
    fn from_files_compiles_shipped_sources() {
        let mut gpu = HeadlessGpu::new();
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/shaders");
        let shader = Shader::from_files(
            &mut gpu,
            format!("{dir}/phong.vert.wgsl"),
            format!("{dir}/light_cube.frag.wgsl"),
        )
        .unwrap();
        assert!(shader.has_uniform("lightColor"));
        assert!(shader.has_uniform("camera.view"));
    }

    #[test]
    fn broken_source_is_compile_error() {
        let mut gpu = HeadlessGpu::new();
        let err = Shader::new(&mut gpu, "@vertex fn vs_main( {", PHONG_FS).err();
        assert!(matches!(err, Some(ShaderError::Compile { .. })));
        assert!(gpu.calls().is_empty());
    }
}
