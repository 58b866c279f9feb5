//! Pushes camera, material and light state into a program's uniforms.
//!
//! Names follow the shipped phong shader and are resolved once per program
//! into typed handles. A program that lacks some of them (the light marker
//! program, for one) gets `None` handles and those writes are skipped.

use corelib::light::MAX_POINT_LIGHTS;
use corelib::{Attenuation, Camera, Mat4, SceneLighting, Vec3};

use crate::gpu::Gpu;
use crate::shader::{Shader, Uniform};
use crate::uniform::UniformType;

#[inline]
fn put<T: UniformType>(gpu: &mut dyn Gpu, handle: Option<Uniform<T>>, value: T) {
    if let Some(handle) = handle {
        handle.set(gpu, value);
    }
}

pub struct CameraUniforms {
    view: Option<Uniform<Mat4>>,
    projection: Option<Uniform<Mat4>>,
    position: Option<Uniform<Vec3>>,
}

impl CameraUniforms {
    pub fn new(shader: &Shader) -> Self {
        Self {
            view: shader.find_uniform("camera.view"),
            projection: shader.find_uniform("camera.projection"),
            position: shader.find_uniform("camera.position"),
        }
    }

    pub fn apply(&self, gpu: &mut dyn Gpu, camera: &Camera, aspect: f32) {
        put(gpu, self.view, camera.view());
        put(gpu, self.projection, camera.proj(aspect));
        put(gpu, self.position, camera.position);
    }
}

pub struct MaterialUniforms {
    shininess: Option<Uniform<f32>>,
}

impl MaterialUniforms {
    pub fn new(shader: &Shader) -> Self {
        Self {
            shininess: shader.find_uniform("material.shininess"),
        }
    }

    pub fn apply(&self, gpu: &mut dyn Gpu, shininess: f32) {
        put(gpu, self.shininess, shininess);
    }
}

struct AttenuationUniforms {
    constant: Option<Uniform<f32>>,
    linear: Option<Uniform<f32>>,
    quadratic: Option<Uniform<f32>>,
}

impl AttenuationUniforms {
    fn new(shader: &Shader, prefix: &str) -> Self {
        Self {
            constant: shader.find_uniform(&format!("{prefix}.constant")),
            linear: shader.find_uniform(&format!("{prefix}.linear")),
            quadratic: shader.find_uniform(&format!("{prefix}.quadratic")),
        }
    }

    fn apply(&self, gpu: &mut dyn Gpu, attenuation: &Attenuation) {
        put(gpu, self.constant, attenuation.constant);
        put(gpu, self.linear, attenuation.linear);
        put(gpu, self.quadratic, attenuation.quadratic);
    }
}

/// ambient, diffuse, specular
struct ColorUniforms([Option<Uniform<Vec3>>; 3]);

impl ColorUniforms {
    fn new(shader: &Shader, prefix: &str) -> Self {
        Self(["ambient", "diffuse", "specular"].map(|c| shader.find_uniform(&format!("{prefix}.{c}"))))
    }

    fn apply(&self, gpu: &mut dyn Gpu, ambient: Vec3, diffuse: Vec3, specular: Vec3) {
        let [a, d, s] = self.0;
        put(gpu, a, ambient);
        put(gpu, d, diffuse);
        put(gpu, s, specular);
    }
}

struct PointLightUniforms {
    position: Option<Uniform<Vec3>>,
    colors: ColorUniforms,
    attenuation: AttenuationUniforms,
}

/// Handles for one directional light, [`MAX_POINT_LIGHTS`] point lights and
/// a flashlight that follows the camera.
pub struct LightingUniforms {
    sun_direction: Option<Uniform<Vec3>>,
    sun: ColorUniforms,
    points: Vec<PointLightUniforms>,
    spot_position: Option<Uniform<Vec3>>,
    spot_direction: Option<Uniform<Vec3>>,
    spot: ColorUniforms,
    spot_attenuation: AttenuationUniforms,
    cut_off: Option<Uniform<f32>>,
    outer_cut_off: Option<Uniform<f32>>,
}

impl LightingUniforms {
    pub fn new(shader: &Shader) -> Self {
        let points = (0..MAX_POINT_LIGHTS)
            .map(|i| {
                let prefix = format!("pointLights[{i}]");
                PointLightUniforms {
                    position: shader.find_uniform(&format!("{prefix}.position")),
                    colors: ColorUniforms::new(shader, &prefix),
                    attenuation: AttenuationUniforms::new(shader, &prefix),
                }
            })
            .collect();
        Self {
            sun_direction: shader.find_uniform("dirLight.direction"),
            sun: ColorUniforms::new(shader, "dirLight"),
            points,
            spot_position: shader.find_uniform("spotLight.position"),
            spot_direction: shader.find_uniform("spotLight.direction"),
            spot: ColorUniforms::new(shader, "spotLight"),
            spot_attenuation: AttenuationUniforms::new(shader, "spotLight"),
            cut_off: shader.find_uniform("spotLight.cutOff"),
            outer_cut_off: shader.find_uniform("spotLight.outerCutOff"),
        }
    }

    /// Lights past [`MAX_POINT_LIGHTS`] have no slot and are skipped.
    pub fn apply(&self, gpu: &mut dyn Gpu, lighting: &SceneLighting, camera: &Camera) {
        let sun = &lighting.directional;
        put(gpu, self.sun_direction, sun.direction);
        self.sun.apply(gpu, sun.ambient, sun.diffuse, sun.specular);

        for (slot, light) in self.points.iter().zip(&lighting.points) {
            put(gpu, slot.position, light.position);
            slot.colors.apply(
                gpu,
                light.ambient(lighting.point_ambient_scale),
                light.diffuse(),
                light.specular(),
            );
            slot.attenuation.apply(gpu, &light.attenuation);
        }

        let spot = &lighting.spot;
        put(gpu, self.spot_position, camera.position);
        put(gpu, self.spot_direction, camera.front());
        self.spot.apply(gpu, spot.ambient, spot.diffuse, spot.specular);
        self.spot_attenuation.apply(gpu, &spot.attenuation);
        put(gpu, self.cut_off, spot.cutoff_cos());
        put(gpu, self.outer_cut_off, spot.outer_cutoff_cos());
    }
}

/// One-shot form of [`CameraUniforms::apply`].
pub fn apply_camera(gpu: &mut dyn Gpu, shader: &Shader, camera: &Camera, aspect: f32) {
    CameraUniforms::new(shader).apply(gpu, camera, aspect);
}

pub fn apply_material(gpu: &mut dyn Gpu, shader: &Shader, shininess: f32) {
    MaterialUniforms::new(shader).apply(gpu, shininess);
}

/// One-shot form of [`LightingUniforms::apply`]; resolves names on every call.
pub fn apply_lighting(gpu: &mut dyn Gpu, shader: &Shader, lighting: &SceneLighting, camera: &Camera) {
    LightingUniforms::new(shader).apply(gpu, lighting, camera);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{GpuCall, HeadlessGpu};
    use crate::uniform::UniformValue;
    use corelib::{Vec3, vec3};

    const PHONG_VS: &str = include_str!("../../../assets/shaders/phong.vert.wgsl");
    const PHONG_FS: &str = include_str!("../../../assets/shaders/phong.frag.wgsl");
    const LIGHT_CUBE_FS: &str = include_str!("../../../assets/shaders/light_cube.frag.wgsl");

    fn vec3_of(value: Option<UniformValue>) -> Vec3 {
        match value {
            Some(UniformValue::Vec3(v)) => v,
            other => panic!("expected vec3, got {other:?}"),
        }
    }

    #[test]
    fn every_light_field_is_written() {
        let mut gpu = HeadlessGpu::new();
        let shader = Shader::new(&mut gpu, PHONG_VS, PHONG_FS).unwrap();
        let lighting = SceneLighting::default();
        let camera = Camera::new(vec3(0.0, 1.0, 3.0));
        gpu.take_calls();

        apply_lighting(&mut gpu, &shader, &lighting, &camera);

        let sets = gpu
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::SetUniform { .. }))
            .count();
        assert_eq!(sets, 4 + 4 * 7 + 10);

        let ambient = vec3_of(gpu.uniform(shader.id(), "pointLights[1].ambient"));
        assert!((ambient - vec3(0.075, 0.0, 0.06)).length() < 1e-6);
        assert_eq!(
            gpu.uniform(shader.id(), "pointLights[3].linear"),
            Some(UniformValue::Float(0.09))
        );
        assert_eq!(
            vec3_of(gpu.uniform(shader.id(), "dirLight.direction")),
            vec3(1.2, 3.0, 2.0)
        );
    }

    #[test]
    fn spotlight_tracks_the_camera() {
        let mut gpu = HeadlessGpu::new();
        let shader = Shader::new(&mut gpu, PHONG_VS, PHONG_FS).unwrap();
        let mut camera = Camera::new(vec3(2.0, 1.0, -1.0));
        camera.process_mouse_movement(120.0, -40.0, true);

        apply_lighting(&mut gpu, &shader, &SceneLighting::default(), &camera);

        assert_eq!(
            vec3_of(gpu.uniform(shader.id(), "spotLight.position")),
            camera.position
        );
        assert_eq!(
            vec3_of(gpu.uniform(shader.id(), "spotLight.direction")),
            camera.front()
        );
        assert_eq!(
            gpu.uniform(shader.id(), "spotLight.cutOff"),
            Some(UniformValue::Float(10f32.to_radians().cos()))
        );
    }

    #[test]
    fn marker_program_only_takes_camera() {
        let mut gpu = HeadlessGpu::new();
        let shader = Shader::new(&mut gpu, PHONG_VS, LIGHT_CUBE_FS).unwrap();
        let camera = Camera::default();
        gpu.take_calls();

        apply_lighting(&mut gpu, &shader, &SceneLighting::default(), &camera);
        assert!(gpu.calls().is_empty());

        apply_camera(&mut gpu, &shader, &camera, 4.0 / 3.0);
        assert_eq!(gpu.calls().len(), 3);
        assert_eq!(
            gpu.uniform(shader.id(), "camera.view"),
            Some(UniformValue::Mat4(camera.view()))
        );
    }

    #[test]
    fn resolved_handles_write_without_name_lookups() {
        let mut gpu = HeadlessGpu::new();
        let shader = Shader::new(&mut gpu, PHONG_VS, PHONG_FS).unwrap();
        let camera_uniforms = CameraUniforms::new(&shader);
        let material = MaterialUniforms::new(&shader);
        let lights = LightingUniforms::new(&shader);
        let lighting = SceneLighting::default();
        let mut camera = Camera::default();
        gpu.take_calls();

        for frame in 0..3 {
            camera.position.x = frame as f32;
            camera_uniforms.apply(&mut gpu, &camera, 16.0 / 9.0);
            material.apply(&mut gpu, 32.0);
            lights.apply(&mut gpu, &lighting, &camera);
        }

        assert_eq!(shader.named_set_count(), 0);
        assert_eq!(gpu.calls().len(), 3 * (3 + 1 + 4 + 4 * 7 + 10));
        assert_eq!(
            vec3_of(gpu.uniform(shader.id(), "spotLight.position")),
            vec3(2.0, 0.0, 0.0)
        );
    }
}
