//! The lit-crates demo: ten spinning textured crates, coloured markers for the
//! point lights and the sun, and an optional imported model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corelib::{Camera, Mat4, MeshKind, Scene, SceneLighting, Spin, Transform, Vec3, vec3};
use renderer::{
    CameraUniforms, Gpu, LightingUniforms, LoadedTexture, MaterialUniforms, Mesh, Model, Shader,
    TextureCache, TextureKind, Uniform, cube_vertices,
};

pub const CAMERA_START: Vec3 = vec3(0.0, 1.0, 3.0);
pub const SHININESS: f32 = 32.0;
pub const CLEAR_COLOR: f64 = 0.01;

const CRATE_POSITIONS: [Vec3; 10] = [
    vec3(0.0, 0.0, 0.0),
    vec3(2.0, 5.0, -15.0),
    vec3(-1.5, -2.2, -2.5),
    vec3(-3.8, -2.0, -12.3),
    vec3(2.4, -0.4, -3.5),
    vec3(-1.7, 3.0, -7.5),
    vec3(1.3, -2.0, -2.5),
    vec3(1.5, 2.0, -2.5),
    vec3(1.5, 0.2, -1.5),
    vec3(-1.3, 1.0, -1.5),
];
/// Crates sit just above the ground plane.
const CRATE_LIFT: Vec3 = vec3(0.0, 0.51, 0.0);
const SPIN_AXIS: Vec3 = vec3(1.0, 0.3, 0.5);
const MARKER_SCALE: f32 = 0.5;

/// Where to find the demo's files and what to import.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub assets_dir: PathBuf,
    pub model: Option<PathBuf>,
    pub flip_uvs: bool,
}

/// A linked program and the handles every frame writes through.
struct Program {
    shader: Shader,
    camera: CameraUniforms,
    model: Option<Uniform<Mat4>>,
}

impl Program {
    fn new(shader: Shader) -> Self {
        Self {
            camera: CameraUniforms::new(&shader),
            model: shader.find_uniform("model"),
            shader,
        }
    }

    fn begin(&self, gpu: &mut dyn Gpu, camera: &Camera, aspect: f32) {
        self.shader.use_program(gpu);
        self.camera.apply(gpu, camera, aspect);
    }

    fn set_model(&self, gpu: &mut dyn Gpu, transform: &Transform) {
        if let Some(model) = self.model {
            model.set(gpu, transform.matrix());
        }
    }
}

pub struct Demo {
    pub scene: Scene,
    phong: Program,
    lights: LightingUniforms,
    material: MaterialUniforms,
    marker: Program,
    light_color: Option<Uniform<Vec3>>,
    crate_mesh: Mesh,
    marker_mesh: Mesh,
    model: Model,
    textures: TextureCache,
}

impl Demo {
    /// Compile both programs and upload everything the scene draws.
    /// Shader failures are fatal; missing textures and models are not.
    pub fn new(gpu: &mut dyn Gpu, config: &DemoConfig) -> Result<Self> {
        let shaders = config.assets_dir.join("shaders");
        let phong = Shader::from_files(
            gpu,
            shaders.join("phong.vert.wgsl"),
            shaders.join("phong.frag.wgsl"),
        )
        .context("phong program")?;
        let marker = Shader::from_files(
            gpu,
            shaders.join("phong.vert.wgsl"),
            shaders.join("light_cube.frag.wgsl"),
        )
        .context("light marker program")?;

        let mut textures = TextureCache::new();
        let crate_textures = load_crate_textures(gpu, &mut textures, &config.assets_dir);
        let crate_mesh = Mesh::unindexed(gpu, cube_vertices(), crate_textures)?;
        let marker_mesh = Mesh::unindexed(gpu, cube_vertices(), Vec::new())?;

        let model = match &config.model {
            Some(path) => Model::load_or_empty(gpu, path, config.flip_uvs, &mut textures),
            None => Model::empty(),
        };

        let scene = build_scene(!model.is_empty());
        log::info!(
            "Demo scene: {} objects, {} textures uploaded",
            scene.len(),
            textures.uploads()
        );

        Ok(Self {
            scene,
            lights: LightingUniforms::new(&phong),
            material: MaterialUniforms::new(&phong),
            phong: Program::new(phong),
            light_color: marker.find_uniform("lightColor"),
            marker: Program::new(marker),
            crate_mesh,
            marker_mesh,
            model,
            textures,
        })
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.scene.camera
    }

    #[inline]
    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    pub fn update(&mut self, dt: f32) {
        self.scene.advance(dt);
    }

    /// Lit objects with the phong program, then the unlit light markers.
    pub fn draw(&self, gpu: &mut dyn Gpu, aspect: f32) {
        let scene = &self.scene;

        self.phong.begin(gpu, &scene.camera, aspect);
        self.lights.apply(gpu, &scene.lighting, &scene.camera);
        self.material.apply(gpu, SHININESS);

        for object in scene.objects() {
            let mesh_draw = match object.mesh {
                MeshKind::Cube => Some(&self.crate_mesh),
                MeshKind::Model => None,
                MeshKind::PointMarker(_) | MeshKind::SunMarker => continue,
            };
            self.phong.set_model(gpu, &object.transform);
            match mesh_draw {
                Some(mesh) => mesh.draw(gpu, &self.phong.shader),
                None => self.model.draw(gpu, &self.phong.shader),
            }
        }

        self.marker.begin(gpu, &scene.camera, aspect);
        for object in scene.objects() {
            let color = match object.mesh {
                MeshKind::PointMarker(i) => match scene.lighting.points.get(i) {
                    Some(light) => light.color,
                    None => continue,
                },
                MeshKind::SunMarker => Vec3::ONE,
                MeshKind::Cube | MeshKind::Model => continue,
            };
            if let Some(light_color) = self.light_color {
                light_color.set(gpu, color);
            }
            self.marker.set_model(gpu, &object.transform);
            self.marker_mesh.draw(gpu, &self.marker.shader);
        }
    }
}

fn load_crate_textures(
    gpu: &mut dyn Gpu,
    cache: &mut TextureCache,
    assets_dir: &Path,
) -> Vec<LoadedTexture> {
    let dir = assets_dir.join("textures");
    [
        (TextureKind::Diffuse, "container2.png"),
        (TextureKind::Specular, "container2_specular.png"),
    ]
    .into_iter()
    .map(|(kind, file)| {
        let path = dir.join(file);
        LoadedTexture {
            id: cache.load_or_placeholder(gpu, &path),
            kind,
            path,
        }
    })
    .collect()
}

/// Place the demo's objects. Crates spin at `20 + 3i` degrees per second.
pub fn build_scene(with_model: bool) -> Scene {
    let lighting = SceneLighting::default();
    let sun_position = lighting.directional.direction;
    let bulbs: Vec<Vec3> = lighting.points.iter().map(|p| p.position).collect();
    let mut scene = Scene::new(Camera::new(CAMERA_START), lighting);

    for (i, position) in CRATE_POSITIONS.iter().enumerate() {
        scene.spawn(
            Transform::from_translation(*position + CRATE_LIFT),
            MeshKind::Cube,
            Some(Spin {
                axis: SPIN_AXIS,
                degrees_per_sec: 20.0 + 3.0 * i as f32,
            }),
        );
    }

    for (i, position) in bulbs.into_iter().enumerate() {
        scene.spawn(
            Transform::from_translation(position).with_uniform_scale(MARKER_SCALE),
            MeshKind::PointMarker(i),
            None,
        );
    }
    scene.spawn(
        Transform::from_translation(sun_position),
        MeshKind::SunMarker,
        None,
    );

    if with_model {
        scene.spawn(Transform::identity(), MeshKind::Model, None);
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{GpuCall, HeadlessGpu, UniformValue};

    fn config() -> DemoConfig {
        DemoConfig {
            assets_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets"),
            model: None,
            flip_uvs: false,
        }
    }

    #[test]
    fn scene_layout_matches_demo() {
        let scene = build_scene(false);
        let count = |kind: fn(&MeshKind) -> bool| scene.objects().filter(|o| kind(&o.mesh)).count();
        assert_eq!(count(|m| *m == MeshKind::Cube), 10);
        assert_eq!(count(|m| matches!(m, MeshKind::PointMarker(_))), 4);
        assert_eq!(count(|m| *m == MeshKind::SunMarker), 1);
        assert_eq!(build_scene(true).len(), scene.len() + 1);
    }

    #[test]
    fn crates_are_lifted_and_spin_faster_by_index() {
        let scene = build_scene(false);
        let crates: Vec<_> = scene
            .objects()
            .filter(|o| o.mesh == MeshKind::Cube)
            .collect();
        assert!((crates[1].transform.translation - vec3(2.0, 5.51, -15.0)).length() < 1e-5);
        let spins: Vec<f32> = crates
            .iter()
            .filter_map(|o| o.spin.map(|s| s.degrees_per_sec))
            .collect();
        assert_eq!(spins.first(), Some(&20.0));
        assert_eq!(spins.last(), Some(&47.0));
    }

    #[test]
    fn missing_textures_fall_back_to_placeholders() {
        let mut gpu = HeadlessGpu::new();
        let demo = Demo::new(&mut gpu, &config()).expect("demo builds");
        assert_eq!(demo.texture_cache().uploads(), 2);
        assert_eq!(gpu.texture_uploads(), 2);
    }

    #[test]
    fn missing_shader_dir_is_an_error() {
        let mut gpu = HeadlessGpu::new();
        let cfg = DemoConfig {
            assets_dir: std::env::temp_dir().join("phong3d-no-such-assets"),
            model: None,
            flip_uvs: false,
        };
        assert!(Demo::new(&mut gpu, &cfg).is_err());
    }

    #[test]
    fn unreadable_model_draws_nothing_extra() {
        let mut gpu = HeadlessGpu::new();
        let mut cfg = config();
        cfg.model = Some(std::env::temp_dir().join("phong3d-missing-model.obj"));
        let demo = Demo::new(&mut gpu, &cfg).expect("demo builds");
        assert_eq!(demo.scene.len(), 15);
    }

    #[test]
    fn one_frame_draws_every_object_once() {
        let mut gpu = HeadlessGpu::new();
        let demo = Demo::new(&mut gpu, &config()).expect("demo builds");
        gpu.take_calls();

        demo.draw(&mut gpu, 800.0 / 600.0);
        assert_eq!(gpu.draw_calls().len(), 15);
        assert!(
            gpu.draw_calls()
                .iter()
                .all(|c| matches!(c, GpuCall::DrawArrays { count: 36, .. }))
        );
    }

    #[test]
    fn last_marker_drawn_is_the_white_sun() {
        let mut gpu = HeadlessGpu::new();
        let demo = Demo::new(&mut gpu, &config()).expect("demo builds");
        demo.draw(&mut gpu, 1.0);
        assert_eq!(
            gpu.uniform(demo.marker.shader.id(), "lightColor"),
            Some(UniformValue::Vec3(Vec3::ONE))
        );
        assert_eq!(
            gpu.uniform(demo.phong.shader.id(), "material.shininess"),
            Some(UniformValue::Float(SHININESS))
        );
    }

    #[test]
    fn frames_write_through_resolved_handles_only() {
        let mut gpu = HeadlessGpu::new();
        let mut demo = Demo::new(&mut gpu, &config()).expect("demo builds");
        gpu.take_calls();

        for _ in 0..2 {
            demo.update(0.016);
            demo.draw(&mut gpu, 800.0 / 600.0);
        }
        assert_eq!(demo.phong.shader.named_set_count(), 0);
        assert_eq!(demo.marker.shader.named_set_count(), 0);
        assert_eq!(gpu.draw_calls().len(), 30);
        assert!(gpu.uniform(demo.phong.shader.id(), "material.textureSpecular1").is_some());
    }
}
