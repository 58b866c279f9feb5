//! Core types: math re-exports, Transform, Camera, lights and the scene context.

pub use glam::{Mat2, Mat3, Mat4, Quat, Vec2, Vec3, Vec4, vec2, vec3, vec4};

pub mod camera;
pub mod light;
pub mod scene;
pub mod transform;

pub use camera::{Camera, Movement};
pub use light::{Attenuation, DirectionalLight, PointLight, SceneLighting, SpotLight};
pub use scene::{Entity, MeshKind, Scene, SceneObject, Spin};
pub use transform::Transform;
