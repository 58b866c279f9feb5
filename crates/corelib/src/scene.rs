//! Scene context: camera, lighting and the placed objects of one demo scene.
//!
//! Passed explicitly to whoever updates or draws the scene; nothing here is global.

use crate::camera::Camera;
use crate::light::SceneLighting;
use crate::transform::Transform;
use crate::{Quat, Vec3};

/// Object id (dense, index into the object list).
pub type Entity = u32;

/// Which drawable an object refers to. Resolved to GPU resources by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    /// Textured, lit cube.
    Cube,
    /// Unlit marker for the light at this index into the point list.
    PointMarker(usize),
    /// Unlit marker placed along the directional light.
    SunMarker,
    /// The imported model, if any.
    Model,
}

/// Constant angular velocity about a fixed axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub axis: Vec3,
    pub degrees_per_sec: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct SceneObject {
    pub transform: Transform,
    pub mesh: MeshKind,
    pub spin: Option<Spin>,
}

pub struct Scene {
    pub camera: Camera,
    pub lighting: SceneLighting,
    objects: Vec<SceneObject>,
    elapsed: f32,
}

impl Scene {
    pub fn new(camera: Camera, lighting: SceneLighting) -> Self {
        Self {
            camera,
            lighting,
            objects: Vec::new(),
            elapsed: 0.0,
        }
    }

    pub fn spawn(&mut self, transform: Transform, mesh: MeshKind, spin: Option<Spin>) -> Entity {
        let id = self.objects.len() as Entity;
        self.objects.push(SceneObject {
            transform,
            mesh,
            spin,
        });
        id
    }

    #[inline]
    pub fn object(&self, e: Entity) -> Option<&SceneObject> {
        self.objects.get(e as usize)
    }

    #[inline]
    pub fn transform_mut(&mut self, e: Entity) -> Option<&mut Transform> {
        self.objects.get_mut(e as usize).map(|o| &mut o.transform)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Seconds accumulated through [`Scene::advance`].
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Step time by `dt` and turn every spinning object to its angle at the new time.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        let t = self.elapsed;
        for obj in &mut self.objects {
            if let Some(spin) = obj.spin {
                let axis = spin.axis.normalize_or(Vec3::Y);
                obj.transform.rotation = Quat::from_axis_angle(axis, (spin.degrees_per_sec * t).to_radians());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn scene() -> Scene {
        Scene::new(Camera::default(), SceneLighting::default())
    }

    #[test]
    fn spawn_assigns_dense_ids() {
        let mut s = scene();
        let a = s.spawn(Transform::identity(), MeshKind::Cube, None);
        let b = s.spawn(Transform::identity(), MeshKind::SunMarker, None);
        assert_eq!((a, b), (0, 1));
        assert_eq!(s.len(), 2);
        assert_eq!(s.object(b).map(|o| o.mesh), Some(MeshKind::SunMarker));
        assert!(s.object(7).is_none());
    }

    #[test]
    fn advance_spins_only_spinning_objects() {
        let mut s = scene();
        let still = s.spawn(Transform::from_translation(vec3(1.0, 0.0, 0.0)), MeshKind::Cube, None);
        let spun = s.spawn(
            Transform::identity(),
            MeshKind::Cube,
            Some(Spin {
                axis: Vec3::Y,
                degrees_per_sec: 90.0,
            }),
        );
        s.advance(0.5);
        s.advance(0.5);
        assert!((s.elapsed() - 1.0).abs() < 1e-6);
        assert_eq!(s.object(still).map(|o| o.transform.rotation), Some(Quat::IDENTITY));

        let rotated = s.object(spun).map(|o| o.transform.matrix().transform_point3(Vec3::X));
        let p = rotated.unwrap_or(Vec3::ZERO);
        assert!((p - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn transform_mut_edits_in_place() {
        let mut s = scene();
        let e = s.spawn(Transform::identity(), MeshKind::Model, None);
        if let Some(t) = s.transform_mut(e) {
            t.translation = vec3(0.0, 2.0, 0.0);
        }
        assert_eq!(s.object(e).map(|o| o.transform.translation.y), Some(2.0));
    }
}
