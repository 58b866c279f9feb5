//! Phong light descriptors and the default scene lighting.
//!
//! Pure data: how these values reach a shader is the renderer's business.

use crate::{Vec3, vec3};

/// Number of point lights the shipped shaders declare.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Fraction of a point light's colour used as its ambient term.
pub const POINT_AMBIENT_SCALE: f32 = 0.1;

/// Constant/linear/quadratic distance falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Intensity multiplier at `distance`.
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn ambient(&self, scale: f32) -> Vec3 {
        self.color * scale
    }

    #[inline]
    pub fn diffuse(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn specular(&self) -> Vec3 {
        self.color
    }
}

/// Flashlight cone. Position and direction follow the camera, so only the
/// colour terms, falloff and cone angles are stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    /// Inner (hard edge) half-angle in degrees.
    pub cutoff_deg: f32,
    /// Outer (soft edge) half-angle in degrees.
    pub outer_cutoff_deg: f32,
}

impl SpotLight {
    #[inline]
    pub fn cutoff_cos(&self) -> f32 {
        self.cutoff_deg.to_radians().cos()
    }

    #[inline]
    pub fn outer_cutoff_cos(&self) -> f32 {
        self.outer_cutoff_deg.to_radians().cos()
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            attenuation: Attenuation::new(1.0, 0.22, 0.20),
            cutoff_deg: 10.0,
            outer_cutoff_deg: 15.0,
        }
    }
}

/// All lights of one scene: one sun, up to [`MAX_POINT_LIGHTS`] bulbs, one flashlight.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLighting {
    pub directional: DirectionalLight,
    pub points: Vec<PointLight>,
    pub spot: SpotLight,
    pub point_ambient_scale: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        let falloff = Attenuation::new(1.0, 0.09, 0.032);
        let bulbs = [
            (vec3(0.7, 0.2, 2.0), vec3(0.5, 0.5, 0.5)),
            (vec3(2.3, -3.3, -4.0), vec3(0.75, 0.0, 0.60)),
            (vec3(-4.0, 2.0, -12.0), vec3(0.0, 0.0, 0.8)),
            (vec3(0.0, 0.0, -3.0), vec3(0.75, 0.05, 0.05)),
        ];

        Self {
            directional: DirectionalLight {
                direction: vec3(1.2, 3.0, 2.0),
                ambient: Vec3::ZERO,
                diffuse: Vec3::splat(0.05),
                specular: Vec3::splat(0.2),
            },
            points: bulbs
                .iter()
                .map(|&(position, color)| PointLight {
                    position,
                    color,
                    attenuation: falloff,
                })
                .collect(),
            spot: SpotLight::default(),
            point_ambient_scale: POINT_AMBIENT_SCALE,
        }
    }
}
