//! Host-side uniform values and their byte encoding in a WGSL uniform buffer.

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Shape of a uniform slot as reflected from a shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// Bytes the value occupies inside a uniform buffer (WGSL layout).
    pub const fn size(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 | Self::Mat2 => 16,
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Int(_) => UniformKind::Int,
            Self::Float(_) => UniformKind::Float,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat2(_) => UniformKind::Mat2,
            Self::Mat3(_) => UniformKind::Mat3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Encode into `out`, which must be at least `self.kind().size()` bytes.
    /// mat3 columns are padded to 16 bytes; the padding is left untouched.
    pub fn write_to(&self, out: &mut [u8]) {
        match *self {
            Self::Int(v) => out[..4].copy_from_slice(bytemuck::bytes_of(&v)),
            Self::Float(v) => out[..4].copy_from_slice(bytemuck::bytes_of(&v)),
            Self::Vec2(v) => out[..8].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec3(v) => out[..12].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec4(v) => out[..16].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Mat2(m) => out[..16].copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
            Self::Mat3(m) => {
                for (i, col) in m.to_cols_array_2d().iter().enumerate() {
                    out[i * 16..i * 16 + 12].copy_from_slice(bytemuck::cast_slice(col));
                }
            }
            Self::Mat4(m) => out[..64].copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

/// Rust types that can be written to a uniform of a fixed [`UniformKind`].
pub trait UniformType: Copy {
    const KIND: UniformKind;
    fn into_value(self) -> UniformValue;
}

impl UniformType for bool {
    const KIND: UniformKind = UniformKind::Int;
    fn into_value(self) -> UniformValue {
        UniformValue::Int(self as i32)
    }
}

macro_rules! uniform_type {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl UniformType for $ty {
                const KIND: UniformKind = UniformKind::$kind;
                fn into_value(self) -> UniformValue {
                    UniformValue::$kind(self)
                }
            }
        )*
    };
}

uniform_type! {
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}
