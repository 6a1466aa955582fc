//! # Math Module
//!
//! Vector and color types shared by the kernel and its callers.
//! Provides a Three.js-like API over plain `f32` fields, with `glam`
//! conversions where callers already live in that ecosystem.

mod color;
mod vector2;
mod vector3;
mod vector4;

pub use color::Color;
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;

/// Common math constants.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Half of Pi.
    pub const HALF_PI: f32 = PI / 2.0;
}
