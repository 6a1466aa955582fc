//! Translucent material replacement.

use crate::math::Color;
use serde::{Deserialize, Serialize};

/// Depth comparison function for the replaced material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthFunc {
    /// Pass when the incoming depth is less than the stored depth.
    Less,
    /// Pass when the incoming depth is less than or equal.
    #[default]
    LessEqual,
}

/// Parameters of the material being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceMaterial {
    /// Base color.
    pub color: Color,
    /// Surface roughness.
    pub roughness: f32,
    /// Surface metalness.
    pub metalness: f32,
    /// Scalar diffusion factor; absent means fully diffusing.
    pub diffusion: Option<f32>,
}

/// Configuration of the translucent replacement material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranslucentMaterial {
    /// Base color, copied from the source.
    pub color: Color,
    /// Depth writes are disabled for the translucent pass.
    pub depth_write: bool,
    /// The replacement always renders transparent.
    pub transparent: bool,
    /// Transparency derived from the source diffusion factor.
    pub transparency: f32,
    /// Alpha is premultiplied.
    pub premultiplied_alpha: bool,
    /// Roughness, copied from the source.
    pub roughness: f32,
    /// Metalness, copied from the source.
    pub metalness: f32,
    /// Depth test used while compositing over the opaque pass.
    pub depth_func: DepthFunc,
    /// Dithering to hide banding in the soft transparency.
    pub dithering: bool,
}

impl TranslucentMaterial {
    /// Build the replacement configuration from a source material.
    pub fn from_source(source: &SourceMaterial) -> Self {
        Self {
            color: source.color,
            depth_write: false,
            transparent: true,
            transparency: 1.0 - source.diffusion.unwrap_or(0.0),
            premultiplied_alpha: true,
            roughness: source.roughness,
            metalness: source.metalness,
            depth_func: DepthFunc::LessEqual,
            dithering: true,
        }
    }
}

impl From<&SourceMaterial> for TranslucentMaterial {
    fn from(source: &SourceMaterial) -> Self {
        Self::from_source(source)
    }
}
