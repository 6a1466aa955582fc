//! Texture addressing configuration.

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge texel.
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
}

impl AddressMode {
    /// Resolve a normalized coordinate to a texel index along one axis.
    #[inline]
    pub(crate) fn resolve(self, coord: f32, size: u32) -> u32 {
        let i = (coord * size as f32).floor() as i64;
        match self {
            AddressMode::ClampToEdge => i.clamp(0, size as i64 - 1) as u32,
            AddressMode::Repeat => i.rem_euclid(size as i64) as u32,
        }
    }
}
