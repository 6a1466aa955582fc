//! Tileable per-pixel noise.

use super::{check_dimensions, AddressMode, TextureError};

/// Small tileable 2-channel noise texture.
///
/// Channel 0 drives the per-pixel sampling-direction rotation, channel 1
/// the per-pixel radial start offset, both in [0, 1]. The texture repeats
/// across the frame at its own tile size (4x4 by default).
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl NoiseTexture {
    /// Default tile size along each axis.
    pub const DEFAULT_TILE: u32 = 4;

    /// Create a noise texture from raw data, row-major, two values per texel.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, TextureError> {
        check_dimensions(width, height, 2, data.len())?;
        Ok(Self { width, height, data })
    }

    /// Generate the default 4x4 tile from interleaved gradient noise.
    pub fn generate() -> Self {
        let size = Self::DEFAULT_TILE;
        let mut data = Vec::with_capacity((size * size * 2) as usize);
        for y in 0..size {
            for x in 0..size {
                data.push(interleaved_gradient_noise(x as f32, y as f32));
                // Decorrelate the offset channel from the rotation channel.
                data.push(interleaved_gradient_noise(x as f32 + 5.588_238, y as f32 + 5.588_238));
            }
        }
        Self { width: size, height: size, data }
    }

    /// Tile width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Tile height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample (rotation, offset) at a normalized UV; the tile repeats.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> (f32, f32) {
        let x = AddressMode::Repeat.resolve(u, self.width);
        let y = AddressMode::Repeat.resolve(v, self.height);
        let i = ((y * self.width + x) * 2) as usize;
        (self.data[i], self.data[i + 1])
    }
}

impl Default for NoiseTexture {
    fn default() -> Self {
        Self::generate()
    }
}

/// Interleaved gradient noise (Jimenez 2014), in [0, 1).
fn interleaved_gradient_noise(x: f32, y: f32) -> f32 {
    let magic = [0.067_110_56f32, 0.005_837_15, 52.982_918];
    (magic[2] * (x * magic[0] + y * magic[1]).fract()).fract()
}
