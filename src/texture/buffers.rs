//! Depth, normal, and occlusion output buffers.

use super::{check_dimensions, AddressMode, TextureError};

/// Single-channel depth buffer with values in [0, 1].
///
/// A raw value of exactly 0 is reserved to mean "no geometry" and maps to
/// the far plane during view-position reconstruction.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    address_mode: AddressMode,
    data: Vec<f32>,
}

impl DepthBuffer {
    /// Create a depth buffer from raw data, row-major, one value per texel.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, TextureError> {
        check_dimensions(width, height, 1, data.len())?;
        Ok(Self {
            width,
            height,
            address_mode: AddressMode::default(),
            data,
        })
    }

    /// Create a buffer filled with a constant depth.
    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self, TextureError> {
        Self::new(width, height, vec![value; (width * height) as usize])
    }

    /// Set the addressing mode used for out-of-range coordinates.
    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
    }

    /// Buffer width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write a raw depth value at a texel.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Sample the raw depth at a normalized UV coordinate.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = self.address_mode.resolve(u, self.width);
        let y = self.address_mode.resolve(v, self.height);
        self.data[(y * self.width + x) as usize]
    }
}

/// Three-channel buffer storing view-space unit normals remapped to [0, 1].
///
/// Values are stored exactly as authored; decoding back to [-1, 1] and the
/// handedness flip are the kernel's business.
#[derive(Debug, Clone)]
pub struct NormalBuffer {
    width: u32,
    height: u32,
    address_mode: AddressMode,
    data: Vec<f32>,
}

impl NormalBuffer {
    /// Create a normal buffer from raw data, row-major, three values per texel.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, TextureError> {
        check_dimensions(width, height, 3, data.len())?;
        Ok(Self {
            width,
            height,
            address_mode: AddressMode::default(),
            data,
        })
    }

    /// Create a buffer with every texel set to the same encoded normal.
    pub fn filled(width: u32, height: u32, encoded: [f32; 3]) -> Result<Self, TextureError> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&encoded);
        }
        Self::new(width, height, data)
    }

    /// Set the addressing mode used for out-of-range coordinates.
    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
    }

    /// Buffer width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write an encoded normal at a texel.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, encoded: [f32; 3]) {
        let i = ((y * self.width + x) * 3) as usize;
        self.data[i..i + 3].copy_from_slice(&encoded);
    }

    /// Sample the stored (still [0, 1]-encoded) normal at a normalized UV.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        let x = self.address_mode.resolve(u, self.width);
        let y = self.address_mode.resolve(v, self.height);
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Single-channel occlusion output, one value per pixel in [0, 1].
///
/// 1.0 means fully unoccluded. Written once per pixel by the pass and
/// never read back by the kernel.
#[derive(Debug, Clone)]
pub struct AoBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl AoBuffer {
    pub(crate) fn from_data(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self { width, height, data }
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Occlusion value at a pixel.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Raw row-major occlusion values.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
