//! # Texture Module
//!
//! CPU-side image buffers consumed and produced by the kernel: depth,
//! view-space normals, tileable noise, and the single-channel occlusion
//! output. Sampling is nearest-neighbor; out-of-range coordinates are
//! resolved by the buffer's [`AddressMode`].

mod buffers;
mod noise;
mod sampler;

pub use buffers::{AoBuffer, DepthBuffer, NormalBuffer};
pub use noise::NoiseTexture;
pub use sampler::AddressMode;

use thiserror::Error;

/// Errors that can occur when constructing a buffer.
#[derive(Error, Debug)]
pub enum TextureError {
    /// Data length does not match the requested dimensions.
    #[error("buffer data has {actual} values, {width}x{height} with {channels} channel(s) needs {expected}")]
    SizeMismatch {
        /// Requested width in texels.
        width: u32,
        /// Requested height in texels.
        height: u32,
        /// Channels per texel.
        channels: u32,
        /// Expected data length.
        expected: usize,
        /// Provided data length.
        actual: usize,
    },

    /// A buffer dimension is zero.
    #[error("buffer dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Requested width in texels.
        width: u32,
        /// Requested height in texels.
        height: u32,
    },
}

/// Check dimensions and data length for a buffer constructor.
pub(crate) fn check_dimensions(
    width: u32,
    height: u32,
    channels: u32,
    len: usize,
) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimension { width, height });
    }
    let expected = (width * height * channels) as usize;
    if len != expected {
        return Err(TextureError::SizeMismatch {
            width,
            height,
            channels,
            expected,
            actual: len,
        });
    }
    Ok(())
}
