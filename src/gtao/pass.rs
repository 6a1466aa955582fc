//! Frame-level dispatch of the horizon kernel.

use super::kernel::{occlusion, GtaoInputs};
use super::settings::{GtaoSettings, SettingsError};
use crate::texture::AoBuffer;
use log::debug;
use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur when dispatching a frame.
#[derive(Error, Debug)]
pub enum GtaoError {
    /// The kernel settings are invalid.
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// The depth buffer does not match the frame's render size.
    #[error("depth buffer is {actual_w}x{actual_h}, render size is {expected_w}x{expected_h}")]
    DepthSizeMismatch {
        /// Expected width in pixels.
        expected_w: u32,
        /// Expected height in pixels.
        expected_h: u32,
        /// Depth buffer width.
        actual_w: u32,
        /// Depth buffer height.
        actual_h: u32,
    },

    /// The normal buffer does not match the frame's render size.
    #[error("normal buffer is {actual_w}x{actual_h}, render size is {expected_w}x{expected_h}")]
    NormalSizeMismatch {
        /// Expected width in pixels.
        expected_w: u32,
        /// Expected height in pixels.
        expected_h: u32,
        /// Normal buffer width.
        actual_w: u32,
        /// Normal buffer height.
        actual_h: u32,
    },
}

/// Horizon-AO pass.
///
/// Owns the kernel settings and dispatches one kernel invocation per
/// pixel. Inputs are read-only for the whole dispatch and every output
/// pixel is written exactly once, so rows run in parallel.
#[derive(Debug, Clone, Default)]
pub struct GtaoPass {
    settings: GtaoSettings,
}

impl GtaoPass {
    /// Create a pass with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pass with explicit settings.
    pub fn with_settings(settings: GtaoSettings) -> Self {
        Self { settings }
    }

    /// Get settings.
    pub fn settings(&self) -> &GtaoSettings {
        &self.settings
    }

    /// Set settings.
    pub fn set_settings(&mut self, settings: GtaoSettings) {
        self.settings = settings;
    }

    /// Compute occlusion for a whole frame.
    ///
    /// Validates settings and buffer dimensions, then evaluates the
    /// kernel for every pixel of the render size.
    pub fn render(&self, inputs: &GtaoInputs) -> Result<AoBuffer, GtaoError> {
        self.settings.validate()?;

        let width = inputs.uniforms.render_size.x as u32;
        let height = inputs.uniforms.render_size.y as u32;
        if inputs.depth.width() != width || inputs.depth.height() != height {
            return Err(GtaoError::DepthSizeMismatch {
                expected_w: width,
                expected_h: height,
                actual_w: inputs.depth.width(),
                actual_h: inputs.depth.height(),
            });
        }
        if inputs.normals.width() != width || inputs.normals.height() != height {
            return Err(GtaoError::NormalSizeMismatch {
                expected_w: width,
                expected_h: height,
                actual_w: inputs.normals.width(),
                actual_h: inputs.normals.height(),
            });
        }

        debug!(
            "gtao dispatch: {}x{} pixels, {} steps, radius {}",
            width, height, self.settings.num_steps, self.settings.radius
        );

        let mut data = vec![0.0f32; (width * height) as usize];
        data.par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = occlusion(x as u32, y as u32, &self.settings, inputs);
                }
            });

        Ok(AoBuffer::from_data(width, height, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtao::FrameUniforms;
    use crate::texture::{DepthBuffer, NoiseTexture, NormalBuffer};

    const FACING_CAMERA: [f32; 3] = [0.5, 0.5, 1.0];

    #[test]
    fn test_depth_size_mismatch_rejected() {
        let depth = DepthBuffer::filled(8, 8, 0.5).unwrap();
        let normals = NormalBuffer::filled(16, 16, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let pass = GtaoPass::new();
        let err = pass
            .render(&GtaoInputs {
                depth: &depth,
                normals: &normals,
                noise: &noise,
                uniforms: FrameUniforms::for_camera(0.0, 1.0, 0.35, 16, 16),
            })
            .unwrap_err();
        assert!(matches!(err, GtaoError::DepthSizeMismatch { .. }));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let depth = DepthBuffer::filled(8, 8, 0.5).unwrap();
        let normals = NormalBuffer::filled(8, 8, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let pass = GtaoPass::with_settings(GtaoSettings {
            num_steps: 0,
            ..Default::default()
        });
        let err = pass
            .render(&GtaoInputs {
                depth: &depth,
                normals: &normals,
                noise: &noise,
                uniforms: FrameUniforms::for_camera(0.0, 1.0, 0.35, 8, 8),
            })
            .unwrap_err();
        assert!(matches!(err, GtaoError::Settings(_)));
    }

    #[test]
    fn test_flat_plane_frame_mostly_visible() {
        let (w, h) = (32u32, 32u32);
        let depth = DepthBuffer::filled(w, h, 0.5).unwrap();
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let pass = GtaoPass::new();
        let ao = pass
            .render(&GtaoInputs {
                depth: &depth,
                normals: &normals,
                noise: &noise,
                uniforms: FrameUniforms::for_camera(0.0, 1.0, 0.35, w, h),
            })
            .unwrap();
        assert_eq!(ao.width(), w);
        assert_eq!(ao.height(), h);
        for &v in ao.data() {
            assert!(v > 0.95 && v.is_finite(), "plane pixel ao = {v}");
        }
    }

    #[test]
    fn test_dispatch_matches_single_invocations() {
        // The parallel dispatch must agree with direct kernel calls.
        let (w, h) = (16u32, 16u32);
        let mut depth = DepthBuffer::filled(w, h, 0.5).unwrap();
        depth.set(5, 5, 0.2);
        depth.set(10, 9, 0.35);
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let pass = GtaoPass::new();
        let inputs = GtaoInputs {
            depth: &depth,
            normals: &normals,
            noise: &noise,
            uniforms: FrameUniforms::for_camera(0.0, 1.0, 0.35, w, h),
        };
        let ao = pass.render(&inputs).unwrap();
        for y in 0..h {
            for x in 0..w {
                assert_eq!(ao.get(x, y), occlusion(x, y, pass.settings(), &inputs));
            }
        }
    }
}
