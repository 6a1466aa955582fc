//! Kernel configuration and per-frame uniforms.

use crate::math::{Vector2, Vector4};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from invalid kernel settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The step count must be at least one.
    #[error("num_steps must be at least 1")]
    ZeroSteps,

    /// The search radius must be positive.
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    /// The falloff band must have positive width.
    #[error("falloff band is empty: start2 {start2} must be less than end2 {end2}")]
    EmptyFalloffBand {
        /// Squared distance where falloff starts.
        start2: f32,
        /// Squared distance where falloff saturates.
        end2: f32,
    },
}

/// Horizon-AO kernel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GtaoSettings {
    /// Number of steps marched per signed direction.
    pub num_steps: u32,
    /// Search radius in view-space units.
    pub radius: f32,
    /// Whether distance falloff is applied to horizon samples.
    pub enable_falloff: bool,
    /// Squared view-space distance where falloff starts.
    pub falloff_start2: f32,
    /// Squared view-space distance where falloff saturates.
    pub falloff_end2: f32,
}

impl Default for GtaoSettings {
    fn default() -> Self {
        Self {
            num_steps: 8,
            radius: 2.0,
            enable_falloff: true,
            falloff_start2: 0.16,
            falloff_end2: 4.0,
        }
    }
}

impl GtaoSettings {
    /// Set the per-direction step count.
    pub fn set_num_steps(&mut self, num_steps: u32) {
        self.num_steps = num_steps.max(1);
    }

    /// Set the search radius.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.01);
    }

    /// Enable or disable distance falloff.
    pub fn set_enable_falloff(&mut self, enable: bool) {
        self.enable_falloff = enable;
    }

    /// Set the falloff band as squared distances.
    pub fn set_falloff_band(&mut self, start2: f32, end2: f32) {
        self.falloff_start2 = start2.max(0.0);
        self.falloff_end2 = end2.max(self.falloff_start2 + 1e-4);
    }

    /// Validate the settings before a dispatch.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.num_steps == 0 {
            return Err(SettingsError::ZeroSteps);
        }
        if self.radius <= 0.0 {
            return Err(SettingsError::NonPositiveRadius(self.radius));
        }
        if self.enable_falloff && self.falloff_start2 >= self.falloff_end2 {
            return Err(SettingsError::EmptyFalloffBand {
                start2: self.falloff_start2,
                end2: self.falloff_end2,
            });
        }
        Ok(())
    }
}

/// Per-frame uniform parameters, constant for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    /// Render resolution in pixels (width, height).
    pub render_size: Vector2,
    /// Clip parameters: near plane, far plane, radius scale constant, unused.
    pub clip_info: Vector4,
    /// Unprojection coefficients: view xy = (coord * xy + zw) * view z.
    pub proj_info: Vector4,
    /// Per-frame jitter: rotation phase, radial offset fraction.
    pub jitter: Vector2,
}

impl FrameUniforms {
    /// Create uniforms with explicit clip/projection parameters and no jitter.
    pub fn new(render_size: Vector2, clip_info: Vector4, proj_info: Vector4) -> Self {
        Self {
            render_size,
            clip_info,
            proj_info,
            jitter: Vector2::ZERO,
        }
    }

    /// Derive uniforms for a symmetric perspective camera.
    ///
    /// `fov_y` is the vertical field of view in radians. The radius scale
    /// constant is the projection scale in pixels per view unit at z = 1,
    /// so the search disc keeps a constant view-space size.
    pub fn for_camera(near: f32, far: f32, fov_y: f32, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let tan_half = (fov_y * 0.5).tan();
        let aspect = w / h;
        Self {
            render_size: Vector2::new(w, h),
            clip_info: Vector4::new(near, far, h / (2.0 * tan_half), 0.0),
            proj_info: Vector4::new(
                2.0 * tan_half * aspect / w,
                2.0 * tan_half / h,
                -tan_half * aspect,
                -tan_half,
            ),
            jitter: Vector2::ZERO,
        }
    }

    /// Replace the jitter pair, keeping everything else.
    pub fn with_jitter(mut self, jitter: Vector2) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Cyclic per-frame jitter source.
///
/// The only state that evolves across frames: a frame counter mapped to a
/// (rotation phase, radial offset) pair. The caller advances it once per
/// frame and feeds the pair into [`FrameUniforms`] before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JitterSequence {
    frame: u32,
    cycle: u32,
}

impl JitterSequence {
    /// Create a sequence cycling over `cycle` frames.
    pub fn new(cycle: u32) -> Self {
        Self {
            frame: 0,
            cycle: cycle.max(1),
        }
    }

    /// Jitter pair for the current frame.
    pub fn current(&self) -> Vector2 {
        let i = self.frame % self.cycle;
        let rotation = i as f32 / self.cycle as f32;
        // Stride the offset channel so it does not track the rotation.
        let offset = ((i * 7 + 3) % self.cycle) as f32 / self.cycle as f32;
        Vector2::new(rotation, offset)
    }

    /// Return the current pair and advance to the next frame.
    pub fn advance(&mut self) -> Vector2 {
        let jitter = self.current();
        self.frame = self.frame.wrapping_add(1);
        jitter
    }

    /// Frames issued so far.
    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }
}

impl Default for JitterSequence {
    fn default() -> Self {
        Self::new(6)
    }
}
