//! # Horizon-AO
//!
//! A screen-space horizon-based ambient occlusion (GTAO-style) kernel.
//!
//! For every pixel of a rendered frame the kernel estimates the fraction of
//! the hemisphere above the surface that is occluded by nearby geometry,
//! using only a depth buffer, a view-space normal buffer, and a small
//! tileable noise pattern. The kernel is a pure per-pixel function; the
//! frame dispatch runs every pixel independently in parallel.
//!
//! ## Features
//!
//! - **Math**: Vector types shared by the kernel and its callers
//! - **Texture**: CPU-side depth, normal, and noise buffers with
//!   configurable addressing
//! - **Gtao**: View-position reconstruction, the horizon kernel itself,
//!   and a frame-level pass that dispatches it
//! - **Material**: The translucent material swap that consumes the
//!   occluded scene
//!
//! ## Example
//!
//! ```ignore
//! use horizon_ao::prelude::*;
//!
//! let uniforms = FrameUniforms::for_camera(0.1, 100.0, 60f32.to_radians(), 640, 480);
//! let pass = GtaoPass::new();
//! let ao = pass.render(&GtaoInputs {
//!     depth: &depth,
//!     normals: &normals,
//!     noise: &noise,
//!     uniforms,
//! })?;
//! ```

pub mod gtao;
pub mod material;
pub mod math;
pub mod texture;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::gtao::*;
    pub use crate::material::*;
    pub use crate::math::*;
    pub use crate::texture::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Horizon-AO";
