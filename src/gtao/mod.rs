//! # Gtao Module
//!
//! The horizon-based ambient occlusion kernel and its frame-level pass.
//!
//! The kernel proper lives in [`kernel`]: a pure per-pixel function that
//! reconstructs view-space positions from depth, marches a jittered
//! screen-space direction for the two signed horizon angles, clamps them
//! to the hemisphere around the surface normal, and integrates the
//! visible arc in closed form. [`GtaoPass`] dispatches it over a whole
//! frame, one independent invocation per pixel.

mod kernel;
mod pass;
mod settings;
mod view;

pub use kernel::{occlusion, GtaoInputs};
pub use pass::{GtaoError, GtaoPass};
pub use settings::{FrameUniforms, GtaoSettings, JitterSequence, SettingsError};
pub use view::get_view_position;
