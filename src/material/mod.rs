//! # Material Module
//!
//! The translucent material swap used by the host renderer around the
//! occlusion pass. Pure parameter mapping, no shading.

mod translucent;

pub use translucent::{DepthFunc, SourceMaterial, TranslucentMaterial};
