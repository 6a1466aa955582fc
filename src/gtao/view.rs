//! View-space position reconstruction from depth.

use super::FrameUniforms;
use crate::math::{Vector2, Vector4};
use crate::texture::DepthBuffer;

/// Reconstruct the view-space position visible at a screen coordinate.
///
/// `coord` is in pixel units. Returns (x, y, z) in view space plus the
/// normalized linear depth in w. A raw depth of exactly 0 means "no
/// geometry" and is substituted with the far plane, so background pixels
/// come back with w == 1. Out-of-range coordinates are resolved by the
/// depth buffer's address mode.
pub fn get_view_position(depth: &DepthBuffer, coord: Vector2, uniforms: &FrameUniforms) -> Vector4 {
    let near = uniforms.clip_info.x;
    let far = uniforms.clip_info.y;

    let uv = Vector2::new(
        coord.x / uniforms.render_size.x,
        coord.y / uniforms.render_size.y,
    );

    let mut d = depth.sample(uv.x, uv.y);
    if d == 0.0 {
        d = far;
    }
    let d = (d.abs() - near) / (far - near);

    let z = near + d * (far - near);
    Vector4::new(
        (coord.x * uniforms.proj_info.x + uniforms.proj_info.z) * z,
        (coord.y * uniforms.proj_info.y + uniforms.proj_info.w) * z,
        z,
        d,
    )
}

/// Round a screen offset component to the sample grid.
///
/// Deliberately not `f32::round`: the `< 0.5` test sends every negative
/// value through `floor`, and values at or above 0.5 through `ceil`.
/// Horizon marching depends on this exact behavior.
#[inline]
pub(crate) fn round_offset(f: f32) -> f32 {
    if f < 0.5 {
        f.floor()
    } else {
        f.ceil()
    }
}

/// Component-wise [`round_offset`].
#[inline]
pub(crate) fn round_offset_vec(v: Vector2) -> Vector2 {
    Vector2::new(round_offset(v.x), round_offset(v.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector4 as V4;

    fn test_uniforms(width: u32, height: u32) -> FrameUniforms {
        FrameUniforms::for_camera(0.0, 1.0, std::f32::consts::FRAC_PI_2, width, height)
    }

    #[test]
    fn test_round_offset_branches() {
        assert_eq!(round_offset(0.3), 0.0);
        assert_eq!(round_offset(0.5), 1.0);
        assert_eq!(round_offset(0.7), 1.0);
        // Negative values always take the floor branch.
        assert_eq!(round_offset(-0.3), -1.0);
        assert_eq!(round_offset(-1.5), -2.0);
    }

    #[test]
    fn test_background_maps_to_far() {
        let depth = DepthBuffer::filled(8, 8, 0.0).unwrap();
        let u = test_uniforms(8, 8);
        let vpos = get_view_position(&depth, Vector2::new(4.5, 4.5), &u);
        assert_eq!(vpos.w, 1.0);
        assert_eq!(vpos.z, u.clip_info.y);
    }

    #[test]
    fn test_depth_roundtrip() {
        // With near = 0 and far = 1 the raw depth is the view-space z.
        let depth = DepthBuffer::filled(16, 16, 0.5).unwrap();
        let u = test_uniforms(16, 16);
        let vpos = get_view_position(&depth, Vector2::new(8.0, 8.0), &u);
        assert!((vpos.z - 0.5).abs() < 1e-6);
        assert!((vpos.w - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_xy_matches_forward_projection() {
        let depth = DepthBuffer::filled(16, 16, 0.5).unwrap();
        let u = test_uniforms(16, 16);
        // Pick a view point, project it to pixels, reconstruct it back.
        let expected = crate::math::Vector3::new(0.1, -0.05, 0.5);
        let px = (expected.x / expected.z - u.proj_info.z) / u.proj_info.x;
        let py = (expected.y / expected.z - u.proj_info.w) / u.proj_info.y;
        let vpos = get_view_position(&depth, Vector2::new(px, py), &u);
        assert!(vpos.approx_eq(&V4::new(expected.x, expected.y, expected.z, 0.5), 1e-4));
    }
}
