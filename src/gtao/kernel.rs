//! The per-pixel horizon occlusion kernel.
//!
//! Pure function of the input buffers and frame uniforms; no state is
//! shared between pixels, so invocations can run in any order or in
//! parallel. The math follows the GTAO formulation: march a jittered
//! screen-space direction both ways for the maximum horizon cosine,
//! convert to angles, clamp to the hemisphere around the projected
//! surface normal, and integrate the visible arc in closed form.

use super::settings::{FrameUniforms, GtaoSettings};
use super::view::{get_view_position, round_offset_vec};
use crate::math::consts::{HALF_PI, PI};
use crate::math::{Vector2, Vector3, Vector4};
use crate::texture::{DepthBuffer, NoiseTexture, NormalBuffer};

/// Read-only inputs for one frame's worth of kernel invocations.
#[derive(Debug, Clone, Copy)]
pub struct GtaoInputs<'a> {
    /// Depth buffer, raw values in [0, 1], 0 meaning background.
    pub depth: &'a DepthBuffer,
    /// View-space normal buffer, [0, 1]-encoded.
    pub normals: &'a NormalBuffer,
    /// Tileable per-pixel noise.
    pub noise: &'a NoiseTexture,
    /// Frame parameters, constant for the whole dispatch.
    pub uniforms: FrameUniforms,
}

/// Decode a stored normal from [0, 1] back to a [-1, 1] vector.
#[inline]
fn unpack_normal(encoded: [f32; 3]) -> Vector3 {
    Vector3::new(
        encoded[0] * 2.0 - 1.0,
        encoded[1] * 2.0 - 1.0,
        encoded[2] * 2.0 - 1.0,
    )
}

/// Convert a normal from the buffer's authoring handedness to the
/// kernel's working convention.
///
/// Kept as its own step so swapping normal-buffer conventions stays a
/// one-line change.
#[inline]
fn flip_normal_handedness(mut normal: Vector3) -> Vector3 {
    normal.z = -normal.z;
    normal
}

/// Distance falloff subtracted from a horizon cosine, in [0, 2].
///
/// Tapers contributions across the configured squared-distance band
/// instead of hard-cutting them at the search radius.
#[inline]
fn falloff(dist2: f32, settings: &GtaoSettings) -> f32 {
    2.0 * ((dist2 - settings.falloff_start2)
        / (settings.falloff_end2 - settings.falloff_start2))
        .clamp(0.0, 1.0)
}

/// March both signed directions of `dir` and return the maximum horizon
/// cosines as (positive side, negative side).
#[allow(clippy::too_many_arguments)]
fn search_horizons(
    inputs: &GtaoInputs,
    settings: &GtaoSettings,
    screen_coord: Vector2,
    vpos: Vector4,
    vdir: Vector3,
    dir: Vector3,
    mut curr_step: f32,
    step_size: f32,
) -> Vector2 {
    let mut horizons = Vector2::new(-1.0, -1.0);

    for _ in 0..settings.num_steps {
        let offset = round_offset_vec(dir.xy() * curr_step);

        horizons.x = horizons.x.max(horizon_cosine(
            inputs,
            settings,
            screen_coord + offset,
            vpos,
            vdir,
        ));
        horizons.y = horizons.y.max(horizon_cosine(
            inputs,
            settings,
            screen_coord - offset,
            vpos,
            vdir,
        ));

        curr_step += step_size;
    }

    horizons
}

/// Horizon cosine of a single sample, with falloff already subtracted.
///
/// A sample that reconstructs to exactly the center position carries no
/// horizon information; it returns -1 so the max-update ignores it
/// instead of propagating the 1/sqrt(0) singularity.
#[inline]
fn horizon_cosine(
    inputs: &GtaoInputs,
    settings: &GtaoSettings,
    sample_coord: Vector2,
    vpos: Vector4,
    vdir: Vector3,
) -> f32 {
    let s = get_view_position(inputs.depth, sample_coord, &inputs.uniforms);
    let ws = s.xyz() - vpos.xyz();
    let dist2 = ws.length_squared();
    if dist2 == 0.0 {
        return -1.0;
    }
    let cosh = ws.dot(&vdir) / dist2.sqrt();
    let fall = if settings.enable_falloff {
        falloff(dist2, settings)
    } else {
        0.0
    };
    cosh - fall
}

/// Integrate the clamped horizon arc for one sampling direction.
fn integrate_arcs(horizons: Vector2, vnorm: Vector3, vdir: Vector3, dir: Vector3) -> f32 {
    let h = Vector2::new(
        horizons.x.clamp(-1.0, 1.0).acos(),
        horizons.y.clamp(-1.0, 1.0).acos(),
    );

    let bitangent = dir.cross(&vdir).normalized();
    let tangent = vdir.cross(&bitangent);
    let nx = vnorm - bitangent * vnorm.dot(&bitangent);

    let nnx = nx.length();
    // Epsilon guards a normal parallel to the search plane's bitangent.
    let invnnx = 1.0 / (nnx + 1e-6);
    let cosxi = nx.dot(&tangent) * invnnx; // xi = gamma + HALF_PI
    let gamma = cosxi.clamp(-1.0, 1.0).acos() - HALF_PI;
    let cosgamma = nx.dot(&vdir) * invnnx;
    let singamma2 = -2.0 * cosxi; // cos(x + HALF_PI) = -sin(x)

    // Clamp both horizons to the hemisphere around the projected normal.
    let hx = gamma + (-h.x - gamma).max(-HALF_PI);
    let hy = gamma + (h.y - gamma).min(HALF_PI);

    // Riemann integral is additive.
    nnx * 0.25
        * ((hx * singamma2 + cosgamma - (2.0 * hx - gamma).cos())
            + (hy * singamma2 + cosgamma - (2.0 * hy - gamma).cos()))
}

/// Compute the occlusion scalar for one pixel.
///
/// Returns a visibility value in [0, 1]; 1 means fully unoccluded.
/// Background pixels (normalized depth 1) short-circuit to 1.
pub fn occlusion(x: u32, y: u32, settings: &GtaoSettings, inputs: &GtaoInputs) -> f32 {
    let uniforms = &inputs.uniforms;
    let screen_coord = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);

    let vpos = get_view_position(inputs.depth, screen_coord, uniforms);
    if vpos.w == 1.0 {
        return 1.0;
    }

    let encoded = inputs.normals.sample(
        screen_coord.x / uniforms.render_size.x,
        screen_coord.y / uniforms.render_size.y,
    );
    let vnorm = flip_normal_handedness(unpack_normal(encoded));
    let vdir = (-vpos.xyz()).normalized();

    // Per-pixel randomization: tile coordinate with a half-texel bias.
    let tile_w = inputs.noise.width() as f32;
    let tile_h = inputs.noise.height() as f32;
    let texel_pos = Vector2::new(
        0.5 / tile_w + (screen_coord.x % tile_w) / tile_w,
        0.5 / tile_h + (screen_coord.y % tile_h) / tile_h,
    );
    let (noise_rot, noise_offset) = inputs.noise.sample(texel_pos.x, texel_pos.y);

    // Screen-space radius scales inversely with depth so the sampling
    // disc keeps a constant view-space size; the floor keeps at least
    // one pixel of travel per step at far depths.
    let radius =
        ((settings.radius * uniforms.clip_info.z) / vpos.z).max(settings.num_steps as f32);
    let step_size = radius / settings.num_steps as f32;

    let phi = (uniforms.jitter.x + noise_rot) * PI;
    let dir = Vector3::new(phi.cos(), phi.sin(), 0.0);
    let curr_step = 1.0 + noise_offset * step_size + 0.25 * step_size * uniforms.jitter.y;

    let horizons = search_horizons(
        inputs,
        settings,
        screen_coord,
        vpos,
        vdir,
        dir,
        curr_step,
        step_size,
    );

    integrate_arcs(horizons, vnorm, vdir, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Normal encoding that decodes (after the handedness flip) to a
    /// surface facing the camera.
    const FACING_CAMERA: [f32; 3] = [0.5, 0.5, 1.0];

    fn plane_inputs<'a>(
        depth: &'a DepthBuffer,
        normals: &'a NormalBuffer,
        noise: &'a NoiseTexture,
    ) -> GtaoInputs<'a> {
        GtaoInputs {
            depth,
            normals,
            noise,
            uniforms: FrameUniforms::for_camera(
                0.0,
                1.0,
                0.35,
                depth.width(),
                depth.height(),
            ),
        }
    }

    #[test]
    fn test_falloff_monotonic_and_saturating() {
        let settings = GtaoSettings::default();
        assert_eq!(falloff(0.0, &settings), 0.0);
        assert_eq!(falloff(settings.falloff_start2, &settings), 0.0);
        let mid1 = falloff(1.0, &settings);
        let mid2 = falloff(2.0, &settings);
        assert!(mid1 > 0.0 && mid2 > mid1);
        assert_eq!(falloff(settings.falloff_end2, &settings), 2.0);
        assert_eq!(falloff(100.0, &settings), 2.0);
    }

    #[test]
    fn test_unpack_and_flip() {
        let n = flip_normal_handedness(unpack_normal([0.5, 0.5, 1.0]));
        assert!(n.approx_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn test_background_is_fully_visible() {
        let depth = DepthBuffer::filled(16, 16, 0.0).unwrap();
        // Garbage normals must not matter for background pixels.
        let normals = NormalBuffer::filled(16, 16, [0.3, 0.9, 0.1]).unwrap();
        let noise = NoiseTexture::generate();
        let settings = GtaoSettings::default();
        let inputs = plane_inputs(&depth, &normals, &noise);
        for (x, y) in [(0, 0), (7, 3), (15, 15)] {
            assert_eq!(occlusion(x, y, &settings, &inputs), 1.0);
        }
    }

    #[test]
    fn test_flat_plane_center_fully_visible() {
        let depth = DepthBuffer::filled(64, 64, 0.5).unwrap();
        let normals = NormalBuffer::filled(64, 64, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let settings = GtaoSettings::default();
        let inputs = plane_inputs(&depth, &normals, &noise);
        let ao = occlusion(32, 32, &settings, &inputs);
        assert!((ao - 1.0).abs() < 1e-3, "center plane pixel ao = {ao}");
    }

    #[test]
    fn test_flat_plane_independent_of_jitter() {
        let depth = DepthBuffer::filled(64, 64, 0.5).unwrap();
        let normals = NormalBuffer::filled(64, 64, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let settings = GtaoSettings::default();
        let mut inputs = plane_inputs(&depth, &normals, &noise);
        for jitter in [
            Vector2::ZERO,
            Vector2::new(0.5, 0.25),
            Vector2::new(0.833, 0.667),
        ] {
            inputs.uniforms = inputs.uniforms.with_jitter(jitter);
            let ao = occlusion(32, 32, &settings, &inputs);
            assert!((ao - 1.0).abs() < 1e-3, "jitter {jitter:?} gave ao = {ao}");
        }
    }

    #[test]
    fn test_wall_occludes() {
        // Left half of the frame is a near wall, right half a far plane.
        let (w, h) = (64u32, 64u32);
        let mut depth = DepthBuffer::filled(w, h, 0.6).unwrap();
        for y in 0..h {
            for x in 0..w / 2 {
                depth.set(x, y, 0.3);
            }
        }
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();
        let settings = GtaoSettings::default();
        let inputs = GtaoInputs {
            depth: &depth,
            normals: &normals,
            noise: &noise,
            uniforms: FrameUniforms::for_camera(0.0, 1.0, 0.35, w, h),
        };
        // A far-plane pixel hugging the step occludes against the wall.
        let near_step = occlusion(33, 32, &settings, &inputs);
        assert!(near_step < 0.9, "pixel next to wall ao = {near_step}");
    }

    #[test]
    fn test_occluder_outside_radius_ignored() {
        // Falloff off: an occluder farther than the marched range must
        // leave the plane's visibility untouched.
        let (w, h) = (96u32, 96u32);
        let settings = GtaoSettings {
            enable_falloff: false,
            ..Default::default()
        };
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();

        let plane = DepthBuffer::filled(w, h, 0.8).unwrap();
        // Wide fov keeps the pixel-space search radius well inside the frame.
        let uniforms = FrameUniforms::for_camera(0.0, 1.0, 2.6, w, h);
        let baseline = occlusion(48, 48, &settings, &GtaoInputs {
            depth: &plane,
            normals: &normals,
            noise: &noise,
            uniforms,
        });

        // The search radius in pixels for this setup.
        let radius = ((settings.radius * uniforms.clip_info.z) / 0.8)
            .max(settings.num_steps as f32);
        assert!(radius < 40.0, "test scene assumes a bounded radius");

        let mut far_occluder = plane.clone();
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - 48.0;
                let dy = y as f32 - 48.0;
                // Margin past the radius covers the rounded sample grid.
                if (dx * dx + dy * dy).sqrt() > radius + 4.0 {
                    far_occluder.set(x, y, 0.05);
                }
            }
        }
        let with_far = occlusion(48, 48, &settings, &GtaoInputs {
            depth: &far_occluder,
            normals: &normals,
            noise: &noise,
            uniforms,
        });
        assert!((with_far - baseline).abs() < 1e-6);
    }

    #[test]
    fn test_depth_scale_invariance() {
        // Scaling every scene depth and the radius scale constant by the
        // same factor keeps the screen-space sampling pattern and every
        // horizon cosine unchanged, so the output must match. Falloff
        // stays off: its band is an absolute view-space distance.
        let (w, h) = (64u32, 64u32);
        let settings = GtaoSettings {
            enable_falloff: false,
            ..Default::default()
        };
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::generate();

        let k = 4.0;
        let mut near_scene = DepthBuffer::filled(w, h, 0.2).unwrap();
        let mut scaled_scene = DepthBuffer::filled(w, h, 0.2 * k).unwrap();
        for y in 0..h {
            for x in 0..w / 2 {
                near_scene.set(x, y, 0.1);
                scaled_scene.set(x, y, 0.1 * k);
            }
        }

        let uniforms = FrameUniforms::for_camera(0.0, 1.0, 0.35, w, h);
        let mut scaled_uniforms = uniforms;
        scaled_uniforms.clip_info.z *= k;

        for (x, y) in [(33, 32), (40, 10), (5, 50)] {
            let a = occlusion(x, y, &settings, &GtaoInputs {
                depth: &near_scene,
                normals: &normals,
                noise: &noise,
                uniforms,
            });
            let b = occlusion(x, y, &settings, &GtaoInputs {
                depth: &scaled_scene,
                normals: &normals,
                noise: &noise,
                uniforms: scaled_uniforms,
            });
            assert!((a - b).abs() < 1e-6, "pixel ({x}, {y}): {a} vs {b}");
            // The step pixel really occludes, so the match is not vacuous.
            if (x, y) == (33, 32) {
                assert!(a < 0.9, "step pixel ao = {a}");
            }
        }
    }

    #[test]
    fn test_symmetric_horizons() {
        // A depth valley symmetric about the center column: marching the
        // x axis must see the same horizon on both sides.
        let (w, h) = (65u32, 65u32);
        let mut depth = DepthBuffer::filled(w, h, 0.3).unwrap();
        for y in 0..h {
            for x in 0..w {
                let d = (x as i32 - 32).unsigned_abs();
                if d > 4 {
                    depth.set(x, y, 0.25);
                }
            }
        }
        let noise = NoiseTexture::generate();
        let uniforms = FrameUniforms::for_camera(0.0, 1.0, 0.35, w, h);
        let settings = GtaoSettings::default();
        let normals = NormalBuffer::filled(w, h, FACING_CAMERA).unwrap();
        let inputs = GtaoInputs {
            depth: &depth,
            normals: &normals,
            noise: &noise,
            uniforms,
        };

        let screen_coord = Vector2::new(32.5, 32.5);
        let vpos = get_view_position(inputs.depth, screen_coord, &uniforms);
        let vdir = (-vpos.xyz()).normalized();
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let step_size = 2.0;
        let horizons = search_horizons(
            &inputs,
            &settings,
            screen_coord,
            vpos,
            vdir,
            dir,
            1.0,
            step_size,
        );
        assert!(
            (horizons.x - horizons.y).abs() < 1e-4,
            "horizons {horizons:?} not symmetric"
        );
    }

    #[test]
    fn test_degenerate_noise_stays_finite() {
        // A constant 1x1 noise tile collapses the dither pattern; the
        // kernel output must still be finite everywhere.
        let depth = DepthBuffer::filled(8, 8, 0.5).unwrap();
        let normals = NormalBuffer::filled(8, 8, FACING_CAMERA).unwrap();
        let noise = NoiseTexture::new(1, 1, vec![0.0, 0.0]).unwrap();
        let settings = GtaoSettings::default();
        let inputs = plane_inputs(&depth, &normals, &noise);
        let ao = occlusion(4, 4, &settings, &inputs);
        assert!(ao.is_finite());
    }
}
