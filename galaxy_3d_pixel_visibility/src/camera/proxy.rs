/// Proxy geometry and screen clipping.
///
/// A proxy is a small quad facing the view, drawn at the effect origin
/// with an occlusion query around it. Its size is chosen so it always
/// covers a few pixels; its clip fraction tells how much of it falls
/// inside the viewport, independently of what the GPU reports.

use glam::{Mat4, Vec2, Vec3};
use crate::config::PixelVisibilityConfig;
use crate::renderer::ProxyQuad;
use super::view_setup::ViewSetup;

/// Clip-space w below which a corner is treated as behind the eye
const BEHIND_EYE_W: f32 = 0.001;

/// Screen coordinate multiplier for corners behind the eye
const BEHIND_EYE_SCALE: f32 = 100_000.0;

/// Keeps the quad's half-diagonal equal to the requested radius
const HALF_DIAGONAL: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Build the proxy quad for one query.
///
/// # Arguments
///
/// * `view` - Camera of the view being rendered
/// * `origin` - World position of the effect
/// * `size` - Proxy radius in world units, or in "pixels at the reference
///   distance" when `screen_space` is set
/// * `aspect` - Height / width of the quad
/// * `screen_space` - Keep a constant on-screen size
/// * `config` - Minimum pixel size and screen-space reference distance
pub fn build_proxy(
    view: &ViewSetup,
    origin: Vec3,
    size: f32,
    aspect: f32,
    screen_space: bool,
    config: &PixelVisibilityConfig,
) -> ProxyQuad {
    let pixels_per_unit = view.pixel_diameter_of_sphere(origin, 1.0).max(1e-4);

    let mut scale = size;
    if screen_space {
        let reference = view.origin() + view.forward() * config.screen_space_reference_distance;
        let reference_pixels = view.pixel_diameter_of_sphere(reference, size * 0.5);
        scale = reference_pixels / pixels_per_unit;
    } else if size * pixels_per_unit < config.min_proxy_pixels {
        scale = config.min_proxy_pixels / pixels_per_unit;
    }

    // Pull the quad toward the eye by the unexpanded radius so it does not
    // sink into the surface the effect is attached to
    let to_origin = (origin - view.origin()).normalize_or_zero();
    let center = origin - to_origin * size;

    let half_extent = Vec2::new(scale, scale * aspect) * HALF_DIAGONAL;
    let right = view.right() * half_extent.x;
    let up = view.up() * half_extent.y;

    ProxyQuad {
        center,
        corners: [
            center - right - up,
            center - right + up,
            center + right + up,
            center + right - up,
        ],
    }
}

/// Fraction of the corners' screen-space bounding rectangle that lies
/// inside the [-1, 1] viewport.
///
/// # Returns
///
/// `None` when the quad is entirely off-screen or behind the eye,
/// otherwise a fraction in (0, 1].
pub fn screen_clip_fraction(view_projection: &Mat4, corners: &[Vec3; 4]) -> Option<f32> {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    let mut any_in_front = false;

    for corner in corners {
        let clip = *view_projection * corner.extend(1.0);
        let screen = if clip.w >= BEHIND_EYE_W {
            any_in_front = true;
            Vec2::new(clip.x, clip.y) / clip.w
        } else {
            Vec2::new(clip.x, clip.y) * BEHIND_EYE_SCALE
        };
        min = min.min(screen);
        max = max.max(screen);
    }

    if !any_in_front {
        return None;
    }

    let extent = max - min;
    let total_area = extent.x * extent.y;
    if !(total_area > 0.0) {
        return None;
    }

    let clipped = (max.min(Vec2::ONE) - min.max(Vec2::NEG_ONE)).max(Vec2::ZERO);
    let clipped_area = clipped.x * clipped.y;
    if clipped_area <= 0.0 {
        return None;
    }

    Some((clipped_area / total_area).min(1.0))
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
