//! Collision predicates
//!
//! Two flavours: a world-space box test (gates) and a screen-space test on
//! projected sprite rectangles (enemies), optionally refined by sampling both
//! sprites' alpha channels inside the overlap.

use glam::{Vec2, Vec3};

use crate::assets::Sprite;
use crate::renderer::projection::ScreenRect;
use crate::settings::CollisionSettings;

/// Axis-aligned box test on the ground plane
///
/// `half_extents.x` is the lateral half-width, `half_extents.y` the half
/// depth along Z. Height is ignored. Edges count as inside.
pub fn world_box_contains(center: Vec3, half_extents: Vec2, point: Vec3) -> bool {
    (point.x - center.x).abs() <= half_extents.x && (point.z - center.z).abs() <= half_extents.y
}

/// Does the ground-plane segment `from -> to` pass through the box?
///
/// Same box as [`world_box_contains`]. Used for anything that may travel
/// further than the box is deep in a single tick. Non-finite endpoints never
/// hit.
pub fn world_box_swept(center: Vec3, half_extents: Vec2, from: Vec3, to: Vec3) -> bool {
    if !from.is_finite() || !to.is_finite() {
        return false;
    }
    if world_box_contains(center, half_extents, to) {
        return true;
    }
    let lo = Vec2::new(center.x, center.z) - half_extents;
    let hi = Vec2::new(center.x, center.z) + half_extents;
    let start = Vec2::new(from.x, from.z);
    let delta = Vec2::new(to.x, to.z) - start;

    let (mut t_enter, mut t_exit) = (0.0f32, 1.0f32);
    for axis in 0..2 {
        if delta[axis] == 0.0 {
            if start[axis] < lo[axis] || start[axis] > hi[axis] {
                return false;
            }
            continue;
        }
        let a = (lo[axis] - start[axis]) / delta[axis];
        let b = (hi[axis] - start[axis]) / delta[axis];
        t_enter = t_enter.max(a.min(b));
        t_exit = t_exit.min(a.max(b));
        if t_enter > t_exit {
            return false;
        }
    }
    true
}

/// Do two sprites, drawn into their screen rectangles, touch?
///
/// Rectangle overlap is always required. With `pixel_mask` enabled the
/// overlap is sampled every `mask_stride` pixels and a hit needs both
/// sprites opaque at the same sample.
pub fn sprites_collide(
    a: &Sprite,
    a_rect: ScreenRect,
    b: &Sprite,
    b_rect: ScreenRect,
    cfg: &CollisionSettings,
) -> bool {
    let Some(overlap) = a_rect.intersect(&b_rect) else {
        return false;
    };
    if !cfg.pixel_mask {
        return true;
    }
    pixel_mask_overlap(a, a_rect, b, b_rect, overlap, cfg.mask_stride, cfg.alpha_threshold)
}

/// Sample both alpha masks over `overlap`
pub fn pixel_mask_overlap(
    a: &Sprite,
    a_rect: ScreenRect,
    b: &Sprite,
    b_rect: ScreenRect,
    overlap: ScreenRect,
    stride: u32,
    threshold: u8,
) -> bool {
    let step = stride.max(1) as f32;
    let threshold = threshold.max(1);

    let mut y = overlap.y + 0.5;
    while y < overlap.bottom() {
        let va = (y - a_rect.y) / a_rect.h;
        let vb = (y - b_rect.y) / b_rect.h;
        let mut x = overlap.x + 0.5;
        while x < overlap.right() {
            let ua = (x - a_rect.x) / a_rect.w;
            let ub = (x - b_rect.x) / b_rect.w;
            if a.alpha_at(ua, va) >= threshold && b.alpha_at(ub, vb) >= threshold {
                return true;
            }
            x += step;
        }
        y += step;
    }
    false
}
