//! World → screen perspective projection
//!
//! A hand-rolled pitched camera: translate into camera space, rotate the
//! (y, z) plane by the pitch, then divide by depth. Screen coordinates are
//! relative to the view center with Y growing downward.
//!
//! Camera space is Y-down: `rel_y = cam.y - y`, so a point below the camera
//! has positive `rel_y`, and `screen_y = rotated_y * scale` lands it lower on
//! screen.

use glam::{Vec2, Vec3};

use crate::consts::{MIN_EFFECTIVE_Z, MIN_SIZE_SCALE, PROJECTION_DISTANCE};
use crate::renderer::color::Rgba;
use crate::settings::ShadeSettings;

/// Immutable camera snapshot for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Downward pitch in degrees
    pub angle_degrees: f32,
}

impl CameraPose {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Result of projecting one world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal offset from view center (pixels)
    pub screen_x: f32,
    /// Vertical offset from view center (pixels, down is positive)
    pub screen_y: f32,
    /// Camera-relative Z (`world_z - camera_z`), for ordering only
    pub depth: f32,
    /// Perspective scale factor, always positive
    pub scale: f32,
}

impl ProjectedPoint {
    /// Offset from view center
    #[inline]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.screen_y)
    }

    /// Absolute surface position given the view center
    #[inline]
    pub fn on_surface(&self, center: Vec2) -> Vec2 {
        center + self.offset()
    }

    /// True when the point sits in front of the camera plane
    #[inline]
    pub fn in_front(&self) -> bool {
        self.depth > MIN_EFFECTIVE_Z
    }
}

/// Project a world point through the camera pose
pub fn project(point: Vec3, cam: &CameraPose) -> ProjectedPoint {
    let rel_x = point.x - cam.x;
    let rel_y = -(point.y - cam.y);
    let rel_z = point.z - cam.z;

    let (sin, cos) = cam.angle_degrees.to_radians().sin_cos();
    let rotated_y = rel_y * cos - rel_z * sin;
    let rotated_z = rel_y * sin + rel_z * cos;

    let effective_z = rotated_z.max(MIN_EFFECTIVE_Z);
    let scale = PROJECTION_DISTANCE / effective_z;

    ProjectedPoint {
        screen_x: rel_x * scale,
        screen_y: rotated_y * scale,
        depth: rel_z,
        scale,
    }
}

/// Size multiplier for a camera-relative depth
///
/// Linear falloff from 1.0 at depth 0 to `1 - size_falloff` at `max_depth`,
/// floored at `size_floor` and never below 10%.
pub fn depth_size_scale(depth: f32, shade: &ShadeSettings) -> f32 {
    let floor = shade.size_floor.max(MIN_SIZE_SCALE);
    if shade.max_depth <= 0.0 {
        return 1.0_f32.max(floor);
    }
    let t = depth.max(0.0) / shade.max_depth;
    (1.0 - t * shade.size_falloff).max(floor)
}

/// Brightness factor for a depth: 1.0 up close, `1 - intensity` at `max_depth`
pub fn depth_brightness(depth: f32, shade: &ShadeSettings) -> f32 {
    if !shade.depth_shading || shade.max_depth <= 0.0 {
        return 1.0;
    }
    let t = (depth.max(0.0) / shade.max_depth).min(1.0);
    1.0 - t * shade.intensity.clamp(0.0, 1.0)
}

/// Darken `base` toward black as depth grows
///
/// Returns `base` untouched when depth shading is disabled.
pub fn depth_shade(base: Rgba, depth: f32, shade: &ShadeSettings) -> Rgba {
    base.darken(depth_brightness(depth, shade))
}

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `size` whose bottom edge is centered on `anchor`
    pub fn bottom_centered(anchor: Vec2, size: Vec2) -> Self {
        Self::new(anchor.x - size.x / 2.0, anchor.y - size.y, size.x, size.y)
    }

    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    /// Build from two opposite corners in any order
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Overlapping region, if any
    pub fn intersect(&self, other: &ScreenRect) -> Option<ScreenRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(ScreenRect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    pub fn translate(&self, by: Vec2) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }
}
