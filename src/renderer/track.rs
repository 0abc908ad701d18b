//! Track: recycled distance markers and lane lines
//!
//! Markers are bare Z values in a FIFO. Once seeded the queue length never
//! changes: every eviction at the near end is paired with exactly one push at
//! the far end, `interval` past the last pushed marker.

use std::collections::VecDeque;

use glam::{Vec2, Vec3};

use super::color::Rgba;
use super::projection::{CameraPose, depth_shade, depth_size_scale, project};
use super::surface::Surface;
use crate::consts::GROUND_Y;
use crate::settings::Settings;

/// Seeding state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Uninitialized,
    Running,
}

#[derive(Debug, Clone)]
pub struct Track {
    state: TrackState,
    markers: VecDeque<f32>,
    last_pushed: f32,
    /// Total markers recycled since the last reset
    recycled: u64,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self {
            state: TrackState::Uninitialized,
            markers: VecDeque::new(),
            last_pushed: 0.0,
            recycled: 0,
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn markers(&self) -> impl Iterator<Item = f32> + '_ {
        self.markers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    /// Back to uninitialized; the next update reseeds around the reference
    pub fn reset(&mut self) {
        self.state = TrackState::Uninitialized;
        self.markers.clear();
        self.last_pushed = 0.0;
        self.recycled = 0;
    }

    /// Advance against the reference position (player Z)
    ///
    /// A non-finite reference is ignored; recycling toward it would never end.
    pub fn update(&mut self, reference_z: f32, settings: &Settings) {
        if !reference_z.is_finite() {
            log::warn!("Ignoring non-finite track reference z={}", reference_z);
            return;
        }
        let cfg = &settings.track;
        let interval = cfg.marker_interval.max(1.0);

        if self.state == TrackState::Uninitialized {
            self.seed(reference_z, interval, cfg.marker_count, cfg.seed_behind);
            return;
        }

        let mut moved = 0;
        while let Some(&oldest) = self.markers.front() {
            if reference_z - oldest <= cfg.cleanup_distance {
                break;
            }
            // A whole lap was not enough, the reference jumped: lay the queue out again
            if moved as usize == self.markers.len() {
                self.recycled += moved;
                self.seed(reference_z, interval, cfg.marker_count, cfg.seed_behind);
                return;
            }
            self.markers.pop_front();
            self.last_pushed += interval;
            self.markers.push_back(self.last_pushed);
            moved += 1;
        }
        if moved > 0 {
            self.recycled += moved;
            log::debug!("Recycled {} marker(s), far end at z={}", moved, self.last_pushed);
        }
    }

    fn seed(&mut self, reference_z: f32, interval: f32, count: usize, behind: usize) {
        let aligned = (reference_z / interval).floor() * interval;
        let start = aligned - behind as f32 * interval;

        self.markers.clear();
        self.markers.extend((0..count).map(|i| start + i as f32 * interval));
        self.last_pushed = self.markers.back().copied().unwrap_or(start);
        self.state = TrackState::Running;

        log::debug!(
            "Track seeded: {} markers from z={} every {}",
            count,
            start,
            interval
        );
    }

    /// Background layer: lane lines, then markers farthest to nearest
    pub fn draw(&self, surface: &mut dyn Surface, pose: &CameraPose, settings: &Settings) {
        let cfg = &settings.track;
        let center = surface.center();

        self.draw_lane_lines(surface, pose, settings, center);

        for &z in self.markers.iter().rev() {
            let left = project(Vec3::new(-cfg.half_width, GROUND_Y, z), pose);
            let right = project(Vec3::new(cfg.half_width, GROUND_Y, z), pose);
            if !left.in_front() {
                continue;
            }

            let size = depth_size_scale(left.depth, &settings.shading);
            let width = (cfg.marker_width * left.scale * size).max(1.0);
            let color = depth_shade(cfg.marker_color, left.depth, &settings.shading);
            let (a, b) = (left.on_surface(center), right.on_surface(center));

            if cfg.glow > 0.0 {
                surface.draw_line(a, b, width + cfg.glow * left.scale * size, color.with_alpha(0.25));
            }
            surface.draw_line(a, b, width, color);
        }
    }

    /// Longitudinal lines at both edges and between the two lanes
    fn draw_lane_lines(&self, surface: &mut dyn Surface, pose: &CameraPose, settings: &Settings, center: Vec2) {
        let cfg = &settings.track;
        // Start a little in front of the camera so the near end stays finite
        let near_z = pose.z + 10.0;
        let far_z = pose.z + cfg.lane_line_far_z;

        for x in [-cfg.half_width, 0.0, cfg.half_width] {
            let near = project(Vec3::new(x, GROUND_Y, near_z), pose);
            let far = project(Vec3::new(x, GROUND_Y, far_z), pose);
            let color: Rgba = depth_shade(cfg.lane_color, cfg.lane_line_far_z * 0.5, &settings.shading);
            surface.draw_line(near.on_surface(center), far.on_surface(center), 2.0, color);
        }
    }
}
