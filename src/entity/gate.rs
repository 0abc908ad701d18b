//! Numeric gates
//!
//! A gate is a world-space panel that adds to or multiplies the blob count.
//! Collision is a world-space box test around the gate, swept along the
//! player's last step and independent of the camera. A gate fires at most
//! once: `consumed` only ever flips false → true.

use glam::{Vec2, Vec3};

use super::{Actor, DrawContext, EntityId, Player, UpdateContext, behind_camera};
use crate::consts::GROUND_Y;
use crate::renderer::color::Rgba;
use crate::renderer::projection::{ScreenRect, depth_shade, project};
use crate::renderer::surface::Surface;
use crate::settings::{GateSettings, Settings};
use crate::sim::collision::world_box_swept;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Adds `floor(value)` (may be negative)
    Add,
    /// Multiplies by `value`, floored
    Multiply,
}

#[derive(Debug, Clone)]
pub struct Gate {
    id: EntityId,
    pos: Vec3,
    kind: GateKind,
    value: f32,
    /// Gates spawned side by side share a row; one choice per row
    row: u32,
    half_width: f32,
    depth: f32,
    consumed: bool,
    marked_for_deletion: bool,
}

impl Gate {
    pub fn new(id: EntityId, pos: Vec3, kind: GateKind, value: f32, row: u32, cfg: &GateSettings) -> Self {
        Self {
            id,
            pos,
            kind,
            value,
            row,
            half_width: cfg.half_width,
            depth: cfg.depth,
            consumed: false,
            marked_for_deletion: false,
        }
    }

    /// Override the collision footprint
    pub fn with_extent(mut self, half_width: f32, depth: f32) -> Self {
        self.half_width = half_width;
        self.depth = depth;
        self
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.depth / 2.0)
    }

    /// Did a point moving along `from -> to` cross the gate?
    fn crossed(&self, from: Vec3, to: Vec3) -> bool {
        world_box_swept(self.pos, self.half_extents(), from, to)
    }

    /// Does the player touch this gate?
    ///
    /// Tests the path the swarm center took during the last update, then
    /// any live blob along the same travel, so a fast tick cannot skip a
    /// gate. Consumed gates never collide again.
    pub fn check_collision(&self, player: &Player) -> bool {
        if self.consumed {
            return false;
        }
        let (from, to) = player.center_path();
        if self.crossed(from, to) {
            return true;
        }
        let travel = player.travel();
        player.live_blobs().any(|(_, p)| self.crossed(p - travel, p))
    }

    /// Apply the gate to the player once; returns false if already consumed
    pub fn apply_effect(&mut self, player: &mut Player) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        let before = player.blob_count();
        match self.kind {
            GateKind::Add => player.add_blobs(self.value.floor() as i64),
            GateKind::Multiply => player.multiply_blobs(self.value),
        }
        log::debug!(
            "Gate {} ({}) consumed: {} -> {} blobs",
            self.id.0,
            self.label(),
            before,
            player.blob_count()
        );
        true
    }

    /// Retire the gate without applying it (its row was chosen elsewhere)
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Text shown on the panel
    pub fn label(&self) -> String {
        match self.kind {
            GateKind::Add => {
                let v = self.value.floor() as i64;
                if v < 0 { format!("-{}", -v) } else { format!("+{}", v) }
            }
            GateKind::Multiply => {
                if self.value.fract() == 0.0 {
                    format!("x{}", self.value as i64)
                } else {
                    format!("x{:.1}", self.value)
                }
            }
        }
    }

    pub fn color(&self, cfg: &GateSettings) -> Rgba {
        match self.kind {
            GateKind::Add if self.value < 0.0 => cfg.subtract_color,
            GateKind::Add => cfg.add_color,
            GateKind::Multiply if self.value < 1.0 => cfg.subtract_color,
            GateKind::Multiply => cfg.multiply_color,
        }
    }
}

impl Actor for Gate {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn update(&mut self, ctx: &UpdateContext, _settings: &Settings) {
        if self.consumed || behind_camera(self.pos.z, ctx.camera_z) {
            self.marked_for_deletion = true;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        if self.consumed {
            return;
        }
        let cfg = &ctx.settings.gates;
        let base = project(Vec3::new(self.pos.x - self.half_width, GROUND_Y, self.pos.z), &ctx.pose);
        if !base.in_front() {
            return;
        }
        let top = project(
            Vec3::new(self.pos.x + self.half_width, GROUND_Y + cfg.panel_height, self.pos.z),
            &ctx.pose,
        );
        let rect = ScreenRect::from_corners(base.on_surface(ctx.center), top.on_surface(ctx.center));
        if rect.is_empty() {
            return;
        }

        let color = depth_shade(self.color(cfg), base.depth, &ctx.settings.shading);
        surface.fill_rect(rect, color.with_alpha(cfg.opacity));
        surface.stroke_rect(rect, (rect.w * 0.04).max(1.0), color);

        let label = self.label();
        let cell = rect.h * 0.5 / crate::renderer::shapes::GLYPH_H as f32;
        let label_color = depth_shade(cfg.label_color, base.depth, &ctx.settings.shading);
        let center = Vec2::new(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0);
        surface.draw_text(&label, center, cell, label_color);
    }

    fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }
}
