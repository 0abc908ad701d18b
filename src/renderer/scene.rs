//! Scene renderer
//!
//! Owns the live entity set and draws one frame in strictly sequential
//! phases: clear, purge, background (wallpaper then track), depth-sorted
//! entities. The track never takes part in the depth sort; it is always
//! painted underneath everything dynamic.

use std::cmp::Reverse;

use glam::Vec2;

use super::camera::Camera;
use super::color::{Rgba, palette};
use super::projection::ScreenRect;
use super::surface::Surface;
use super::track::Track;
use crate::assets::{Assets, SpriteId};
use crate::consts::DEPTH_SORT_EPSILON;
use crate::entity::{DrawContext, Entity, EntityId, Player};
use crate::lerp;
use crate::settings::Settings;

/// Number of bands in the fallback wallpaper gradient
const WALLPAPER_BANDS: u32 = 24;

/// Painter's order for `(z, tie_id)` keys: farthest first
///
/// Z is bucketed by [`DEPTH_SORT_EPSILON`]; keys in the same bucket fall back
/// to ascending `tie_id`. The key is a total order, so the result is stable
/// across frames for identical input.
pub fn depth_order(keys: &[(f32, u64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by_key(|&i| {
        let (z, id) = keys[i];
        (Reverse(depth_bucket(z)), id)
    });
    order
}

#[inline]
fn depth_bucket(z: f32) -> i64 {
    (z / DEPTH_SORT_EPSILON).floor() as i64
}

pub struct Renderer {
    entities: Vec<Entity>,
    next_id: u32,
    player: Option<EntityId>,
    track: Track,
    background: Rgba,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
            player: None,
            track: Track::new(),
            background: palette::BACKGROUND,
        }
    }

    /// Allocate the next entity id
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Take ownership of an entity built with an id from [`Renderer::next_id`]
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        if matches!(entity, Entity::Player(_)) {
            if let Some(old) = self.player.replace(id) {
                log::warn!("Replacing player {} with {}", old.0, id.0);
                self.remove_entity(old);
            }
        }
        self.entities.push(entity);
        id
    }

    /// Allocate an id and add the entity built from it
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = self.next_id();
        self.add_entity(build(id))
    }

    /// Remove immediately; only call between frames
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        if self.player == Some(id) {
            self.player = None;
        }
        Some(self.entities.remove(index))
    }

    /// Drop every entity marked for deletion
    pub fn purge(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !e.is_marked_for_deletion());
        if let Some(id) = self.player {
            if !self.entities.iter().any(|e| e.id() == id) {
                self.player = None;
            }
        }
        before - self.entities.len()
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Player> {
        let id = self.player?;
        self.entity(id).and_then(Entity::as_player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        let id = self.player?;
        self.entity_mut(id).and_then(Entity::as_player_mut)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Two distinct entities borrowed mutably at once
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a == b {
            return None;
        }
        let ia = self.entities.iter().position(|e| e.id() == a)?;
        let ib = self.entities.iter().position(|e| e.id() == b)?;
        if ia < ib {
            let (lo, hi) = self.entities.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.entities.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    /// Drop every entity and reset the track; ids keep counting up
    pub fn reset(&mut self) {
        self.entities.clear();
        self.player = None;
        self.track.reset();
    }

    /// Entity indices in painter's order
    pub fn draw_order(&self) -> Vec<usize> {
        let keys: Vec<(f32, u64)> = self
            .entities
            .iter()
            .map(|e| (e.position().z, e.id().0 as u64))
            .collect();
        depth_order(&keys)
    }

    /// Draw one frame
    pub fn render(&mut self, surface: &mut dyn Surface, camera: &Camera, assets: &Assets, settings: &Settings) {
        // One pose for every draw call this frame
        let pose = camera.pose();

        surface.clear(self.background);
        self.purge();

        self.draw_wallpaper(surface, assets);
        self.track.draw(surface, &pose, settings);

        let ctx = DrawContext {
            pose,
            center: surface.center(),
            assets,
            settings,
        };
        for i in self.draw_order() {
            self.entities[i].actor().draw(surface, &ctx);
        }
    }

    fn draw_wallpaper(&self, surface: &mut dyn Surface, assets: &Assets) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        if let Some(sprite) = assets.sprite(SpriteId::Wallpaper) {
            surface.draw_sprite(sprite, ScreenRect::new(0.0, 0.0, w, h), 1.0, 1.0);
            return;
        }

        let band = h / WALLPAPER_BANDS as f32;
        for i in 0..WALLPAPER_BANDS {
            let t = i as f32 / (WALLPAPER_BANDS - 1) as f32;
            let (top, bottom) = (palette::WALLPAPER_TOP, palette::WALLPAPER_BOTTOM);
            let mix = |a: u8, b: u8| lerp(a as f32, b as f32, t).round() as u8;
            let color = Rgba::rgb(mix(top.r, bottom.r), mix(top.g, bottom.g), mix(top.b, bottom.b));
            let y = i as f32 * band;
            surface.fill_rect(ScreenRect::from_corners(Vec2::new(0.0, y), Vec2::new(w, y + band)), color);
        }
    }
}
