//! World entities
//!
//! Every entity implements [`Actor`] (update + draw + lifecycle). The renderer
//! stores them as the closed [`Entity`] union, so singleton kinds such as the
//! player are found through typed handles instead of runtime type checks.

pub mod enemy;
pub mod gate;
pub mod player;

pub use enemy::Enemy;
pub use gate::{Gate, GateKind};
pub use player::{BlobFate, Player, SwarmBlob};

use glam::{Vec2, Vec3};

use crate::assets::{Assets, Sprite};
use crate::renderer::projection::{CameraPose, ScreenRect, depth_size_scale, project};
use crate::renderer::surface::Surface;
use crate::settings::{Settings, ShadeSettings};

/// Stable, monotonically increasing entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Anything further than this behind the camera is discarded
pub const BEHIND_CAMERA_MARGIN: f32 = 50.0;

/// Per-frame inputs to `Actor::update`
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext {
    /// Seconds since the previous tick (already capped)
    pub dt: f32,
    /// Lateral steering, -1 (left) .. 1 (right)
    pub steer: f32,
    /// World Z the run advanced this tick
    pub advance: f32,
    /// Camera Z from the previous frame
    pub camera_z: f32,
    /// Seconds since the run started
    pub time: f32,
}

/// Per-frame inputs to `Actor::draw`; one pose shared by every draw call
pub struct DrawContext<'a> {
    pub pose: CameraPose,
    pub center: Vec2,
    pub assets: &'a Assets,
    pub settings: &'a Settings,
}

/// Capability contract shared by all entities
pub trait Actor {
    fn id(&self) -> EntityId;

    /// World position used for ordering and collisions
    fn position(&self) -> Vec3;

    fn update(&mut self, ctx: &UpdateContext, settings: &Settings);

    fn draw(&self, surface: &mut dyn Surface, ctx: &DrawContext);

    fn is_marked_for_deletion(&self) -> bool;

    fn mark_for_deletion(&mut self);
}

/// Entity kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Gate,
    Enemy,
}

/// Closed set of entity kinds owned by the renderer
#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    Gate(Gate),
    Enemy(Enemy),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Player(_) => EntityKind::Player,
            Entity::Gate(_) => EntityKind::Gate,
            Entity::Enemy(_) => EntityKind::Enemy,
        }
    }

    pub fn actor(&self) -> &dyn Actor {
        match self {
            Entity::Player(p) => p,
            Entity::Gate(g) => g,
            Entity::Enemy(e) => e,
        }
    }

    pub fn actor_mut(&mut self) -> &mut dyn Actor {
        match self {
            Entity::Player(p) => p,
            Entity::Gate(g) => g,
            Entity::Enemy(e) => e,
        }
    }

    pub fn id(&self) -> EntityId {
        self.actor().id()
    }

    pub fn position(&self) -> Vec3 {
        self.actor().position()
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.actor().is_marked_for_deletion()
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Entity::Gate(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_gate_mut(&mut self) -> Option<&mut Gate> {
        match self {
            Entity::Gate(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match self {
            Entity::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match self {
            Entity::Enemy(e) => Some(e),
            _ => None,
        }
    }
}

/// Screen rectangle (relative to view center) of a sprite standing on `anchor`
///
/// `world_height` is the sprite's height in world units; width follows the
/// sprite's aspect ratio. Shared by drawing and screen-space collision so both
/// see the same geometry.
pub fn sprite_rect(
    anchor: Vec3,
    world_height: f32,
    sprite: &Sprite,
    pose: &CameraPose,
    shade: &ShadeSettings,
) -> Option<ScreenRect> {
    let p = project(anchor, pose);
    if !p.in_front() {
        return None;
    }
    let h = world_height * p.scale * depth_size_scale(p.depth, shade);
    let aspect = sprite.width() as f32 / sprite.height() as f32;
    let rect = ScreenRect::bottom_centered(p.offset(), Vec2::new(h * aspect, h));
    (!rect.is_empty()).then_some(rect)
}

/// True once `z` has dropped far enough behind the camera
#[inline]
pub fn behind_camera(z: f32, camera_z: f32) -> bool {
    z < camera_z - BEHIND_CAMERA_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::Rgba;

    fn pose() -> CameraPose {
        CameraPose {
            x: 0.0,
            y: 280.0,
            z: -133.0,
            angle_degrees: 15.0,
        }
    }

    #[test]
    fn test_sprite_rect_shrinks_with_distance() {
        let sprite = Sprite::disc(16, Rgba::WHITE);
        let shade = ShadeSettings::default();
        let near = sprite_rect(Vec3::new(0.0, 0.0, 100.0), 40.0, &sprite, &pose(), &shade).unwrap();
        let far = sprite_rect(Vec3::new(0.0, 0.0, 1500.0), 40.0, &sprite, &pose(), &shade).unwrap();
        assert!(far.h < near.h);
        assert!((near.w - near.h).abs() < 1e-3);
    }

    #[test]
    fn test_sprite_rect_behind_camera() {
        let sprite = Sprite::disc(16, Rgba::WHITE);
        let shade = ShadeSettings::default();
        assert!(sprite_rect(Vec3::new(0.0, 0.0, -500.0), 40.0, &sprite, &pose(), &shade).is_none());
    }

    #[test]
    fn test_behind_camera() {
        assert!(!behind_camera(0.0, 0.0));
        assert!(behind_camera(-51.0, 0.0));
    }
}
