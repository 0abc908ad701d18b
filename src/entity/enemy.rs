//! Enemies
//!
//! An enemy drifts toward the camera and pops one swarm blob on contact.
//! Contact is decided in screen space from the projected sprite rectangles,
//! so it needs both sprites loaded; until then nothing ever collides.

use glam::Vec3;

use super::{Actor, DrawContext, EntityId, Player, UpdateContext, behind_camera, sprite_rect};
use crate::assets::{Assets, SpriteId};
use crate::progress;
use crate::renderer::projection::{CameraPose, depth_brightness};
use crate::renderer::surface::Surface;
use crate::settings::Settings;
use crate::sim::collision::sprites_collide;

/// Seconds a neutralized enemy takes to fade away
const NEUTRALIZED_FADE: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct Enemy {
    id: EntityId,
    pos: Vec3,
    /// Half extent in world units; sprites are drawn `2 * size` tall
    size: f32,
    /// Approach speed toward the camera (world units per second)
    speed: f32,
    neutralized: bool,
    neutralized_for: f32,
    marked_for_deletion: bool,
}

impl Enemy {
    pub fn new(id: EntityId, pos: Vec3, size: f32, speed: f32) -> Self {
        Self {
            id,
            pos,
            size,
            speed,
            neutralized: false,
            neutralized_for: 0.0,
            marked_for_deletion: false,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_neutralized(&self) -> bool {
        self.neutralized
    }

    /// Irrevocable; calling it again changes nothing
    pub fn neutralize(&mut self) {
        if !self.neutralized {
            self.neutralized = true;
            log::debug!("Enemy {} neutralized at z={:.0}", self.id.0, self.pos.z);
        }
    }

    /// Index of the first live swarm blob this enemy touches on screen
    ///
    /// `None` once neutralized, when either sprite is not ready, or when the
    /// enemy is not in front of the camera.
    pub fn check_blob_collision(
        &self,
        player: &Player,
        pose: &CameraPose,
        assets: &Assets,
        settings: &Settings,
    ) -> Option<usize> {
        if self.neutralized {
            return None;
        }
        let enemy_sprite = assets.sprite(SpriteId::Enemy)?;
        let blob_sprite = assets.sprite(SpriteId::Blob)?;
        let shade = &settings.shading;
        let enemy_rect = sprite_rect(self.pos, self.size * 2.0, enemy_sprite, pose, shade)?;

        player.live_blobs().find_map(|(i, p)| {
            let blob = &player.swarm()[i];
            let height = settings.swarm.blob_radius * 2.0 * blob.size_multiplier;
            let blob_rect = sprite_rect(p, height, blob_sprite, pose, shade)?;
            sprites_collide(enemy_sprite, enemy_rect, blob_sprite, blob_rect, &settings.collision).then_some(i)
        })
    }

    fn opacity(&self) -> f32 {
        if self.neutralized {
            1.0 - progress(self.neutralized_for, 0.0, NEUTRALIZED_FADE)
        } else {
            1.0
        }
    }
}

impl Actor for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn update(&mut self, ctx: &UpdateContext, _settings: &Settings) {
        if self.neutralized {
            self.neutralized_for += ctx.dt;
            if self.neutralized_for >= NEUTRALIZED_FADE {
                self.marked_for_deletion = true;
            }
        } else {
            self.pos.z -= self.speed * ctx.dt;
        }
        if behind_camera(self.pos.z, ctx.camera_z) {
            self.marked_for_deletion = true;
        }
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        let Some(sprite) = ctx.assets.sprite(SpriteId::Enemy) else {
            return;
        };
        let opacity = self.opacity();
        if opacity <= 0.0 {
            return;
        }
        let shade = &ctx.settings.shading;
        let Some(rect) = sprite_rect(self.pos, self.size * 2.0, sprite, &ctx.pose, shade) else {
            return;
        };
        let brightness = depth_brightness(self.pos.z - ctx.pose.z, shade);
        surface.draw_sprite(sprite, rect.translate(ctx.center), opacity, brightness);
    }

    fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::palette;
    use crate::renderer::camera::Camera;

    struct Fixture {
        player: Player,
        settings: Settings,
        assets: Assets,
        pose: CameraPose,
    }

    fn fixture(count: u32) -> Fixture {
        let mut settings = Settings::default();
        settings.swarm.starting_blobs = count;
        let player = Player::new(EntityId(1), Vec3::ZERO, &settings, 11);
        let mut camera = Camera::new(&settings.camera);
        camera.follow_target(player.center());
        Fixture {
            player,
            assets: Assets::procedural(palette::BLOB, palette::ENEMY),
            pose: camera.pose(),
            settings,
        }
    }

    fn ctx(dt: f32, camera_z: f32) -> UpdateContext {
        UpdateContext {
            dt,
            steer: 0.0,
            advance: 0.0,
            camera_z,
            time: 0.0,
        }
    }

    #[test]
    fn test_overlapping_enemy_hits_a_blob() {
        let f = fixture(5);
        let enemy = Enemy::new(EntityId(2), Vec3::ZERO, 22.0, 60.0);
        let hit = enemy.check_blob_collision(&f.player, &f.pose, &f.assets, &f.settings);
        assert!(hit.is_some());
    }

    #[test]
    fn test_distant_enemy_misses() {
        let f = fixture(5);
        let enemy = Enemy::new(EntityId(2), Vec3::new(0.0, 0.0, 2000.0), 22.0, 60.0);
        assert_eq!(enemy.check_blob_collision(&f.player, &f.pose, &f.assets, &f.settings), None);

        let off_lane = Enemy::new(EntityId(3), Vec3::new(140.0, 0.0, 0.0), 22.0, 60.0);
        assert_eq!(off_lane.check_blob_collision(&f.player, &f.pose, &f.assets, &f.settings), None);
    }

    #[test]
    fn test_missing_sprites_never_collide() {
        let f = fixture(5);
        let enemy = Enemy::new(EntityId(2), Vec3::ZERO, 22.0, 60.0);
        let loading = Assets::new();
        assert_eq!(enemy.check_blob_collision(&f.player, &f.pose, &loading, &f.settings), None);
    }

    #[test]
    fn test_neutralized_enemy_kills_once() {
        let mut f = fixture(5);
        let mut enemy = Enemy::new(EntityId(2), Vec3::ZERO, 22.0, 60.0);

        let mut deaths = 0;
        for _ in 0..5 {
            if let Some(i) = enemy.check_blob_collision(&f.player, &f.pose, &f.assets, &f.settings) {
                enemy.neutralize();
                if f.player.kill_blob(i) {
                    deaths += 1;
                }
            }
        }
        assert!(enemy.is_neutralized());
        assert_eq!(deaths, 1);
        assert_eq!(f.player.dying_blobs(), 1);

        enemy.neutralize();
        assert!(enemy.is_neutralized());
    }

    #[test]
    fn test_approaches_then_leaves() {
        let settings = Settings::default();
        let mut enemy = Enemy::new(EntityId(2), Vec3::new(0.0, 0.0, 100.0), 22.0, 50.0);
        enemy.update(&ctx(1.0, -320.0), &settings);
        assert_eq!(enemy.position().z, 50.0);
        assert!(!enemy.is_marked_for_deletion());

        enemy.update(&ctx(1.0, 200.0), &settings);
        assert!(enemy.is_marked_for_deletion());
    }

    #[test]
    fn test_neutralized_enemy_fades_out() {
        let settings = Settings::default();
        let mut enemy = Enemy::new(EntityId(2), Vec3::new(0.0, 0.0, 100.0), 22.0, 50.0);
        enemy.neutralize();
        enemy.update(&ctx(0.1, -320.0), &settings);
        assert_eq!(enemy.position().z, 100.0);
        assert!(!enemy.is_marked_for_deletion());
        enemy.update(&ctx(0.5, -320.0), &settings);
        assert!(enemy.is_marked_for_deletion());
    }
}
