//! The player's blob swarm
//!
//! The player owns a blob count and one visual [`SwarmBlob`] per counted
//! blob. Slot 0 is the center blob: zero offset, always drawn exactly at the
//! player position. Followers sit on a golden-angle spiral and chase their
//! slot with a lag, so they trail the player when it steers.
//!
//! `swarm.len() == blob_count` holds except while blobs are fading in or out:
//! dispersing blobs are extra and already uncounted, dying blobs are still
//! counted until they are spliced out.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Actor, DrawContext, EntityId, UpdateContext, sprite_rect};
use crate::assets::SpriteId;
use crate::consts::GROUND_Y;
use crate::progress;
use crate::renderer::projection::depth_brightness;
use crate::renderer::scene::depth_order;
use crate::renderer::surface::Surface;
use crate::settings::{Settings, SwarmSettings};

/// Golden angle in radians, spreads spiral slots evenly
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Lifecycle of a single blob
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlobFate {
    Alive,
    /// Hit by an enemy; removed (and uncounted) once the animation ends
    Dying { elapsed: f32 },
    /// Surplus after the count dropped; already uncounted, fades out
    Dispersing { elapsed: f32 },
}

/// One visual member of the swarm
#[derive(Debug, Clone)]
pub struct SwarmBlob {
    /// Target offset from the player position
    pub offset_x: f32,
    pub offset_z: f32,
    /// Lagged world position
    pub current_x: f32,
    pub current_z: f32,
    pub size_multiplier: f32,
    pub distance_from_center: f32,
    pub fate: BlobFate,
    /// Run time at which the blob appeared (for fade-in)
    pub spawn_time: f32,
    /// Spawn sequence number, breaks depth ties
    pub seq: u32,
}

impl SwarmBlob {
    pub fn is_dying(&self) -> bool {
        matches!(self.fate, BlobFate::Dying { .. })
    }

    pub fn is_dispersing(&self) -> bool {
        matches!(self.fate, BlobFate::Dispersing { .. })
    }

    /// Can still collide and be hit
    pub fn is_alive(&self) -> bool {
        self.fate == BlobFate::Alive
    }

    fn opacity(&self, now: f32, cfg: &SwarmSettings) -> f32 {
        let fade_in = if cfg.fade_in > 0.0 {
            progress(now - self.spawn_time, 0.0, cfg.fade_in)
        } else {
            1.0
        };
        match self.fate {
            BlobFate::Alive => fade_in,
            BlobFate::Dying { elapsed } => 1.0 - progress(elapsed, 0.0, cfg.death_duration),
            BlobFate::Dispersing { elapsed } => fade_in * (1.0 - progress(elapsed, 0.0, cfg.fade_in)),
        }
    }

    /// Dying blobs swell as they pop
    fn draw_scale(&self, cfg: &SwarmSettings) -> f32 {
        match self.fate {
            BlobFate::Dying { elapsed } => 1.0 + 0.8 * progress(elapsed, 0.0, cfg.death_duration),
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    pos: Vec3,
    /// Position before the last update, for swept collisions
    prev_pos: Vec3,
    blob_count: u32,
    max_blob_count: u32,
    swarm: Vec<SwarmBlob>,
    next_seq: u32,
    time: f32,
    rng: Pcg32,
    marked_for_deletion: bool,
}

impl Player {
    pub fn new(id: EntityId, pos: Vec3, settings: &Settings, seed: u64) -> Self {
        let cfg = &settings.swarm;
        let mut player = Self {
            id,
            pos,
            prev_pos: pos,
            blob_count: cfg.starting_blobs.min(cfg.max_blob_count),
            max_blob_count: cfg.max_blob_count,
            swarm: Vec::new(),
            next_seq: 0,
            time: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            marked_for_deletion: false,
        };
        // Starting blobs appear fully formed
        player.reconcile_swarm();
        for blob in &mut player.swarm {
            blob.spawn_time = -cfg.fade_in;
        }
        player.layout_swarm(cfg);
        player.snap_swarm();
        player
    }

    pub fn blob_count(&self) -> u32 {
        self.blob_count
    }

    pub fn is_defeated(&self) -> bool {
        self.blob_count == 0
    }

    pub fn set_blob_count(&mut self, count: u32) {
        self.blob_count = count.min(self.max_blob_count);
    }

    /// Add a signed delta; the count never drops below zero
    pub fn add_blobs(&mut self, delta: i64) {
        let next = (self.blob_count as i64).saturating_add(delta);
        self.blob_count = next.clamp(0, self.max_blob_count as i64) as u32;
    }

    /// Multiply and floor; the count never drops below zero
    pub fn multiply_blobs(&mut self, factor: f32) {
        let next = (self.blob_count as f64 * factor as f64).floor();
        self.blob_count = if next.is_nan() {
            0
        } else {
            next.clamp(0.0, self.max_blob_count as f64) as u32
        };
    }

    pub fn swarm(&self) -> &[SwarmBlob] {
        &self.swarm
    }

    /// Center reference point used by world-space collisions
    pub fn center(&self) -> Vec3 {
        self.pos
    }

    /// Teleport the player, swarm included; a teleport sweeps nothing
    pub fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
        self.prev_pos = pos;
        self.snap_swarm();
    }

    /// How far the player moved during the last update
    pub fn travel(&self) -> Vec3 {
        self.pos - self.prev_pos
    }

    /// Path of the center during the last update
    pub fn center_path(&self) -> (Vec3, Vec3) {
        (self.prev_pos, self.pos)
    }

    /// Indices and positions of blobs that can still be hit
    pub fn live_blobs(&self) -> impl Iterator<Item = (usize, Vec3)> + '_ {
        self.swarm
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_alive())
            .map(|(i, b)| (i, Vec3::new(b.current_x, self.pos.y, b.current_z)))
    }

    /// Start the death animation of one blob; false if it cannot die now
    pub fn kill_blob(&mut self, index: usize) -> bool {
        match self.swarm.get_mut(index) {
            Some(blob) if blob.is_alive() => {
                blob.fate = BlobFate::Dying { elapsed: 0.0 };
                true
            }
            _ => false,
        }
    }

    pub fn dying_blobs(&self) -> usize {
        self.swarm.iter().filter(|b| b.is_dying()).count()
    }

    /// Grow or shrink the swarm to match the count
    fn reconcile_swarm(&mut self) {
        let desired = self.blob_count as usize;
        let counted = self.swarm.iter().filter(|b| !b.is_dispersing()).count();

        if counted < desired {
            for _ in counted..desired {
                let seq = self.next_seq;
                self.next_seq += 1;
                let size_multiplier = self.rng.random_range(0.85..1.15);
                self.swarm.push(SwarmBlob {
                    offset_x: 0.0,
                    offset_z: 0.0,
                    current_x: self.pos.x,
                    current_z: self.pos.z,
                    size_multiplier,
                    distance_from_center: 0.0,
                    fate: BlobFate::Alive,
                    spawn_time: self.time,
                    seq,
                });
            }
        } else if counted > desired {
            let mut surplus = counted - desired;
            // The center is the first blob still counted, not necessarily index 0
            let center = self.swarm.iter().position(|b| !b.is_dispersing());
            // Youngest first; keep the center while anything is counted
            for i in (0..self.swarm.len()).rev() {
                if surplus == 0 {
                    break;
                }
                if Some(i) == center && desired > 0 {
                    continue;
                }
                if self.swarm[i].is_alive() {
                    self.swarm[i].fate = BlobFate::Dispersing { elapsed: 0.0 };
                    surplus -= 1;
                }
            }
            if surplus > 0 {
                log::debug!("{} dying blobs exceed the reduced count", surplus);
            }
        }
    }

    /// Assign spiral offsets by slot; slot 0 is the center
    fn layout_swarm(&mut self, cfg: &SwarmSettings) {
        let mut slot = 0usize;
        for blob in self.swarm.iter_mut().filter(|b| !b.is_dispersing()) {
            if slot == 0 {
                blob.offset_x = 0.0;
                blob.offset_z = 0.0;
                blob.distance_from_center = 0.0;
            } else {
                let d = cfg.spread * (slot as f32).sqrt();
                let angle = slot as f32 * GOLDEN_ANGLE;
                blob.offset_x = d * angle.cos();
                blob.offset_z = d * angle.sin() * cfg.depth_squash;
                blob.distance_from_center = d;
            }
            slot += 1;
        }
    }

    /// Jump every blob onto its target
    fn snap_swarm(&mut self) {
        for blob in &mut self.swarm {
            blob.current_x = self.pos.x + blob.offset_x;
            blob.current_z = self.pos.z + blob.offset_z;
        }
    }

    /// Advance fades and splice finished blobs
    fn advance_fates(&mut self, dt: f32, cfg: &SwarmSettings) {
        let mut died = 0u32;
        self.swarm.retain_mut(|blob| match &mut blob.fate {
            BlobFate::Alive => true,
            BlobFate::Dying { elapsed } => {
                *elapsed += dt;
                if *elapsed >= cfg.death_duration {
                    died += 1;
                    false
                } else {
                    true
                }
            }
            BlobFate::Dispersing { elapsed } => {
                *elapsed += dt;
                *elapsed < cfg.fade_in
            }
        });
        if died > 0 {
            self.add_blobs(-(died as i64));
            log::debug!("{} blob(s) lost, {} left", died, self.blob_count);
        }
    }

    /// Chase slot targets; the center snaps, dispersing blobs drift outward
    fn follow(&mut self, dt: f32, cfg: &SwarmSettings) {
        let t = 1.0 - (-cfg.follow_rate * dt).exp();
        let center_index = self.swarm.iter().position(|b| !b.is_dispersing());
        for (i, blob) in self.swarm.iter_mut().enumerate() {
            let spread = match blob.fate {
                BlobFate::Dispersing { elapsed } => 1.0 + elapsed * 6.0,
                _ => 1.0,
            };
            let target_x = self.pos.x + blob.offset_x * spread;
            let target_z = self.pos.z + blob.offset_z * spread;
            if Some(i) == center_index {
                blob.current_x = target_x;
                blob.current_z = target_z;
            } else {
                blob.current_x += (target_x - blob.current_x) * t;
                blob.current_z += (target_z - blob.current_z) * t;
            }
        }
    }
}

impl Actor for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn update(&mut self, ctx: &UpdateContext, settings: &Settings) {
        let cfg = &settings.swarm;
        self.time = ctx.time;
        self.prev_pos = self.pos;

        let limit = (settings.track.half_width - cfg.blob_radius).max(0.0);
        self.pos.x = (self.pos.x + ctx.steer.clamp(-1.0, 1.0) * cfg.lateral_speed * ctx.dt).clamp(-limit, limit);
        self.pos.z += ctx.advance;

        // The follow lag is relative to the player, carry the forward motion
        for blob in &mut self.swarm {
            blob.current_z += ctx.advance;
        }

        self.advance_fates(ctx.dt, cfg);
        self.reconcile_swarm();
        self.layout_swarm(cfg);
        self.follow(ctx.dt, cfg);
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &DrawContext) {
        let Some(sprite) = ctx.assets.sprite(SpriteId::Blob) else {
            return;
        };
        let cfg = &ctx.settings.swarm;
        let shade = &ctx.settings.shading;

        let keys: Vec<(f32, u64)> = self
            .swarm
            .iter()
            .map(|b| (b.current_z, b.seq as u64))
            .collect();

        for i in depth_order(&keys) {
            let blob = &self.swarm[i];
            let opacity = blob.opacity(self.time, cfg);
            if opacity <= 0.0 {
                continue;
            }
            let anchor = Vec3::new(blob.current_x, GROUND_Y.max(self.pos.y), blob.current_z);
            let height = cfg.blob_radius * 2.0 * blob.size_multiplier * blob.draw_scale(cfg);
            let Some(rect) = sprite_rect(anchor, height, sprite, &ctx.pose, shade) else {
                continue;
            };
            let brightness = depth_brightness(anchor.z - ctx.pose.z, shade);
            surface.draw_sprite(sprite, rect.translate(ctx.center), opacity, brightness);
        }
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

    fn player_with(count: u32) -> (Player, Settings) {
        let mut settings = Settings::default();
        settings.swarm.starting_blobs = count;
        (Player::new(EntityId(1), Vec3::ZERO, &settings, 7), settings)
    }

    fn ctx(dt: f32, time: f32) -> UpdateContext {
        UpdateContext {
            dt,
            steer: 0.0,
            advance: 0.0,
            camera_z: -133.0,
            time,
        }
    }

    #[test]
    fn test_starting_swarm_matches_count() {
        let (player, _) = player_with(5);
        assert_eq!(player.blob_count(), 5);
        assert_eq!(player.swarm().len(), 5);
        let center = &player.swarm()[0];
        assert_eq!(center.offset_x, 0.0);
        assert_eq!(center.offset_z, 0.0);
        assert_eq!(center.current_x, 0.0);
    }

    #[test]
    fn test_add_blobs_floor_at_zero() {
        let (mut player, _) = player_with(5);
        player.add_blobs(-1000);
        assert_eq!(player.blob_count(), 0);
        assert!(player.is_defeated());
    }

    #[test]
    fn test_multiply_floors() {
        let (mut player, _) = player_with(5);
        player.multiply_blobs(2.0);
        assert_eq!(player.blob_count(), 10);
        player.multiply_blobs(0.55);
        assert_eq!(player.blob_count(), 5);
        player.multiply_blobs(-3.0);
        assert_eq!(player.blob_count(), 0);
    }

    #[test]
    fn test_count_capped() {
        let (mut player, settings) = player_with(5);
        player.add_blobs(i64::MAX);
        assert_eq!(player.blob_count(), settings.swarm.max_blob_count);
    }

    #[test]
    fn test_swarm_grows_then_disperses() {
        let (mut player, settings) = player_with(3);
        player.add_blobs(4);
        player.update(&ctx(0.016, 0.016), &settings);
        assert_eq!(player.swarm().len(), 7);

        player.add_blobs(-5);
        player.update(&ctx(0.016, 0.032), &settings);
        let counted = player.swarm().iter().filter(|b| !b.is_dispersing()).count();
        assert_eq!(counted, 2);
        // Center survives the cut
        assert!(player.swarm()[0].is_alive());

        // Fade-out finishes
        let mut t = 0.032;
        for _ in 0..60 {
            t += 0.016;
            player.update(&ctx(0.016, t), &settings);
        }
        assert_eq!(player.swarm().len(), 2);
    }

    #[test]
    fn test_center_survives_regrowth_after_wipe() {
        let (mut player, settings) = player_with(2);
        player.set_blob_count(0);
        player.update(&ctx(0.016, 0.016), &settings);
        assert!(player.swarm().iter().all(|b| b.is_dispersing()));

        // Regrow while the old blobs are still fading out
        player.set_blob_count(3);
        player.update(&ctx(0.016, 0.032), &settings);
        assert!(player.swarm()[0].is_dispersing());
        let center_seq = player.swarm().iter().find(|b| !b.is_dispersing()).map(|b| b.seq);

        // Shrink while the followers are dying: only the center is left to cut
        assert!(player.kill_blob(3));
        assert!(player.kill_blob(4));
        player.set_blob_count(1);
        player.update(&ctx(0.016, 0.048), &settings);
        let center = player.swarm().iter().find(|b| !b.is_dispersing()).unwrap();
        assert_eq!(Some(center.seq), center_seq);
        assert!(center.is_alive());
        assert_eq!(center.offset_x, 0.0);
        assert_eq!(center.current_x, player.center().x);
    }

    #[test]
    fn test_kill_blob_decrements_after_animation() {
        let (mut player, settings) = player_with(3);
        assert!(player.kill_blob(2));
        assert!(!player.kill_blob(2));
        assert_eq!(player.blob_count(), 3);
        assert_eq!(player.live_blobs().count(), 2);

        let mut t = 0.0;
        while player.dying_blobs() > 0 {
            t += 0.05;
            player.update(&ctx(0.05, t), &settings);
        }
        assert_eq!(player.blob_count(), 2);
        assert_eq!(player.swarm().len(), 2);
    }

    #[test]
    fn test_steering_clamped_to_track() {
        let (mut player, settings) = player_with(1);
        let mut c = ctx(1.0, 1.0);
        c.steer = 1.0;
        for _ in 0..10 {
            player.update(&c, &settings);
        }
        let limit = settings.track.half_width - settings.swarm.blob_radius;
        assert_eq!(player.center().x, limit);
    }

    #[test]
    fn test_center_tracks_exactly_followers_lag() {
        let (mut player, settings) = player_with(4);
        let mut c = ctx(0.016, 0.016);
        c.steer = 1.0;
        c.advance = 8.0;
        player.update(&c, &settings);

        let center = &player.swarm()[0];
        assert_eq!(center.current_x, player.center().x);
        assert_eq!(center.current_z, player.center().z);

        let follower = &player.swarm()[1];
        let target_x = player.center().x + follower.offset_x;
        assert!((follower.current_x - target_x).abs() > 1e-3);
    }
}
