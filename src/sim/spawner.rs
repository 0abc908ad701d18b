//! Gate and enemy generation
//!
//! Rows of gates (one per lane) are laid out at a fixed spacing ahead of
//! the player. Each row may be trailed by an enemy halfway to the next row.
//! Everything is drawn from a seeded `Pcg32`, so a seed replays the same run.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{GROUND_Y, LANE_CENTERS};
use crate::entity::{Enemy, Entity, Gate, GateKind};
use crate::renderer::scene::Renderer;
use crate::settings::{Settings, SpawnSettings};

/// Multiplier values offered by gates
const MULTIPLIERS: [f32; 4] = [1.5, 2.0, 2.0, 3.0];

/// Meters over which gate values roughly double
const DIFFICULTY_METERS: f32 = 250.0;

/// Rows laid out per `fill` call at most; the rest follow on later frames
const MAX_ROWS_PER_FILL: u32 = 64;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    next_row_z: f32,
    next_row: u32,
}

impl Spawner {
    pub fn new(seed: u64, cfg: &SpawnSettings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_row_z: cfg.first_row_z,
            next_row: 0,
        }
    }

    pub fn reset(&mut self, seed: u64, cfg: &SpawnSettings) {
        *self = Self::new(seed, cfg);
    }

    pub fn rows_spawned(&self) -> u32 {
        self.next_row
    }

    /// Spawn every row within the look-ahead of `player_z`
    ///
    /// Returns the number of entities added.
    pub fn fill(&mut self, renderer: &mut Renderer, player_z: f32, meters: f32, settings: &Settings) -> usize {
        let cfg = &settings.spawn;
        if !player_z.is_finite() {
            return 0;
        }
        let spacing = cfg.row_spacing.max(1.0);
        let mut added = 0;
        let mut rows = 0;

        while rows < MAX_ROWS_PER_FILL && self.next_row_z <= player_z + cfg.look_ahead {
            rows += 1;
            let z = self.next_row_z;
            let row = self.next_row;
            added += self.spawn_row(renderer, z, row, meters, settings);

            if self.rng.random_bool(cfg.enemy_chance.clamp(0.0, 1.0)) {
                let limit = (settings.track.half_width - cfg.enemy_size).max(0.0);
                let x = if limit > 0.0 { self.rng.random_range(-limit..=limit) } else { 0.0 };
                let pos = Vec3::new(x, GROUND_Y, z + spacing / 2.0);
                renderer.spawn(|id| Entity::Enemy(Enemy::new(id, pos, cfg.enemy_size, cfg.enemy_speed)));
                added += 1;
            }

            self.next_row += 1;
            self.next_row_z += spacing;
        }

        if added > 0 {
            log::debug!("Spawned {} entities, next row at z={}", added, self.next_row_z);
        }
        added
    }

    fn spawn_row(&mut self, renderer: &mut Renderer, z: f32, row: u32, meters: f32, settings: &Settings) -> usize {
        let mut picks: Vec<(GateKind, f32)> = LANE_CENTERS
            .iter()
            .map(|_| self.gate_value(meters, &settings.spawn))
            .collect();

        // At least one lane must not hurt
        if picks.iter().all(|&(kind, value)| is_harmful(kind, value)) {
            let lane = self.rng.random_range(0..picks.len());
            picks[lane].1 = picks[lane].1.abs().max(1.0);
        }

        for (&x, (kind, value)) in LANE_CENTERS.iter().zip(picks) {
            let pos = Vec3::new(x, GROUND_Y, z);
            renderer.spawn(|id| Entity::Gate(Gate::new(id, pos, kind, value, row, &settings.gates)));
        }
        LANE_CENTERS.len()
    }

    fn gate_value(&mut self, meters: f32, cfg: &SpawnSettings) -> (GateKind, f32) {
        if self.rng.random_bool(cfg.multiply_chance.clamp(0.0, 1.0)) {
            let i = self.rng.random_range(0..MULTIPLIERS.len());
            return (GateKind::Multiply, MULTIPLIERS[i]);
        }

        let difficulty = 1.0 + meters.max(0.0) / DIFFICULTY_METERS;
        let top = (5.0 * difficulty).floor().max(1.0) as i32;
        let magnitude = self.rng.random_range(1..=top) as f32;
        if self.rng.random_bool(cfg.negative_chance.clamp(0.0, 1.0)) {
            (GateKind::Add, -magnitude)
        } else {
            (GateKind::Add, magnitude)
        }
    }
}

fn is_harmful(kind: GateKind, value: f32) -> bool {
    match kind {
        GateKind::Add => value < 0.0,
        GateKind::Multiply => value < 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Actor;

    fn gates(renderer: &Renderer) -> Vec<&Gate> {
        renderer.entities().iter().filter_map(Entity::as_gate).collect()
    }

    #[test]
    fn test_fill_spawns_rows_within_look_ahead() {
        let settings = Settings::default();
        let mut renderer = Renderer::new();
        let mut spawner = Spawner::new(42, &settings.spawn);

        spawner.fill(&mut renderer, 0.0, 0.0, &settings);
        let cfg = &settings.spawn;
        let expected_rows = ((cfg.look_ahead - cfg.first_row_z) / cfg.row_spacing).floor() as u32 + 1;
        assert_eq!(spawner.rows_spawned(), expected_rows);
        assert_eq!(gates(&renderer).len(), expected_rows as usize * LANE_CENTERS.len());
        assert!(spawner.next_row_z > cfg.look_ahead);

        // Nothing new until the player moves
        assert_eq!(spawner.fill(&mut renderer, 0.0, 0.0, &settings), 0);
        assert!(spawner.fill(&mut renderer, cfg.row_spacing, 35.0, &settings) > 0);
    }

    #[test]
    fn test_rows_share_an_id_and_offer_a_safe_lane() {
        let settings = Settings::default();
        let mut renderer = Renderer::new();
        let mut spawner = Spawner::new(7, &settings.spawn);
        spawner.fill(&mut renderer, 20_000.0, 5000.0, &settings);

        let all = gates(&renderer);
        for row in 0..spawner.rows_spawned() {
            let members: Vec<_> = all.iter().filter(|g| g.row() == row).collect();
            assert_eq!(members.len(), 2);
            assert!(members.iter().any(|g| !is_harmful(g.kind(), g.value())));
            assert_ne!(members[0].position().x, members[1].position().x);
        }
    }

    #[test]
    fn test_runaway_player_cannot_stall_fill() {
        let settings = Settings::default();
        let mut renderer = Renderer::new();
        let mut spawner = Spawner::new(1, &settings.spawn);

        assert_eq!(spawner.fill(&mut renderer, f32::INFINITY, 0.0, &settings), 0);
        assert_eq!(spawner.fill(&mut renderer, f32::NAN, 0.0, &settings), 0);

        // Adding the spacing no longer moves a row this far out
        spawner.fill(&mut renderer, 1e30, 0.0, &settings);
        assert_eq!(spawner.rows_spawned(), MAX_ROWS_PER_FILL);
    }

    #[test]
    fn test_same_seed_same_run() {
        let settings = Settings::default();
        let layout = |seed| {
            let mut renderer = Renderer::new();
            Spawner::new(seed, &settings.spawn).fill(&mut renderer, 5000.0, 100.0, &settings);
            renderer
                .entities()
                .iter()
                .map(|e| (e.kind(), e.position().x, e.position().z))
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(99), layout(99));
    }

    #[test]
    fn test_enemies_stay_on_track() {
        let mut settings = Settings::default();
        settings.spawn.enemy_chance = 1.0;
        let mut renderer = Renderer::new();
        Spawner::new(3, &settings.spawn).fill(&mut renderer, 10_000.0, 0.0, &settings);

        let enemies: Vec<_> = renderer.entities().iter().filter_map(Entity::as_enemy).collect();
        assert!(!enemies.is_empty());
        let limit = settings.track.half_width - settings.spawn.enemy_size;
        assert!(enemies.iter().all(|e| e.position().x.abs() <= limit));
    }
}
