//! Per-frame simulation step
//!
//! One call advances the run in a fixed order: world advance, entity
//! updates, camera follow, track upkeep, collisions against the just-updated
//! positions, spawning, then the game-over check. Nothing here draws; the
//! host renders after the tick.

use super::state::{Game, GameEvent, GamePhase};
use crate::entity::{Actor, Entity, EntityId, Player, UpdateContext};
use crate::platform::input::InputSource;

/// Level-triggered input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Leave the ready screen
    pub start: bool,
    /// Start a fresh run
    pub restart: bool,
}

impl TickInput {
    pub fn from_source(source: &dyn InputSource) -> Self {
        Self {
            left: source.is_left_pressed(),
            right: source.is_right_pressed(),
            start: source.is_start_pressed(),
            restart: source.is_restart_pressed(),
        }
    }

    /// -1 (left), 0 or 1 (right)
    pub fn steer(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the game by `dt` seconds
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, game.settings.run.max_frame_dt)
    } else {
        0.0
    };

    if input.restart || (game.phase == GamePhase::GameOver && input.start) {
        let seed = game.seed.wrapping_add(1);
        game.reset(seed);
        return;
    }

    match game.phase {
        GamePhase::GameOver => return,
        GamePhase::Ready => {
            if !input.start && input.steer() == 0.0 {
                return;
            }
            game.phase = GamePhase::Playing;
            game.push_event(GameEvent::Started);
            log::info!("Run started");
        }
        GamePhase::Playing => {}
    }

    // World advance
    let advance = game.speed * dt;
    game.distance += advance;
    game.elapsed += dt;
    let run = &game.settings.run;
    game.speed = (run.start_speed + run.speed_ramp * game.distance_traveled()).min(run.max_speed);

    // Entity updates, against last frame's camera
    let ctx = UpdateContext {
        dt,
        steer: input.steer(),
        advance,
        camera_z: game.camera.pose().z,
        time: game.elapsed,
    };
    for entity in game.renderer.entities_mut() {
        entity.actor_mut().update(&ctx, &game.settings);
    }

    let Some(player_pos) = game.player().map(|p| p.center()) else {
        log::warn!("No player in the scene, ending run");
        end_run(game);
        return;
    };
    game.camera.follow_target(player_pos);
    game.renderer.track_mut().update(player_pos.z, &game.settings);

    resolve_gates(game);
    resolve_enemies(game);

    let meters = game.distance_traveled();
    game.spawner.fill(&mut game.renderer, player_pos.z, meters, &game.settings);

    if game.player().is_none_or(Player::is_defeated) {
        end_run(game);
    }
}

fn end_run(game: &mut Game) {
    game.phase = GamePhase::GameOver;
    let meters = game.distance_traveled();
    game.push_event(GameEvent::GameOver { meters });
    log::info!("Game over after {:.0} m", meters);
}

/// Apply every gate the player touches; one gate per row
fn resolve_gates(game: &mut Game) {
    let Some(player) = game.renderer.player() else {
        return;
    };
    let player_id = player.id();
    let hits: Vec<(EntityId, u32)> = game
        .renderer
        .entities()
        .iter()
        .filter_map(Entity::as_gate)
        .filter(|g| g.check_collision(player))
        .map(|g| (g.id(), g.row()))
        .collect();

    for (gate_id, row) in hits {
        let Some((gate, player)) = game.renderer.pair_mut(gate_id, player_id) else {
            continue;
        };
        let (Some(gate), Some(player)) = (gate.as_gate_mut(), player.as_player_mut()) else {
            continue;
        };
        if !gate.apply_effect(player) {
            continue;
        }
        let event = GameEvent::GateConsumed {
            label: gate.label(),
            blobs: player.blob_count(),
        };

        // The other lane of the row is no longer on offer
        for sibling in game.renderer.entities_mut().iter_mut().filter_map(Entity::as_gate_mut) {
            if sibling.row() == row {
                sibling.consume();
            }
        }
        game.push_event(event);
    }
}

/// Each enemy touching a live blob pops exactly one and is neutralized
fn resolve_enemies(game: &mut Game) {
    let pose = game.camera.pose();
    let enemies: Vec<EntityId> = game
        .renderer
        .entities()
        .iter()
        .filter_map(Entity::as_enemy)
        .filter(|e| !e.is_neutralized())
        .map(|e| e.id())
        .collect();

    for enemy_id in enemies {
        let hit = {
            let Some(player) = game.renderer.player() else {
                return;
            };
            game.renderer
                .entity(enemy_id)
                .and_then(Entity::as_enemy)
                .and_then(|e| e.check_blob_collision(player, &pose, &game.assets, &game.settings))
        };
        let Some(blob) = hit else {
            continue;
        };

        if let Some(enemy) = game.renderer.entity_mut(enemy_id).and_then(Entity::as_enemy_mut) {
            enemy.neutralize();
        }
        let popped = game
            .renderer
            .player_mut()
            .and_then(|p| p.kill_blob(blob).then(|| p.blob_count()));
        if let Some(blobs) = popped {
            log::debug!("Enemy {} popped blob {}", enemy_id.0, blob);
            game.push_event(GameEvent::BlobHit { blobs });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Enemy, Gate, GateKind};
    use crate::settings::Settings;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    /// A game with an empty road ahead
    fn quiet_game() -> Game {
        let mut settings = Settings::default();
        settings.spawn.first_row_z = 1e9;
        Game::new(settings, 1)
    }

    fn go() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_waits_for_input() {
        let mut game = quiet_game();
        tick(&mut game, &TickInput::default(), DT);
        assert_eq!(game.phase, GamePhase::Ready);
        assert_eq!(game.distance, 0.0);

        tick(&mut game, &go(), DT);
        assert_eq!(game.phase, GamePhase::Playing);
        assert!(game.distance > 0.0);
        assert!(game.drain_events().contains(&GameEvent::Started));
    }

    #[test]
    fn test_dt_is_capped() {
        let mut game = quiet_game();
        tick(&mut game, &go(), 10.0);
        let max = game.settings.run.start_speed * game.settings.run.max_frame_dt;
        assert!(game.distance <= max + 1e-3);

        let before = game.distance;
        tick(&mut game, &TickInput::default(), f32::NAN);
        assert_eq!(game.distance, before);
    }

    #[test]
    fn test_camera_and_track_follow_player() {
        let mut game = quiet_game();
        for _ in 0..120 {
            tick(&mut game, &go(), DT);
        }
        let player_z = game.player().unwrap().center().z;
        assert!(player_z > 0.0);
        assert_eq!(game.camera.pose().z, player_z - game.settings.camera.follow_distance);

        let track = game.renderer.track();
        assert_eq!(track.len(), game.settings.track.marker_count);
        assert!(track.recycled() > 0);
    }

    #[test]
    fn test_speed_ramps_to_max() {
        let mut game = quiet_game();
        game.phase = GamePhase::Playing;
        game.distance = 1e9;
        tick(&mut game, &TickInput::default(), DT);
        assert_eq!(game.speed, game.settings.run.max_speed);
    }

    #[test]
    fn test_gate_row_is_one_choice() {
        let mut game = quiet_game();
        let gates = &game.settings.gates;
        let left_id = game.renderer.spawn(|id| {
            Entity::Gate(Gate::new(id, Vec3::new(-75.0, 0.0, 5.0), GateKind::Add, 4.0, 500, gates))
        });
        let right_id = game.renderer.spawn(|id| {
            Entity::Gate(Gate::new(id, Vec3::new(75.0, 0.0, 5.0), GateKind::Multiply, 3.0, 500, gates))
        });
        let start = game.blob_count();

        // Standing in the left lane
        if let Some(p) = game.renderer.player_mut() {
            p.set_position(Vec3::new(-75.0, 0.0, 0.0));
        }
        tick(&mut game, &go(), DT);

        assert_eq!(game.blob_count(), start + 4);
        let consumed = |game: &Game, id| game.renderer.entity(id).and_then(Entity::as_gate).map(Gate::is_consumed);
        assert_eq!(consumed(&game, left_id), Some(true));
        assert_eq!(consumed(&game, right_id), Some(true));

        // Still overlapping next frame: nothing more happens
        tick(&mut game, &TickInput::default(), DT);
        assert_eq!(game.blob_count(), start + 4);
    }

    /// Single blob already at top speed
    fn fast_game() -> Game {
        let mut settings = Settings::default();
        settings.spawn.first_row_z = 1e9;
        settings.swarm.starting_blobs = 1;
        settings.run.start_speed = settings.run.max_speed;
        Game::new(settings, 1)
    }

    #[test]
    fn test_gate_not_skipped_at_30_fps() {
        let mut game = fast_game();
        let gates = &game.settings.gates;
        game.renderer.spawn(|id| {
            Entity::Gate(Gate::new(id, Vec3::new(0.0, 0.0, 90.0), GateKind::Add, 10.0, 700, gates))
        });

        let mut path = vec![0.0];
        for _ in 0..3 {
            tick(&mut game, &go(), 1.0 / 30.0);
            path.push(game.player().unwrap().center().z);
        }
        // Every step is longer than the gate is deep
        assert!(path.windows(2).all(|w| w[1] - w[0] > game.settings.gates.depth));
        assert_eq!(game.blob_count(), 11);
    }

    #[test]
    fn test_gate_not_skipped_at_dt_cap() {
        let mut game = fast_game();
        let gates = &game.settings.gates;
        game.renderer.spawn(|id| {
            Entity::Gate(Gate::new(id, Vec3::new(0.0, 0.0, 60.0), GateKind::Add, 10.0, 700, gates))
        });

        tick(&mut game, &go(), 5.0);
        let z = game.player().unwrap().center().z;
        let max_step = game.settings.run.max_speed * game.settings.run.max_frame_dt;
        assert!((z - max_step).abs() < 1e-3);
        assert_eq!(game.blob_count(), 11);
    }

    #[test]
    fn test_enemy_pops_one_blob() {
        let mut game = quiet_game();
        let enemy_id = game
            .renderer
            .spawn(|id| Entity::Enemy(Enemy::new(id, Vec3::new(0.0, 0.0, 12.0), 22.0, 0.0)));
        let start = game.blob_count();

        tick(&mut game, &go(), DT);
        let neutralized = game
            .renderer
            .entity(enemy_id)
            .and_then(Entity::as_enemy)
            .map(Enemy::is_neutralized);
        assert_eq!(neutralized, Some(true));
        assert_eq!(game.player().unwrap().dying_blobs(), 1);

        for _ in 0..60 {
            tick(&mut game, &TickInput::default(), DT);
        }
        assert_eq!(game.blob_count(), start - 1);
        assert_eq!(game.player().unwrap().dying_blobs(), 0);
    }

    #[test]
    fn test_wiped_out_swarm_ends_run_and_restart() {
        let mut game = quiet_game();
        let gates = &game.settings.gates;
        game.renderer.spawn(|id| {
            let wipe = Gate::new(id, Vec3::new(0.0, 0.0, 5.0), GateKind::Add, -1000.0, 900, gates);
            Entity::Gate(wipe.with_extent(150.0, 60.0))
        });

        tick(&mut game, &go(), DT);
        assert_eq!(game.blob_count(), 0);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert!(
            game.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }))
        );

        // Frozen until restarted
        let distance = game.distance;
        tick(&mut game, &TickInput::default(), DT);
        assert_eq!(game.distance, distance);

        tick(&mut game, &go(), DT);
        assert_eq!(game.phase, GamePhase::Ready);
        assert_eq!(game.blob_count(), game.settings.swarm.starting_blobs);
        assert_eq!(game.seed, 2);
    }

    #[test]
    fn test_steer() {
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.steer(), 0.0);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        assert_eq!(left.steer(), -1.0);
    }
}
