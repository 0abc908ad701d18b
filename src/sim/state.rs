//! Run state
//!
//! `Game` owns everything one run needs: settings, camera, the renderer (and
//! through it every entity), the spawner and the scoring counters. The host
//! only ever talks to `Game` and [`super::tick`].

use glam::Vec3;

use super::spawner::Spawner;
use crate::assets::Assets;
use crate::consts::GROUND_Y;
use crate::entity::{Entity, Player};
use crate::renderer::camera::Camera;
use crate::renderer::color::palette;
use crate::renderer::scene::Renderer;
use crate::renderer::surface::Surface;
use crate::settings::Settings;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// World is laid out, waiting for the first input
    Ready,
    /// Running
    Playing,
    /// Swarm wiped out
    GameOver,
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    GateConsumed { label: String, blobs: u32 },
    BlobHit { blobs: u32 },
    GameOver { meters: f32 },
}

pub struct Game {
    pub settings: Settings,
    pub assets: Assets,
    pub phase: GamePhase,
    /// Seed of the current run
    pub seed: u64,
    /// World units traveled since the start of the run
    pub distance: f32,
    /// Current forward speed (world units per second)
    pub speed: f32,
    /// Seconds spent playing
    pub elapsed: f32,
    pub camera: Camera,
    pub renderer: Renderer,
    pub spawner: Spawner,
    events: Vec<GameEvent>,
    runs: u32,
}

impl Game {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let assets = Assets::procedural(settings.swarm.color, palette::ENEMY);
        let mut game = Self {
            assets,
            phase: GamePhase::Ready,
            seed,
            distance: 0.0,
            speed: settings.run.start_speed,
            elapsed: 0.0,
            camera: Camera::new(&settings.camera),
            renderer: Renderer::new(),
            spawner: Spawner::new(seed, &settings.spawn),
            events: Vec::new(),
            runs: 0,
            settings,
        };
        game.reset(seed);
        game
    }

    /// Start over from an empty world; assets are kept
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.phase = GamePhase::Ready;
        self.distance = 0.0;
        self.speed = self.settings.run.start_speed;
        self.elapsed = 0.0;
        self.events.clear();

        self.renderer.reset();
        self.camera = Camera::new(&self.settings.camera);
        self.spawner.reset(seed, &self.settings.spawn);

        let start = Vec3::new(0.0, GROUND_Y, 0.0);
        let settings = &self.settings;
        self.renderer
            .spawn(|id| Entity::Player(Player::new(id, start, settings, seed)));
        self.camera.follow_target(start);
        self.renderer.track_mut().update(start.z, settings);
        self.spawner.fill(&mut self.renderer, start.z, 0.0, settings);

        self.runs += 1;
        log::info!("Run {} ready (seed {})", self.runs, seed);
    }

    /// Score: meters traveled
    pub fn distance_traveled(&self) -> f32 {
        self.distance * self.settings.run.units_to_meters
    }

    pub fn blob_count(&self) -> u32 {
        self.player().map_or(0, Player::blob_count)
    }

    pub fn player(&self) -> Option<&Player> {
        self.renderer.player()
    }

    /// Number of runs started, including the current one
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn render(&mut self, surface: &mut dyn Surface) {
        self.renderer.render(surface, &self.camera, &self.assets, &self.settings);
    }
}
