//! Simulation
//!
//! Everything that advances a run: the orchestrating [`Game`] state, the
//! ordered per-frame [`tick`], collision predicates and the seeded spawner.
//! Nothing in here touches the platform.

pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{sprites_collide, world_box_contains, world_box_swept};
pub use spawner::Spawner;
pub use state::{Game, GameEvent, GamePhase};
pub use tick::{TickInput, tick};
