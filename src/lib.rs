//! Blob Runner - A two-lane perspective arcade runner
//!
//! Core modules:
//! - `renderer`: Perspective projection, camera, track markers, depth-sorted drawing
//! - `entity`: Player swarm, gates and enemies (update/draw/collision contracts)
//! - `sim`: Frame orchestration (world advance, collisions, spawning)
//! - `platform`: Input state and frame timing
//! - `assets`: Sprite slots with explicit ready state
//! - `settings`: Runtime tunables passed by reference

pub mod assets;
pub mod entity;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetState, Assets, Sprite, SpriteId};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Perspective reference distance (world units at which scale == 1)
    pub const PROJECTION_DISTANCE: f32 = 400.0;
    /// Lower clamp for rotated depth before the perspective divide
    pub const MIN_EFFECTIVE_Z: f32 = 1.0;
    /// Depth-based size scaling never shrinks below this
    pub const MIN_SIZE_SCALE: f32 = 0.1;

    /// Camera defaults
    pub const CAMERA_HEIGHT: f32 = 280.0;
    pub const CAMERA_FOLLOW_DISTANCE: f32 = 320.0;
    pub const CAMERA_PITCH_DEGREES: f32 = 15.0;
    /// Pitch clamp, the rotation degenerates near the poles
    pub const MIN_PITCH_DEGREES: f32 = 1.0;
    pub const MAX_PITCH_DEGREES: f32 = 89.0;

    /// Largest single catch-up step after a stall (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Z differences below this are treated as ties when depth sorting
    pub const DEPTH_SORT_EPSILON: f32 = 0.5;

    /// Ground plane height
    pub const GROUND_Y: f32 = 0.0;
    /// Lateral center of each lane (two lanes)
    pub const LANE_CENTERS: [f32; 2] = [-75.0, 75.0];
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `[start, end]` onto `[0, 1]`, clamped
#[inline]
pub fn progress(value: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return 1.0;
    }
    ((value - start) / (end - start)).clamp(0.0, 1.0)
}
