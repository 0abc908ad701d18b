//! Runtime tunables
//!
//! One explicit configuration object, passed by reference into constructors,
//! update and draw calls. Hosts may override any subset from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::renderer::color::{Rgba, palette};

/// Camera placement relative to the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Fixed camera height (world Y)
    pub height: f32,
    /// Trailing distance behind the player (world Z)
    pub follow_distance: f32,
    /// Downward pitch in degrees (clamped to 1-89)
    pub pitch_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            height: CAMERA_HEIGHT,
            follow_distance: CAMERA_FOLLOW_DISTANCE,
            pitch_degrees: CAMERA_PITCH_DEGREES,
        }
    }
}

/// Track marker ring and lane lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    /// Number of markers kept alive
    pub marker_count: usize,
    /// World Z spacing between markers
    pub marker_interval: f32,
    /// A marker further than this behind the player is recycled
    pub cleanup_distance: f32,
    /// How many intervals behind the player the first marker is seeded
    pub seed_behind: usize,
    /// Half width of the track (world X)
    pub half_width: f32,
    /// Far end of the longitudinal lane lines, relative to the camera
    pub lane_line_far_z: f32,
    pub marker_color: Rgba,
    pub lane_color: Rgba,
    /// Marker line width in pixels at scale 1
    pub marker_width: f32,
    /// Extra halo width around markers (0 disables the glow pass)
    pub glow: f32,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            marker_count: 24,
            marker_interval: 100.0,
            cleanup_distance: 400.0,
            seed_behind: 3,
            half_width: 150.0,
            lane_line_far_z: 2400.0,
            marker_color: palette::MARKER,
            lane_color: palette::LANE_LINE,
            marker_width: 3.0,
            glow: 4.0,
        }
    }
}

/// Player swarm behavior and look
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmSettings {
    pub starting_blobs: u32,
    /// Hard cap on blob count (multiplier gates grow fast)
    pub max_blob_count: u32,
    /// Distance between spiral rings of followers
    pub spread: f32,
    /// Followers flatten along Z by this factor
    pub depth_squash: f32,
    /// How quickly followers chase their slot (per second)
    pub follow_rate: f32,
    /// Blob radius in world units
    pub blob_radius: f32,
    pub color: Rgba,
    /// Seconds a new blob takes to fade in
    pub fade_in: f32,
    /// Seconds a dying blob takes before it is removed
    pub death_duration: f32,
    /// Lateral speed of the player (world units per second)
    pub lateral_speed: f32,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            starting_blobs: 5,
            max_blob_count: 400,
            spread: 11.0,
            depth_squash: 0.6,
            follow_rate: 10.0,
            blob_radius: 12.0,
            color: palette::BLOB,
            fade_in: 0.3,
            death_duration: 0.45,
            lateral_speed: 320.0,
        }
    }
}

/// Gate geometry and colors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Lateral half width of a gate panel
    pub half_width: f32,
    /// Depth of the collision window centered on the gate Z
    pub depth: f32,
    /// Panel height above the ground
    pub panel_height: f32,
    pub add_color: Rgba,
    pub subtract_color: Rgba,
    pub multiply_color: Rgba,
    pub label_color: Rgba,
    /// Panel fill opacity
    pub opacity: f32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            half_width: 70.0,
            depth: 30.0,
            panel_height: 110.0,
            add_color: palette::GATE_ADD,
            subtract_color: palette::GATE_SUBTRACT,
            multiply_color: palette::GATE_MULTIPLY,
            label_color: palette::GATE_LABEL,
            opacity: 0.45,
        }
    }
}

/// Depth cues (size falloff and darkening)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeSettings {
    /// Darken colors with depth
    pub depth_shading: bool,
    /// 0 = no darkening, 1 = black at `max_depth`
    pub intensity: f32,
    /// Depth at which shading and size falloff reach their extreme
    pub max_depth: f32,
    /// Fraction of size lost at `max_depth`
    pub size_falloff: f32,
    /// Smallest size scale (never below 10%)
    pub size_floor: f32,
}

impl Default for ShadeSettings {
    fn default() -> Self {
        Self {
            depth_shading: true,
            intensity: 0.7,
            max_depth: 2400.0,
            size_falloff: 0.5,
            size_floor: 0.2,
        }
    }
}

/// Enemy collision refinement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Refine screen-space box hits with sprite alpha masks
    pub pixel_mask: bool,
    /// Sample every N screen pixels inside the overlap
    pub mask_stride: u32,
    /// Alpha above which a sprite pixel counts as solid
    pub alpha_threshold: u8,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            pixel_mask: true,
            mask_stride: 2,
            alpha_threshold: 32,
        }
    }
}

/// Run pacing and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Forward speed at the start of a run (world units per second)
    pub start_speed: f32,
    pub max_speed: f32,
    /// Speed gained per meter traveled
    pub speed_ramp: f32,
    /// World units to meters for the distance score
    pub units_to_meters: f32,
    /// Largest dt accepted per tick (seconds)
    pub max_frame_dt: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            start_speed: 450.0,
            max_speed: 1100.0,
            speed_ramp: 0.6,
            units_to_meters: 0.05,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

/// Gate/enemy generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// First gate row this far ahead of the start
    pub first_row_z: f32,
    /// World Z between rows
    pub row_spacing: f32,
    /// Keep rows spawned this far ahead of the player
    pub look_ahead: f32,
    /// Chance a row is followed by an enemy
    pub enemy_chance: f64,
    /// Chance a gate is a multiplier instead of an adder
    pub multiply_chance: f64,
    /// Chance an adder gate subtracts
    pub negative_chance: f64,
    /// Enemy approach speed (world units per second, toward the camera)
    pub enemy_speed: f32,
    /// Enemy half extent in world units
    pub enemy_size: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            first_row_z: 900.0,
            row_spacing: 700.0,
            look_ahead: 2400.0,
            enemy_chance: 0.45,
            multiply_chance: 0.25,
            negative_chance: 0.35,
            enemy_speed: 60.0,
            enemy_size: 22.0,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera: CameraSettings,
    pub track: TrackSettings,
    pub swarm: SwarmSettings,
    pub gates: GateSettings,
    pub shading: ShadeSettings,
    pub collision: CollisionSettings,
    pub run: RunSettings,
    pub spawn: SpawnSettings,
}

impl Settings {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse overrides, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let s = Settings::from_json(r#"{ "track": { "marker_count": 8 }, "shading": { "depth_shading": false } }"#)
            .unwrap();
        assert_eq!(s.track.marker_count, 8);
        assert_eq!(s.track.marker_interval, TrackSettings::default().marker_interval);
        assert!(!s.shading.depth_shading);
        assert_eq!(s.swarm.starting_blobs, 5);
    }

    #[test]
    fn test_malformed_falls_back() {
        let s = Settings::from_json_or_default("{ not json");
        assert_eq!(s.camera.height, CAMERA_HEIGHT);
    }

    #[test]
    fn test_roundtrip_colors() {
        let mut s = Settings::default();
        s.gates.add_color = Rgba::rgb(1, 2, 3);
        let back = Settings::from_json(&s.to_json()).unwrap();
        assert_eq!(back.gates.add_color, Rgba::rgb(1, 2, 3));
    }
}
