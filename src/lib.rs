//! Gut Runner - A three-lane endless runner through the digestive tract
//!
//! Core modules:
//! - `sim`: Deterministic run-session simulation (lanes, speed, spawning, scoring)
//! - `track`: Reference entity field (scrolling, AABB overlap, magnet pull)
//! - `run`: Session host wiring the simulation to persistence and event sinks
//! - `persistence`: Versioned save record with additive merge on load
//! - `platform`: Storage backends and input intent mapping
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod missions;
pub mod persistence;
pub mod platform;
pub mod run;
pub mod settings;
pub mod shop;
pub mod sim;
pub mod track;
pub mod tuning;

pub use highscores::Leaderboard;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions (portrait)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 1200.0;

    /// Lanes
    pub const LANE_COUNT: u8 = 3;
    pub const START_LANE: u8 = 1;
    /// X offsets of each lane from the field center
    pub const LANE_POSITIONS: [f32; LANE_COUNT as usize] = [-200.0, 0.0, 200.0];

    /// Player sits this far above the bottom edge
    pub const PLAYER_Y: f32 = FIELD_HEIGHT - 250.0;
    /// Entities spawn just above the top edge
    pub const SPAWN_Y: f32 = -100.0;
    /// Entities are culled this far below the bottom edge
    pub const DESPAWN_MARGIN: f32 = 100.0;

    /// Speed units per distance unit (speed * dt_ms / DISTANCE_SCALE)
    pub const DISTANCE_SCALE: f32 = 10_000.0;
}

/// X coordinate of a lane center in field space
#[inline]
pub fn lane_center_x(lane: u8) -> f32 {
    let idx = (lane as usize).min(consts::LANE_POSITIONS.len() - 1);
    consts::FIELD_WIDTH / 2.0 + consts::LANE_POSITIONS[idx]
}
