//! Data-driven game balance
//!
//! Every gameplay number that a designer might want to tweak lives here.
//! Structural constants (timestep, lane geometry) stay in [`crate::consts`].
//! Overrides load from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

/// Inclusive millisecond range for randomized spawn intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalMs {
    pub min: u32,
    pub max: u32,
}

impl IntervalMs {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Swap bounds if given reversed
    fn ordered(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self::new(self.max, self.min)
        }
    }
}

/// Balance values for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Starting forward speed (units/s), also the reference for spawn scaling
    pub base_speed: f32,
    /// Passive acceleration (units/s per second)
    pub speed_increment: f32,
    /// Speed cap outside turbo
    pub max_speed: f32,
    /// Start speed multiplier granted by the Beans food
    pub beans_speed_bonus: f32,

    // === Turbo ===
    pub turbo_factor: f32,
    pub turbo_duration_ms: f32,
    /// Turbo duration with the Chili food
    pub chili_turbo_duration_ms: f32,
    pub gas_max: u32,
    pub gas_per_coin: u32,

    // === Player ===
    pub lane_switch_ms: f32,
    /// Full jump arc (rise + fall)
    pub jump_ms: f32,
    pub slide_ms: f32,

    // === Scoring ===
    pub combo_window_ms: f32,
    pub max_multiplier: u32,
    /// Passive points per second at multiplier 1
    pub passive_score_rate: f64,
    /// Points per coin at multiplier 1
    pub coin_score: f64,
    /// Currency per coin
    pub coin_value: u64,
    /// Points for an obstacle that scrolls off the field untouched
    pub dodge_bonus: f64,

    // === Power-ups ===
    pub powerup_duration_ms: f32,
    /// Extra duration per upgrade level
    pub powerup_level_bonus_ms: f32,
    /// Chance an item spawn is a power-up instead of a coin run
    pub powerup_chance: f64,
    pub magnet_range: f32,
    /// Magnet range with the Onion food
    pub onion_magnet_range: f32,
    /// Fraction of the remaining offset a magnetized coin covers per tick
    pub magnet_pull: f32,

    // === Spawning ===
    pub obstacle_interval_ms: IntervalMs,
    pub item_interval_ms: IntervalMs,
    pub coin_run_length: u32,
    pub coin_run_spacing: f32,

    // === Stages ===
    /// Distance between stage transitions
    pub stage_distance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 600.0,
            speed_increment: 10.0,
            max_speed: 1500.0,
            beans_speed_bonus: 1.2,

            turbo_factor: 2.5,
            turbo_duration_ms: 5000.0,
            chili_turbo_duration_ms: 8000.0,
            gas_max: 100,
            gas_per_coin: 5,

            lane_switch_ms: 150.0,
            jump_ms: 700.0,
            slide_ms: 600.0,

            combo_window_ms: 2000.0,
            max_multiplier: 10,
            passive_score_rate: 10.0,
            coin_score: 10.0,
            coin_value: 1,
            dodge_bonus: 50.0,

            powerup_duration_ms: 5000.0,
            powerup_level_bonus_ms: 2000.0,
            powerup_chance: 0.1,
            magnet_range: 400.0,
            onion_magnet_range: 600.0,
            magnet_pull: 0.1,

            obstacle_interval_ms: IntervalMs::new(800, 1500),
            item_interval_ms: IntervalMs::new(1000, 2000),
            coin_run_length: 3,
            coin_run_spacing: 80.0,

            stage_distance: 1000.0,
        }
    }
}

impl Tuning {
    /// Shortest combo window; a zero window would never decay
    const MIN_COMBO_WINDOW_MS: f32 = 1.0;

    /// Parse overrides from JSON. Fields not present keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break session invariants
    pub fn sanitized(mut self) -> Self {
        self.base_speed = self.base_speed.max(1.0);
        self.max_speed = self.max_speed.max(self.base_speed);
        self.speed_increment = self.speed_increment.max(0.0);
        self.turbo_factor = self.turbo_factor.max(1.0);
        self.combo_window_ms = self.combo_window_ms.max(Self::MIN_COMBO_WINDOW_MS);
        self.max_multiplier = self.max_multiplier.max(1);
        self.powerup_chance = self.powerup_chance.clamp(0.0, 1.0);
        self.magnet_pull = self.magnet_pull.clamp(0.0, 1.0);
        self.stage_distance = self.stage_distance.max(1.0);
        self.coin_run_length = self.coin_run_length.max(1);
        self.obstacle_interval_ms = self.obstacle_interval_ms.ordered();
        self.item_interval_ms = self.item_interval_ms.ordered();
        self
    }
}
