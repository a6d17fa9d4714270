//! Randomized spawn cadence for obstacles and items
//!
//! Two independent countdowns. Each re-arms with a random interval scaled by
//! `base / current` speed, so spatial density stays roughly constant as the
//! run accelerates.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;
use super::state::ObstacleKind;
use crate::consts::LANE_COUNT;
use crate::tuning::{IntervalMs, Tuning};

/// What the scheduler wants placed at the top of a lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnRequest {
    Obstacle { lane: u8, kind: ObstacleKind },
    PowerUp { lane: u8, kind: PowerUpKind },
    /// `count` coins in one lane, each `spacing` units above the previous
    CoinRun { lane: u8, count: u32, spacing: f32 },
}

impl SpawnRequest {
    pub fn lane(&self) -> u8 {
        match *self {
            SpawnRequest::Obstacle { lane, .. }
            | SpawnRequest::PowerUp { lane, .. }
            | SpawnRequest::CoinRun { lane, .. } => lane,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub remaining_ms: f32,
    interval: IntervalMs,
}

impl SpawnTimer {
    /// Starts expired so the first tick spawns immediately
    pub fn new(interval: IntervalMs) -> Self {
        Self {
            remaining_ms: 0.0,
            interval,
        }
    }

    /// Count down; returns true when the timer fired (caller re-arms)
    fn advance(&mut self, dt_ms: f32) -> bool {
        self.remaining_ms -= dt_ms;
        self.remaining_ms <= 0.0
    }

    fn rearm<R: Rng>(&mut self, rng: &mut R, base_speed: f32, current_speed: f32) {
        let roll = rng.random_range(self.interval.min..=self.interval.max) as f32;
        self.remaining_ms = roll * (base_speed / current_speed.max(1.0));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub obstacle: SpawnTimer,
    pub item: SpawnTimer,
    powerup_chance: f64,
    coin_run_length: u32,
    coin_run_spacing: f32,
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            obstacle: SpawnTimer::new(tuning.obstacle_interval_ms),
            item: SpawnTimer::new(tuning.item_interval_ms),
            powerup_chance: tuning.powerup_chance,
            coin_run_length: tuning.coin_run_length,
            coin_run_spacing: tuning.coin_run_spacing,
        }
    }

    /// Advance both timers. Items resolve before obstacles within a tick.
    pub fn tick<R: Rng>(
        &mut self,
        dt_ms: f32,
        base_speed: f32,
        current_speed: f32,
        rng: &mut R,
    ) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();

        if self.item.advance(dt_ms) {
            requests.push(self.roll_item(rng));
            self.item.rearm(rng, base_speed, current_speed);
        }

        if self.obstacle.advance(dt_ms) {
            requests.push(Self::roll_obstacle(rng));
            self.obstacle.rearm(rng, base_speed, current_speed);
        }

        requests
    }

    fn roll_lane<R: Rng>(rng: &mut R) -> u8 {
        rng.random_range(0..LANE_COUNT)
    }

    fn roll_obstacle<R: Rng>(rng: &mut R) -> SpawnRequest {
        let lane = Self::roll_lane(rng);
        let kind = if rng.random_bool(0.5) {
            ObstacleKind::Trap
        } else {
            ObstacleKind::Spike
        };
        SpawnRequest::Obstacle { lane, kind }
    }

    fn roll_item<R: Rng>(&self, rng: &mut R) -> SpawnRequest {
        let lane = Self::roll_lane(rng);
        if rng.random_bool(self.powerup_chance) {
            let kind = if rng.random_bool(0.5) {
                PowerUpKind::Magnet
            } else {
                PowerUpKind::Invincibility
            };
            SpawnRequest::PowerUp { lane, kind }
        } else {
            SpawnRequest::CoinRun {
                lane,
                count: self.coin_run_length,
                spacing: self.coin_run_spacing,
            }
        }
    }
}
