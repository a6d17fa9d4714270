//! Pickup streak multiplier with a keep-alive window

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    multiplier: u32,
    keep_alive_ms: f32,
    window_ms: f32,
    max_multiplier: u32,
}

impl ComboTracker {
    pub fn new(window_ms: f32, max_multiplier: u32) -> Self {
        Self {
            multiplier: 1,
            keep_alive_ms: 0.0,
            window_ms,
            max_multiplier: max_multiplier.max(1),
        }
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn keep_alive_ms(&self) -> f32 {
        self.keep_alive_ms
    }

    /// Bump the multiplier and refill the window; returns the new multiplier
    pub fn on_pickup(&mut self) -> u32 {
        self.multiplier = (self.multiplier + 1).min(self.max_multiplier);
        self.keep_alive_ms = self.window_ms;
        self.multiplier
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if self.keep_alive_ms > 0.0 {
            self.keep_alive_ms -= dt_ms;
            if self.keep_alive_ms <= 0.0 {
                self.keep_alive_ms = 0.0;
                self.multiplier = 1;
            }
        }
    }
}
