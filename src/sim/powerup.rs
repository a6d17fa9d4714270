//! Timed power-up effects and the turbo gas gauge

use serde::{Deserialize, Serialize};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Obstacles are destroyed on contact instead of ending the run
    Invincibility,
    /// Nearby coins are pulled toward the player
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Invincibility, PowerUpKind::Magnet];
}

/// Independent countdowns for each power-up kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTracker {
    invincibility_ms: Option<f32>,
    magnet_ms: Option<f32>,
    base_duration_ms: f32,
    level_bonus_ms: f32,
}

impl PowerUpTracker {
    pub fn new(base_duration_ms: f32, level_bonus_ms: f32) -> Self {
        Self {
            invincibility_ms: None,
            magnet_ms: None,
            base_duration_ms,
            level_bonus_ms,
        }
    }

    fn slot(&self, kind: PowerUpKind) -> &Option<f32> {
        match kind {
            PowerUpKind::Invincibility => &self.invincibility_ms,
            PowerUpKind::Magnet => &self.magnet_ms,
        }
    }

    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut Option<f32> {
        match kind {
            PowerUpKind::Invincibility => &mut self.invincibility_ms,
            PowerUpKind::Magnet => &mut self.magnet_ms,
        }
    }

    pub fn duration_for(&self, upgrade_level: u32) -> f32 {
        self.base_duration_ms + upgrade_level as f32 * self.level_bonus_ms
    }

    pub fn active(&self, kind: PowerUpKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn remaining(&self, kind: PowerUpKind) -> Option<f32> {
        *self.slot(kind)
    }

    /// Start (or restart) an effect. Re-acquiring resets the countdown; it never stacks.
    pub fn on_acquire(&mut self, kind: PowerUpKind, upgrade_level: u32) -> f32 {
        let duration = self.duration_for(upgrade_level);
        *self.slot_mut(kind) = Some(duration);
        duration
    }

    /// Count down every active effect; returns the kinds that expired this tick
    pub fn tick(&mut self, dt_ms: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = self.slot_mut(kind);
            if let Some(remaining) = slot.as_mut() {
                *remaining -= dt_ms;
                if *remaining <= 0.0 {
                    *slot = None;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        self.invincibility_ms = None;
        self.magnet_ms = None;
    }
}

/// Turbo meter, filled by coins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasGauge {
    level: u32,
    max: u32,
    per_coin: u32,
}

impl GasGauge {
    pub fn new(max: u32, per_coin: u32) -> Self {
        Self {
            level: 0,
            max,
            per_coin,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.level >= self.max
    }

    /// Fill fraction in [0, 1] for HUD bars
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            1.0
        } else {
            self.level as f32 / self.max as f32
        }
    }

    pub fn add_coin(&mut self) {
        self.level = (self.level + self.per_coin).min(self.max);
    }

    pub fn empty(&mut self) {
        self.level = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_scales_with_upgrade_level() {
        let mut tracker = PowerUpTracker::new(5000.0, 2000.0);
        assert_eq!(tracker.on_acquire(PowerUpKind::Magnet, 0), 5000.0);
        assert_eq!(tracker.on_acquire(PowerUpKind::Invincibility, 3), 11_000.0);
    }

    #[test]
    fn test_reacquire_restarts_not_stacks() {
        let mut tracker = PowerUpTracker::new(5000.0, 2000.0);
        tracker.on_acquire(PowerUpKind::Magnet, 0);
        tracker.tick(4000.0);
        tracker.on_acquire(PowerUpKind::Magnet, 0);
        assert_eq!(tracker.remaining(PowerUpKind::Magnet), Some(5000.0));
    }

    #[test]
    fn test_kinds_expire_independently() {
        let mut tracker = PowerUpTracker::new(5000.0, 2000.0);
        tracker.on_acquire(PowerUpKind::Magnet, 0);
        tracker.on_acquire(PowerUpKind::Invincibility, 1);
        assert_eq!(tracker.tick(5000.0), vec![PowerUpKind::Magnet]);
        assert!(tracker.active(PowerUpKind::Invincibility));
        assert_eq!(tracker.tick(2000.0), vec![PowerUpKind::Invincibility]);
        assert!(!tracker.active(PowerUpKind::Invincibility));
    }

    #[test]
    fn test_gauge_fills_and_caps() {
        let mut gas = GasGauge::new(100, 5);
        for _ in 0..19 {
            gas.add_coin();
        }
        assert!(!gas.is_full());
        gas.add_coin();
        gas.add_coin();
        assert!(gas.is_full());
        assert_eq!(gas.level(), 100);
        gas.empty();
        assert_eq!(gas.fraction(), 0.0);
    }
}
