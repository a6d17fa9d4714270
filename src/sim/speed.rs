//! Forward speed ramp with a turbo overlay

use serde::{Deserialize, Serialize};

/// Active turbo window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turbo {
    /// Speed to restore when the window closes
    pub pre_turbo_speed: f32,
    pub remaining_ms: f32,
}

/// Result of a speed tick, for event reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurboTransition {
    None,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedController {
    current: f32,
    base: f32,
    cap: f32,
    /// Units/s gained per second outside turbo
    increment: f32,
    factor: f32,
    turbo: Option<Turbo>,
}

impl SpeedController {
    /// `start` may exceed `base` (food bonus); it is clamped to `cap`.
    pub fn new(base: f32, start: f32, cap: f32, increment: f32, factor: f32) -> Self {
        Self {
            current: start.min(cap),
            base,
            cap,
            increment,
            factor,
            turbo: None,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// Current speed relative to base (drives tempo-scaling collaborators)
    pub fn speed_ratio(&self) -> f32 {
        self.current / self.base
    }

    pub fn turbo(&self) -> Option<&Turbo> {
        self.turbo.as_ref()
    }

    pub fn turbo_active(&self) -> bool {
        self.turbo.is_some()
    }

    pub fn tick(&mut self, dt_ms: f32) -> TurboTransition {
        match self.turbo.as_mut() {
            None => {
                self.current = (self.current + self.increment * dt_ms / 1000.0).min(self.cap);
                TurboTransition::None
            }
            Some(turbo) => {
                turbo.remaining_ms -= dt_ms;
                if turbo.remaining_ms <= 0.0 {
                    self.deactivate_turbo();
                    TurboTransition::Ended
                } else {
                    TurboTransition::None
                }
            }
        }
    }

    /// Multiply speed for `duration_ms`. Ignored while a turbo is already running.
    pub fn activate_turbo(&mut self, duration_ms: f32) -> bool {
        if self.turbo.is_some() {
            return false;
        }
        self.turbo = Some(Turbo {
            pre_turbo_speed: self.current,
            remaining_ms: duration_ms,
        });
        self.current *= self.factor;
        true
    }

    /// Restore the pre-turbo speed. No-op if turbo is inactive.
    pub fn deactivate_turbo(&mut self) -> bool {
        match self.turbo.take() {
            Some(turbo) => {
                self.current = turbo.pre_turbo_speed;
                true
            }
            None => false,
        }
    }

    /// Drop the turbo window without touching speed (session end freezes everything)
    pub fn cancel_turbo(&mut self) {
        self.turbo = None;
    }
}
