//! Player posture state machine with timed auto-recovery

use serde::{Deserialize, Serialize};

/// Vertical posture of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Posture {
    #[default]
    Running,
    /// Airborne; clears low obstacles
    Jumping,
    /// Ducked; passes under high obstacles
    Sliding,
    /// Terminal
    Dead,
}

/// Posture plus the countdown that returns a timed posture to `Running`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    posture: Posture,
    revert_ms: Option<f32>,
    jump_ms: f32,
    slide_ms: f32,
}

impl Locomotion {
    pub fn new(jump_ms: f32, slide_ms: f32) -> Self {
        Self {
            posture: Posture::Running,
            revert_ms: None,
            jump_ms,
            slide_ms,
        }
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn is_dead(&self) -> bool {
        self.posture == Posture::Dead
    }

    /// Time left before a jump/slide ends
    pub fn revert_remaining(&self) -> Option<f32> {
        self.revert_ms
    }

    pub fn jump(&mut self) -> bool {
        self.enter_timed(Posture::Jumping, self.jump_ms)
    }

    pub fn slide(&mut self) -> bool {
        self.enter_timed(Posture::Sliding, self.slide_ms)
    }

    fn enter_timed(&mut self, posture: Posture, duration_ms: f32) -> bool {
        if self.posture != Posture::Running {
            return false;
        }
        self.posture = posture;
        self.revert_ms = Some(duration_ms);
        true
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if let Some(remaining) = self.revert_ms.as_mut() {
            *remaining -= dt_ms;
            if *remaining <= 0.0 {
                self.revert_ms = None;
                if matches!(self.posture, Posture::Jumping | Posture::Sliding) {
                    self.posture = Posture::Running;
                }
            }
        }
    }

    /// Enter `Dead`, cancelling any pending revert so nothing can resurrect `Running`
    pub fn kill(&mut self) {
        self.revert_ms = None;
        self.posture = Posture::Dead;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_reverts_after_duration() {
        let mut loco = Locomotion::new(700.0, 600.0);
        assert!(loco.jump());
        loco.tick(699.0);
        assert_eq!(loco.posture(), Posture::Jumping);
        loco.tick(1.0);
        assert_eq!(loco.posture(), Posture::Running);
    }

    #[test]
    fn test_slide_rejected_while_jumping() {
        let mut loco = Locomotion::new(700.0, 600.0);
        assert!(loco.jump());
        assert!(!loco.slide());
        assert_eq!(loco.posture(), Posture::Jumping);
    }

    #[test]
    fn test_death_cancels_revert() {
        let mut loco = Locomotion::new(700.0, 600.0);
        loco.slide();
        loco.kill();
        assert!(loco.revert_remaining().is_none());
        loco.tick(10_000.0);
        assert_eq!(loco.posture(), Posture::Dead);
        assert!(!loco.jump());
        assert!(!loco.slide());
    }
}
