//! Collision resolution rules and magnet pull
//!
//! Overlap detection belongs to the host (axis-aligned boxes). Given an
//! overlap, [`resolve`] decides what it means for the run without touching
//! any state, so the rule table can be tested on its own.

use glam::Vec2;

use super::locomotion::Posture;
use super::powerup::PowerUpKind;
use super::state::{EntityKind, MagnetField};

/// Outcome of the player overlapping an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEffect {
    /// Nothing happens; the entity stays on the field
    Ignore,
    /// Obstacle destroyed with no state change
    Smash,
    /// Run ends
    Kill,
    /// Coin consumed: score, combo, currency, gas
    CollectCoin,
    /// Power-up consumed and started
    CollectPowerUp(PowerUpKind),
}

impl CollisionEffect {
    /// Whether the host should remove the entity
    pub fn destroys_entity(&self) -> bool {
        matches!(
            self,
            CollisionEffect::Smash | CollisionEffect::CollectCoin | CollisionEffect::CollectPowerUp(_)
        )
    }
}

/// Decide the effect of touching `kind` in the given posture
pub fn resolve(kind: EntityKind, posture: Posture, invincible: bool) -> CollisionEffect {
    if posture == Posture::Dead {
        return CollisionEffect::Ignore;
    }
    match kind {
        EntityKind::Obstacle(obstacle) => {
            if invincible {
                CollisionEffect::Smash
            } else if posture == Posture::Jumping && obstacle.is_low() {
                CollisionEffect::Ignore
            } else if posture == Posture::Sliding && obstacle.is_high() {
                CollisionEffect::Ignore
            } else {
                CollisionEffect::Kill
            }
        }
        EntityKind::Coin => CollisionEffect::CollectCoin,
        EntityKind::PowerUp(power) => CollisionEffect::CollectPowerUp(power),
    }
}

/// Pull a coin toward the player if it is within the field's vertical range.
///
/// Returns true when the coin was magnetized this tick; its fall velocity
/// should then be zeroed by the caller.
pub fn magnet_pull(field: &MagnetField, player: Vec2, coin: &mut Vec2) -> bool {
    let offset = player - *coin;
    if offset.y.abs() < field.range {
        *coin += offset * field.pull;
        true
    } else {
        false
    }
}
