//! Per-tick orchestration of a run session
//!
//! Order within a tick: intents, lane/posture countdowns, speed, distance and
//! score, stage check, combo decay, spawning, power-up expiry, then the
//! overlaps and despawns the host reported.

use serde::{Deserialize, Serialize};

use super::collision::{CollisionEffect, resolve};
use super::lane::Shift;
use super::spawn::SpawnRequest;
use super::speed::TurboTransition;
use super::state::{EntityKind, GameEvent, ProgressCounter, RunSession, SpawnedEntity};
use crate::consts::DISTANCE_SCALE;

/// Discrete player intents delivered by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Left,
    Right,
    Jump,
    Slide,
    Turbo,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub slide: bool,
    /// Turbo requested (honored only with a full gas gauge)
    pub turbo: bool,
    /// Entity ids the host found overlapping the player
    pub overlaps: Vec<u32>,
    /// Entity ids that scrolled off the bottom of the field
    pub despawned: Vec<u32>,
}

impl TickInput {
    pub fn push_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Left => self.left = true,
            Intent::Right => self.right = true,
            Intent::Jump => self.jump = true,
            Intent::Slide => self.slide = true,
            Intent::Turbo => self.turbo = true,
        }
    }

    /// Clear one-shot intents after they have been consumed
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Advance the session by `dt_ms` milliseconds
pub fn tick(session: &mut RunSession, input: &TickInput, dt_ms: f32) {
    if session.is_over() {
        return;
    }
    let dt_ms = dt_ms.max(0.0);
    session.time_ms += dt_ms as f64;

    apply_intents(session, input);

    session.lanes.tick(dt_ms);
    session.locomotion.tick(dt_ms);

    if session.speed.tick(dt_ms) == TurboTransition::Ended {
        log::info!("Turbo over, speed back to {:.0}", session.speed.current());
        session.push_event(GameEvent::TurboEnded);
    }

    let multiplier = session.combo.multiplier() as f64;
    session.distance += session.speed.current() * dt_ms / DISTANCE_SCALE;
    session.score += session.tuning.passive_score_rate * multiplier * (dt_ms as f64 / 1000.0);

    if let Some(index) = session.stages.tick(session.distance) {
        log::info!(
            "Entered stage {} ({}) at {:.0}m",
            index,
            session.stages.name(),
            session.distance
        );
        session.push_event(GameEvent::StageChanged { index });
    }

    session.combo.tick(dt_ms);

    let base = session.speed.base();
    let current = session.speed.current();
    let requests = session.spawner.tick(dt_ms, base, current, &mut session.rng);
    for request in requests {
        spawn(session, request);
    }

    for kind in session.powerups.tick(dt_ms) {
        session.push_event(GameEvent::PowerUpExpired { kind });
    }

    for &id in &input.overlaps {
        if session.is_over() {
            break;
        }
        apply_overlap(session, id);
    }

    if !session.is_over() {
        for &id in &input.despawned {
            despawn(session, id);
        }
    }
}

fn apply_intents(session: &mut RunSession, input: &TickInput) {
    if input.left {
        session.lanes.request_shift(Shift::Left);
    }
    if input.right {
        session.lanes.request_shift(Shift::Right);
    }
    if input.jump {
        session.locomotion.jump();
    }
    if input.slide {
        session.locomotion.slide();
    }
    if input.turbo {
        try_turbo(session);
    }
}

/// Start turbo if the gauge is full and no turbo is running
pub fn try_turbo(session: &mut RunSession) -> bool {
    if session.is_over() || !session.gas.is_full() || session.speed.turbo_active() {
        return false;
    }
    let duration_ms = session.food.turbo_duration_ms(&session.tuning);
    if !session.speed.activate_turbo(duration_ms) {
        return false;
    }
    session.gas.empty();
    log::info!("Turbo! speed {:.0} for {}ms", session.speed.current(), duration_ms);
    session.push_event(GameEvent::TurboStarted { duration_ms });
    session.push_event(GameEvent::MissionProgress {
        counter: ProgressCounter::TurboUsed,
        delta: 1,
    });
    true
}

fn spawn(session: &mut RunSession, request: SpawnRequest) {
    log::debug!("Spawn {:?}", request);
    match request {
        SpawnRequest::Obstacle { lane, kind } => {
            place(session, EntityKind::Obstacle(kind), lane, 0.0);
        }
        SpawnRequest::PowerUp { lane, kind } => {
            place(session, EntityKind::PowerUp(kind), lane, 0.0);
        }
        SpawnRequest::CoinRun { lane, count, spacing } => {
            for i in 0..count {
                place(session, EntityKind::Coin, lane, -(i as f32) * spacing);
            }
        }
    }
}

fn place(session: &mut RunSession, kind: EntityKind, lane: u8, y_offset: f32) {
    let id = session.next_entity_id();
    session.entities.insert(id, kind);
    session.push_event(GameEvent::Spawned(SpawnedEntity {
        id,
        kind,
        lane,
        y_offset,
    }));
}

/// Resolve the player overlapping entity `id` and apply the effect.
///
/// Unknown ids (already consumed, or never spawned) are ignored.
pub fn apply_overlap(session: &mut RunSession, id: u32) -> Option<CollisionEffect> {
    if session.is_over() {
        return None;
    }
    let kind = session.entity_kind(id)?;
    let effect = resolve(kind, session.posture(), session.is_invincible());

    if effect.destroys_entity() {
        session.entities.remove(&id);
        session.push_event(GameEvent::Destroyed { id });
    }

    match effect {
        CollisionEffect::Ignore | CollisionEffect::Smash => {}
        CollisionEffect::Kill => session.end(),
        CollisionEffect::CollectCoin => collect_coin(session),
        CollisionEffect::CollectPowerUp(kind) => {
            let level = session.loadout.upgrade_level(kind);
            let duration_ms = session.powerups.on_acquire(kind, level);
            session.push_event(GameEvent::PowerUpStarted { kind, duration_ms });
        }
    }
    Some(effect)
}

fn collect_coin(session: &mut RunSession) {
    let multiplier = session.combo.on_pickup();
    session.score += session.tuning.coin_score * multiplier as f64;
    session.currency += session.tuning.coin_value;
    if !session.speed.turbo_active() {
        session.gas.add_coin();
    }
    session.push_event(GameEvent::MissionProgress {
        counter: ProgressCounter::CoinsCollected,
        delta: 1,
    });
}

/// Entity left the field; obstacles dodged this way earn a bonus
pub fn despawn(session: &mut RunSession, id: u32) {
    if session.is_over() {
        return;
    }
    if let Some(EntityKind::Obstacle(_)) = session.entities.remove(&id) {
        session.score += session.tuning.dodge_bonus;
    }
}
