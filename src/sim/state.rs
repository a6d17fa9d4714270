//! Run-session state and core simulation types
//!
//! Everything a single playthrough owns lives on [`RunSession`]. The session is
//! pure: it never touches storage or the host directly, it only queues
//! [`GameEvent`]s for whoever drives it.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboTracker;
use super::lane::LaneModel;
use super::locomotion::{Locomotion, Posture};
use super::powerup::{GasGauge, PowerUpKind, PowerUpTracker};
use super::spawn::SpawnScheduler;
use super::speed::SpeedController;
use super::stage::StageProgression;
use crate::tuning::Tuning;

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low hazard on the floor; jump over it
    Trap,
    /// Tall hazard; slide under it
    Spike,
}

impl ObstacleKind {
    pub fn is_low(&self) -> bool {
        matches!(self, ObstacleKind::Trap)
    }

    pub fn is_high(&self) -> bool {
        matches!(self, ObstacleKind::Spike)
    }
}

/// Anything the session spawned that the host must place on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Coin,
    PowerUp(PowerUpKind),
}

/// Food eaten before the run; each grants one bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Food {
    /// Faster start
    #[default]
    Beans,
    /// Longer turbo
    Chili,
    /// Wider magnet
    Onion,
}

impl Food {
    pub const ALL: [Food; 3] = [Food::Beans, Food::Chili, Food::Onion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Food::Beans => "beans",
            Food::Chili => "chili",
            Food::Onion => "onion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beans" => Some(Food::Beans),
            "chili" => Some(Food::Chili),
            "onion" => Some(Food::Onion),
            _ => None,
        }
    }

    pub fn start_speed(&self, tuning: &Tuning) -> f32 {
        match self {
            Food::Beans => tuning.base_speed * tuning.beans_speed_bonus,
            _ => tuning.base_speed,
        }
    }

    pub fn turbo_duration_ms(&self, tuning: &Tuning) -> f32 {
        match self {
            Food::Chili => tuning.chili_turbo_duration_ms,
            _ => tuning.turbo_duration_ms,
        }
    }

    pub fn magnet_range(&self, tuning: &Tuning) -> f32 {
        match self {
            Food::Onion => tuning.onion_magnet_range,
            _ => tuning.magnet_range,
        }
    }
}

/// Persistent upgrades and cosmetics snapshotted at session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub invincibility_level: u32,
    pub magnet_level: u32,
    pub cosmetic: String,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            invincibility_level: 0,
            magnet_level: 0,
            cosmetic: "default".to_string(),
        }
    }
}

impl Loadout {
    pub fn upgrade_level(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Invincibility => self.invincibility_level,
            PowerUpKind::Magnet => self.magnet_level,
        }
    }
}

/// A single entity placed by a spawn request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnedEntity {
    pub id: u32,
    pub kind: EntityKind,
    pub lane: u8,
    /// Vertical offset from the spawn line (negative is further up)
    pub y_offset: f32,
}

/// Cross-session counters the session reports deltas for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressCounter {
    CoinsCollected,
    TurboUsed,
}

/// Terminal result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub score: u64,
    pub distance: u64,
    pub currency: u64,
}

/// Events emitted by the session for presentation and persistence layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned(SpawnedEntity),
    /// Entity consumed by a collision; the host should remove it
    Destroyed { id: u32 },
    StageChanged { index: usize },
    MissionProgress { counter: ProgressCounter, delta: u64 },
    MissionCompleted { id: String, text: String, reward: u64 },
    PowerUpStarted { kind: PowerUpKind, duration_ms: f32 },
    PowerUpExpired { kind: PowerUpKind },
    TurboStarted { duration_ms: f32 },
    TurboEnded,
    SessionEnded(SessionRecord),
}

/// Magnet parameters while the effect is active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetField {
    /// Max vertical distance from the player
    pub range: f32,
    /// Fraction of the remaining offset closed per tick
    pub pull: f32,
}

/// One playthrough
#[derive(Debug, Clone)]
pub struct RunSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub food: Food,
    pub loadout: Loadout,
    pub tuning: Tuning,
    pub rng: Pcg32,

    pub lanes: LaneModel,
    pub locomotion: Locomotion,
    pub speed: SpeedController,
    pub spawner: SpawnScheduler,
    pub combo: ComboTracker,
    pub powerups: PowerUpTracker,
    pub gas: GasGauge,
    pub stages: StageProgression,

    pub distance: f32,
    pub score: f64,
    /// Coins collected this run
    pub currency: u64,
    /// Simulated time (ms)
    pub time_ms: f64,
    /// Live entities by id (ordered for determinism)
    pub entities: BTreeMap<u32, EntityKind>,

    record: Option<SessionRecord>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl RunSession {
    pub fn new(seed: u64, food: Food, loadout: Loadout, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            seed,
            food,
            loadout,
            rng: Pcg32::seed_from_u64(seed),

            lanes: LaneModel::new(tuning.lane_switch_ms),
            locomotion: Locomotion::new(tuning.jump_ms, tuning.slide_ms),
            speed: SpeedController::new(
                tuning.base_speed,
                food.start_speed(&tuning),
                tuning.max_speed,
                tuning.speed_increment,
                tuning.turbo_factor,
            ),
            spawner: SpawnScheduler::new(&tuning),
            combo: ComboTracker::new(tuning.combo_window_ms, tuning.max_multiplier),
            powerups: PowerUpTracker::new(tuning.powerup_duration_ms, tuning.powerup_level_bonus_ms),
            gas: GasGauge::new(tuning.gas_max, tuning.gas_per_coin),
            stages: StageProgression::new(tuning.stage_distance),

            distance: 0.0,
            score: 0.0,
            currency: 0,
            time_ms: 0.0,
            entities: BTreeMap::new(),

            record: None,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.record.is_some()
    }

    /// Terminal record, once the run has ended
    pub fn record(&self) -> Option<SessionRecord> {
        self.record
    }

    pub fn posture(&self) -> Posture {
        self.locomotion.posture()
    }

    pub fn multiplier(&self) -> u32 {
        self.combo.multiplier()
    }

    /// Obstacles are harmless under the invincibility power-up or during turbo
    pub fn is_invincible(&self) -> bool {
        self.powerups.active(PowerUpKind::Invincibility) || self.speed.turbo_active()
    }

    pub fn magnet_field(&self) -> Option<MagnetField> {
        if self.is_over() || !self.powerups.active(PowerUpKind::Magnet) {
            return None;
        }
        Some(MagnetField {
            range: self.food.magnet_range(&self.tuning),
            pull: self.tuning.magnet_pull,
        })
    }

    /// Fall speed (units/s) the host should give unmagnetized entities
    pub fn scroll_velocity(&self) -> f32 {
        if self.is_over() { 0.0 } else { self.speed.current() }
    }

    pub fn entity_kind(&self, id: u32) -> Option<EntityKind> {
        self.entities.get(&id).copied()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Peek at queued events without consuming them
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enter `Dead`: cancel every pending timer and emit the terminal record once
    pub fn end(&mut self) {
        if self.is_over() {
            return;
        }
        self.locomotion.kill();
        self.lanes.cancel();
        self.speed.cancel_turbo();
        self.powerups.clear();

        let record = SessionRecord {
            score: self.score.max(0.0).floor() as u64,
            distance: self.distance.max(0.0).floor() as u64,
            currency: self.currency,
        };
        self.record = Some(record);
        self.push_event(GameEvent::SessionEnded(record));
        log::info!(
            "Run over: score={} distance={}m beans={}",
            record.score,
            record.distance,
            record.currency
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_bonuses() {
        let tuning = Tuning::default();
        assert!((Food::Beans.start_speed(&tuning) - 720.0).abs() < 0.001);
        assert_eq!(Food::Onion.start_speed(&tuning), 600.0);
        assert_eq!(Food::Chili.turbo_duration_ms(&tuning), 8000.0);
        assert_eq!(Food::Beans.turbo_duration_ms(&tuning), 5000.0);
        assert_eq!(Food::Onion.magnet_range(&tuning), 600.0);
        assert_eq!(Food::Chili.magnet_range(&tuning), 400.0);
        assert_eq!(Food::from_str("ONION"), Some(Food::Onion));
        assert_eq!(Food::from_str("kale"), None);
    }

    #[test]
    fn test_end_emits_once() {
        let mut session = RunSession::new(1, Food::Onion, Loadout::default(), Tuning::default());
        session.score = 42.9;
        session.distance = 10.5;
        session.end();
        session.end();
        let ended: Vec<_> = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded(_)))
            .collect();
        assert_eq!(
            ended,
            vec![GameEvent::SessionEnded(SessionRecord {
                score: 42,
                distance: 10,
                currency: 0
            })]
        );
        assert_eq!(session.posture(), Posture::Dead);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut session = RunSession::new(1, Food::Beans, Loadout::default(), Tuning::default());
        let a = session.next_entity_id();
        let b = session.next_entity_id();
        assert!(b > a);
    }
}
