//! Deterministic run-session simulation
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Every timer is a countdown advanced by `tick`
//! - Seeded RNG only
//! - Stable iteration order (entities keyed by ID)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod combo;
pub mod lane;
pub mod locomotion;
pub mod powerup;
pub mod spawn;
pub mod speed;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::{CollisionEffect, magnet_pull, resolve};
pub use combo::ComboTracker;
pub use lane::{LaneModel, Shift};
pub use locomotion::{Locomotion, Posture};
pub use powerup::{GasGauge, PowerUpKind, PowerUpTracker};
pub use spawn::{SpawnRequest, SpawnScheduler};
pub use speed::SpeedController;
pub use stage::{STAGES, StageProgression};
pub use state::{
    EntityKind, Food, GameEvent, Loadout, MagnetField, ObstacleKind, ProgressCounter, RunSession,
    SessionRecord, SpawnedEntity,
};
pub use tick::{Intent, TickInput, apply_overlap, despawn, tick, try_turbo};
