//! Save/load persistence
//!
//! Features:
//! - Versioned JSON record with additive merge on load
//! - Write-through `SaveManager` over any [`Storage`](crate::platform::Storage)
//! - Corruption recovery (unreadable records fall back to defaults)

pub mod manager;
pub mod save;

pub use manager::SaveManager;
pub use save::{SAVE_KEY, SaveData, Upgrades};

use crate::sim::{Loadout, PowerUpKind};

/// Result of recording a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub is_new_high_score: bool,
    /// 1-indexed leaderboard position, if the run made the table
    pub leaderboard_rank: Option<usize>,
}

/// What the run host needs from persistent storage
pub trait Persistence {
    fn upgrade_level(&self, kind: PowerUpKind) -> u32;
    fn equipped_cosmetic(&self) -> String;
    fn add_currency(&mut self, amount: u64);
    /// Advance a mission counter; true if this delta completed the mission
    fn report_mission_progress(&mut self, id: &str, delta: u64) -> bool;
    fn record_session_result(&mut self, score: u64, distance: u64) -> SessionOutcome;

    /// Snapshot of upgrades and cosmetics for a new session
    fn loadout(&self) -> Loadout {
        Loadout {
            invincibility_level: self.upgrade_level(PowerUpKind::Invincibility),
            magnet_level: self.upgrade_level(PowerUpKind::Magnet),
            cosmetic: self.equipped_cosmetic(),
        }
    }
}
