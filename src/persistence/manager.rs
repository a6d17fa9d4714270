//! Save record access over a storage backend
//!
//! The record is loaded once and written through on every mutation. Storage
//! failures are logged and absorbed; they never reach gameplay.

use super::save::{SAVE_KEY, SaveData};
use super::{Persistence, SessionOutcome};
use crate::missions;
use crate::platform::Storage;
use crate::sim::PowerUpKind;

pub struct SaveManager<S: Storage> {
    storage: S,
    data: SaveData,
    /// Produces the display date stored with leaderboard entries
    clock: fn() -> String,
}

impl<S: Storage> SaveManager<S> {
    /// Load the record from `storage`, falling back to defaults
    pub fn open(storage: S) -> Self {
        let data = Self::load(&storage);
        Self {
            storage,
            data,
            clock: crate::platform::today,
        }
    }

    /// Replace the date source (tests, replays)
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    fn load(storage: &S) -> SaveData {
        match storage.read(SAVE_KEY) {
            Ok(Some(json)) => match SaveData::from_json(&json) {
                Some(data) => {
                    log::info!("Loaded save data ({} beans)", data.coins);
                    data
                }
                None => SaveData::default(),
            },
            Ok(None) => {
                log::info!("No save data found, starting fresh");
                SaveData::default()
            }
            Err(e) => {
                log::warn!("Could not read save data: {}", e);
                SaveData::default()
            }
        }
    }

    /// Write the record; failures are logged and swallowed
    pub fn save(&mut self) {
        match self.data.to_json() {
            Ok(json) => {
                if let Err(e) = self.storage.write(SAVE_KEY, &json) {
                    log::warn!("Could not save data: {}", e);
                }
            }
            Err(e) => log::warn!("Could not serialize save data: {}", e),
        }
    }

    pub fn data(&self) -> &SaveData {
        &self.data
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn coins(&self) -> u64 {
        self.data.coins
    }

    /// Returns true if `score` is a new high score
    pub fn update_high_score(&mut self, score: u64) -> bool {
        if score > self.data.high_score {
            self.data.high_score = score;
            self.save();
            true
        } else {
            false
        }
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.data.coins = self.data.coins.saturating_add(amount);
        self.save();
    }

    /// Deduct `amount` if affordable; balance is untouched otherwise
    pub fn spend_coins(&mut self, amount: u64) -> bool {
        if self.data.coins >= amount {
            self.data.coins -= amount;
            self.save();
            true
        } else {
            false
        }
    }

    pub fn is_skin_unlocked(&self, id: &str) -> bool {
        self.data.unlocked_skins.iter().any(|s| s == id)
    }

    pub fn unlock_skin(&mut self, id: &str) {
        if !self.is_skin_unlocked(id) {
            self.data.unlocked_skins.push(id.to_string());
            self.save();
        }
    }

    /// Equip an unlocked skin; returns false if it is locked
    pub fn equip_skin(&mut self, id: &str) -> bool {
        if !self.is_skin_unlocked(id) {
            return false;
        }
        self.data.equipped_skin = id.to_string();
        self.save();
        true
    }

    /// Pay `cost` and raise the upgrade one level
    pub fn purchase_upgrade(&mut self, kind: PowerUpKind, cost: u64) -> bool {
        if self.data.coins < cost {
            return false;
        }
        self.data.coins -= cost;
        *self.data.upgrades.level_mut(kind) += 1;
        self.save();
        true
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.data.audio_enabled = enabled;
        self.save();
    }

    /// Insert into the leaderboard; returns the rank if the run made the table
    pub fn add_leaderboard_entry(&mut self, score: u64, distance: u64) -> Option<usize> {
        let date = (self.clock)();
        let rank = self.data.leaderboard.add(score, distance, date);
        self.save();
        rank
    }

    pub fn mission_progress(&self, id: &str) -> u64 {
        self.data.mission_progress(id)
    }

    /// Add to a mission counter; returns the new value
    pub fn update_mission_progress(&mut self, id: &str, delta: u64) -> u64 {
        let entry = self.data.missions.entry(id.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
        let value = *entry;
        self.save();
        value
    }
}

impl<S: Storage> Persistence for SaveManager<S> {
    fn upgrade_level(&self, kind: PowerUpKind) -> u32 {
        self.data.upgrades.level(kind)
    }

    fn equipped_cosmetic(&self) -> String {
        self.data.equipped_skin.clone()
    }

    fn add_currency(&mut self, amount: u64) {
        self.add_coins(amount);
    }

    fn report_mission_progress(&mut self, id: &str, delta: u64) -> bool {
        let old = self.mission_progress(id);
        let new = self.update_mission_progress(id, delta);
        match missions::find(id) {
            Some(mission) if missions::completes(mission, old, new) => {
                log::info!("Mission complete: {} (+{})", mission.id, mission.reward);
                self.add_coins(mission.reward);
                true
            }
            _ => false,
        }
    }

    fn record_session_result(&mut self, score: u64, distance: u64) -> SessionOutcome {
        let leaderboard_rank = self.add_leaderboard_entry(score, distance);
        let is_new_high_score = self.update_high_score(score);
        SessionOutcome {
            is_new_high_score,
            leaderboard_rank,
        }
    }
}
