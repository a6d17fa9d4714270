//! Versioned save record
//!
//! Load is an additive merge: every field has a default, unknown fields are
//! ignored, and anything unreadable falls back to a fresh record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::highscores::Leaderboard;
use crate::sim::PowerUpKind;

/// Storage key for the save record
pub const SAVE_KEY: &str = "gut_runner_save_v1";
/// Current record layout version
pub const SAVE_VERSION: u32 = 1;
/// Skin every player owns
pub const DEFAULT_SKIN: &str = "default";

/// Purchased duration upgrades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub invincibility_level: u32,
    pub magnet_level: u32,
}

impl Upgrades {
    pub fn level(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Invincibility => self.invincibility_level,
            PowerUpKind::Magnet => self.magnet_level,
        }
    }

    pub fn level_mut(&mut self, kind: PowerUpKind) -> &mut u32 {
        match kind {
            PowerUpKind::Invincibility => &mut self.invincibility_level,
            PowerUpKind::Magnet => &mut self.magnet_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    pub high_score: u64,
    /// Spendable currency
    pub coins: u64,
    pub unlocked_skins: Vec<String>,
    pub equipped_skin: String,
    pub audio_enabled: bool,
    pub upgrades: Upgrades,
    pub leaderboard: Leaderboard,
    /// Mission id -> progress
    pub missions: BTreeMap<String, u64>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            high_score: 0,
            coins: 0,
            unlocked_skins: vec![DEFAULT_SKIN.to_string()],
            equipped_skin: DEFAULT_SKIN.to_string(),
            audio_enabled: true,
            upgrades: Upgrades::default(),
            leaderboard: Leaderboard::new(),
            missions: BTreeMap::new(),
        }
    }
}

impl SaveData {
    /// Parse a stored record, merging over defaults. Corrupt input yields `None`.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<SaveData>(json) {
            Ok(data) => Some(data.repaired()),
            Err(e) => {
                log::warn!("Could not read save data: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Fix up invariants a hand-edited or older record may break
    fn repaired(mut self) -> Self {
        if self.version < SAVE_VERSION {
            log::info!("Migrating save data v{} -> v{}", self.version, SAVE_VERSION);
            self.version = SAVE_VERSION;
        }
        if !self.unlocked_skins.iter().any(|s| s == DEFAULT_SKIN) {
            self.unlocked_skins.insert(0, DEFAULT_SKIN.to_string());
        }
        if !self.unlocked_skins.contains(&self.equipped_skin) {
            self.equipped_skin = DEFAULT_SKIN.to_string();
        }
        self.leaderboard.normalize();
        self
    }

    pub fn mission_progress(&self, id: &str) -> u64 {
        self.missions.get(id).copied().unwrap_or(0)
    }
}
