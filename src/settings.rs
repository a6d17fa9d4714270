//! Player settings and preferences
//!
//! Persisted separately from the save record under its own storage key.

use serde::{Deserialize, Serialize};

use crate::platform::{Storage, SwipeDetector};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    /// Swipe distance multiplier; higher needs shorter swipes
    pub swipe_sensitivity: f32,

    // === Accessibility ===
    /// Reduced motion (no camera shake or stage flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            swipe_sensitivity: 1.0,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "gut_runner_settings";

    const MIN_SENSITIVITY: f32 = 0.25;
    const MAX_SENSITIVITY: f32 = 4.0;

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Camera shake on hits (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// Swipe detector configured with this sensitivity
    pub fn swipe_detector(&self) -> SwipeDetector {
        SwipeDetector::new(self.swipe_sensitivity)
    }

    fn sanitized(mut self) -> Self {
        if !self.swipe_sensitivity.is_finite() {
            self.swipe_sensitivity = 1.0;
        }
        self.swipe_sensitivity = self
            .swipe_sensitivity
            .clamp(Self::MIN_SENSITIVITY, Self::MAX_SENSITIVITY);
        self
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(storage: &impl Storage) -> Self {
        match storage.read(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Could not parse settings, using defaults: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged
    pub fn save(&self, storage: &mut impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.write(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}
