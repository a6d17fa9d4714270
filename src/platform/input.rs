//! Keyboard and swipe mapping to player intents

use crate::sim::Intent;

/// Map a `KeyboardEvent.key` / `code` value to an intent
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowLeft" | "a" | "A" | "KeyA" => Some(Intent::Left),
        "ArrowRight" | "d" | "D" | "KeyD" => Some(Intent::Right),
        "ArrowUp" | "w" | "W" | "KeyW" => Some(Intent::Jump),
        "ArrowDown" | "s" | "S" | "KeyS" => Some(Intent::Slide),
        " " | "Space" | "Spacebar" => Some(Intent::Turbo),
        _ => None,
    }
}

/// Minimum swipe length in pixels at sensitivity 1.0
pub const SWIPE_MIN_DISTANCE: f32 = 20.0;
/// Swipes slower than this are ignored (ms)
pub const SWIPE_MAX_TIME_MS: f64 = 500.0;

/// Turns pointer down/up pairs into directional intents
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    min_distance: f32,
    max_time_ms: f64,
    start: Option<(f32, f32, f64)>,
}

impl SwipeDetector {
    /// Higher sensitivity means shorter swipes register
    pub fn new(sensitivity: f32) -> Self {
        Self {
            min_distance: SWIPE_MIN_DISTANCE / sensitivity.max(0.1),
            max_time_ms: SWIPE_MAX_TIME_MS,
            start: None,
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
        self.start = Some((x, y, time_ms));
    }

    /// Pointer left the surface; forget the gesture
    pub fn cancel(&mut self) {
        self.start = None;
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, time_ms: f64) -> Option<Intent> {
        let (sx, sy, st) = self.start.take()?;
        let dx = x - sx;
        let dy = y - sy;
        if time_ms - st >= self.max_time_ms || dx.abs().max(dy.abs()) <= self.min_distance {
            return None;
        }
        // Screen y grows downward
        let intent = if dx.abs() > dy.abs() {
            if dx > 0.0 { Intent::Right } else { Intent::Left }
        } else if dy > 0.0 {
            Intent::Slide
        } else {
            Intent::Jump
        };
        Some(intent)
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(intent_for_key("ArrowLeft"), Some(Intent::Left));
        assert_eq!(intent_for_key("KeyD"), Some(Intent::Right));
        assert_eq!(intent_for_key("w"), Some(Intent::Jump));
        assert_eq!(intent_for_key("ArrowDown"), Some(Intent::Slide));
        assert_eq!(intent_for_key(" "), Some(Intent::Turbo));
        assert_eq!(intent_for_key("Enter"), None);
    }

    #[test]
    fn test_swipe_directions() {
        let mut swipe = SwipeDetector::default();
        swipe.pointer_down(100.0, 100.0, 0.0);
        assert_eq!(swipe.pointer_up(160.0, 110.0, 100.0), Some(Intent::Right));
        swipe.pointer_down(100.0, 100.0, 0.0);
        assert_eq!(swipe.pointer_up(100.0, 40.0, 100.0), Some(Intent::Jump));
        swipe.pointer_down(100.0, 100.0, 0.0);
        assert_eq!(swipe.pointer_up(95.0, 180.0, 100.0), Some(Intent::Slide));
    }

    #[test]
    fn test_swipe_rejects_short_slow_or_cancelled() {
        let mut swipe = SwipeDetector::default();
        swipe.pointer_down(0.0, 0.0, 0.0);
        assert_eq!(swipe.pointer_up(10.0, 0.0, 50.0), None);
        swipe.pointer_down(0.0, 0.0, 0.0);
        assert_eq!(swipe.pointer_up(100.0, 0.0, 600.0), None);
        swipe.pointer_down(0.0, 0.0, 0.0);
        swipe.cancel();
        assert_eq!(swipe.pointer_up(100.0, 0.0, 10.0), None);
    }

    #[test]
    fn test_sensitivity_shortens_threshold() {
        let mut swipe = SwipeDetector::new(2.0);
        swipe.pointer_down(0.0, 0.0, 0.0);
        assert_eq!(swipe.pointer_up(-15.0, 0.0, 50.0), Some(Intent::Left));
    }
}
