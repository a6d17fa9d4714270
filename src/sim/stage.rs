//! Distance-gated cycle through the digestive stages

use serde::{Deserialize, Serialize};

/// Themed segments of the run, in order
pub const STAGES: [&str; 4] = ["Esofago", "Stomaco", "Intestino Tenue", "Intestino Crasso"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgression {
    index: usize,
    last_transition_distance: f32,
    threshold: f32,
    /// Total transitions so far (grows without wrapping)
    transitions: u32,
}

impl StageProgression {
    pub fn new(threshold: f32) -> Self {
        Self {
            index: 0,
            last_transition_distance: 0.0,
            threshold,
            transitions: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        STAGES[self.index]
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn last_transition_distance(&self) -> f32 {
        self.last_transition_distance
    }

    /// Advance at most one stage; returns the new index when a transition happened
    pub fn tick(&mut self, distance: f32) -> Option<usize> {
        if distance - self.last_transition_distance >= self.threshold {
            self.index = (self.index + 1) % STAGES.len();
            self.last_transition_distance = distance;
            self.transitions += 1;
            Some(self.index)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_at_threshold() {
        let mut stages = StageProgression::new(1000.0);
        assert_eq!(stages.tick(999.9), None);
        assert_eq!(stages.tick(1000.0), Some(1));
        assert_eq!(stages.name(), "Stomaco");
        // Next threshold is relative to the transition point
        assert_eq!(stages.tick(1999.0), None);
        assert_eq!(stages.tick(2000.0), Some(2));
    }

    #[test]
    fn test_wraps_around() {
        let mut stages = StageProgression::new(1000.0);
        for i in 1..=4 {
            stages.tick(i as f32 * 1000.0);
        }
        assert_eq!(stages.index(), 0);
        assert_eq!(stages.transitions(), 4);
    }
}
