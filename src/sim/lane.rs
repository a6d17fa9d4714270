//! Lane occupancy and lane-change transitions

use serde::{Deserialize, Serialize};

use crate::consts::{LANE_COUNT, LANE_POSITIONS, START_LANE};

/// Direction of a lane shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Left,
    Right,
}

/// In-flight lane change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct LaneTransition {
    target: u8,
    remaining_ms: f32,
}

/// Which lane the player occupies, plus at most one shift in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneModel {
    current: u8,
    transition: Option<LaneTransition>,
    duration_ms: f32,
}

impl LaneModel {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            current: START_LANE,
            transition: None,
            duration_ms: duration_ms.max(0.0),
        }
    }

    /// Lane the player is settled in (updates when a shift completes)
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Lane a shift in flight is heading to, if any
    pub fn target(&self) -> Option<u8> {
        self.transition.map(|t| t.target)
    }

    pub fn in_flight(&self) -> bool {
        self.transition.is_some()
    }

    /// Begin a shift. Dropped if one is already in flight or the target is off the track.
    pub fn request_shift(&mut self, dir: Shift) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let target = match dir {
            Shift::Left if self.current > 0 => self.current - 1,
            Shift::Right if self.current + 1 < LANE_COUNT => self.current + 1,
            _ => return false,
        };
        self.transition = Some(LaneTransition {
            target,
            remaining_ms: self.duration_ms,
        });
        true
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if let Some(t) = self.transition.as_mut() {
            t.remaining_ms -= dt_ms;
            if t.remaining_ms <= 0.0 {
                self.current = t.target;
                self.transition = None;
            }
        }
    }

    /// Abort any in-flight shift, staying in the current lane
    pub fn cancel(&mut self) {
        self.transition = None;
    }

    /// Horizontal offset from the field center, interpolated during a shift
    pub fn x_offset(&self) -> f32 {
        let from = LANE_POSITIONS[self.current as usize];
        match self.transition {
            Some(t) if self.duration_ms > 0.0 => {
                let to = LANE_POSITIONS[t.target as usize];
                let progress = 1.0 - (t.remaining_ms / self.duration_ms).clamp(0.0, 1.0);
                from + (to - from) * progress
            }
            _ => from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shift_completes_after_duration() {
        let mut lanes = LaneModel::new(150.0);
        assert_eq!(lanes.current(), 1);
        assert!(lanes.request_shift(Shift::Left));
        lanes.tick(100.0);
        assert_eq!(lanes.current(), 1);
        assert!(lanes.in_flight());
        lanes.tick(50.0);
        assert_eq!(lanes.current(), 0);
        assert!(!lanes.in_flight());
    }

    #[test]
    fn test_concurrent_shift_is_dropped() {
        let mut lanes = LaneModel::new(150.0);
        assert!(lanes.request_shift(Shift::Right));
        assert!(!lanes.request_shift(Shift::Left));
        lanes.tick(150.0);
        assert_eq!(lanes.current(), 2);
        assert!(lanes.target().is_none());
    }

    #[test]
    fn test_out_of_range_shift_is_noop() {
        let mut lanes = LaneModel::new(150.0);
        lanes.request_shift(Shift::Right);
        lanes.tick(150.0);
        assert!(!lanes.request_shift(Shift::Right));
        assert!(!lanes.in_flight());
        assert_eq!(lanes.current(), 2);
    }

    #[test]
    fn test_x_offset_interpolates() {
        let mut lanes = LaneModel::new(100.0);
        assert_eq!(lanes.x_offset(), 0.0);
        lanes.request_shift(Shift::Right);
        lanes.tick(50.0);
        assert!((lanes.x_offset() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_cancel_keeps_lane() {
        let mut lanes = LaneModel::new(150.0);
        lanes.request_shift(Shift::Left);
        lanes.cancel();
        lanes.tick(500.0);
        assert_eq!(lanes.current(), 1);
    }

    proptest! {
        #[test]
        fn prop_lane_stays_in_range(ops in prop::collection::vec((any::<bool>(), 0.0f32..200.0), 0..64)) {
            let mut lanes = LaneModel::new(150.0);
            for (left, dt) in ops {
                lanes.request_shift(if left { Shift::Left } else { Shift::Right });
                lanes.tick(dt);
                prop_assert!(lanes.current() < LANE_COUNT);
                if let Some(target) = lanes.target() {
                    prop_assert!(target < LANE_COUNT);
                }
            }
        }
    }
}
