//! Cross-session missions
//!
//! The session only reports generic progress (coin counters, stage indices).
//! This table decides which mission each one feeds.

use crate::sim::ProgressCounter;

/// What advances a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionTrigger {
    Counter(ProgressCounter),
    /// Reaching the stage with this index
    StageReached(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mission {
    pub id: &'static str,
    pub description: &'static str,
    pub goal: u64,
    /// Currency granted on completion
    pub reward: u64,
    pub trigger: MissionTrigger,
    /// Toast shown when the mission completes
    pub toast: &'static str,
}

pub const MISSIONS: [Mission; 3] = [
    Mission {
        id: "collect_beans_total",
        description: "Raccogli 1000 fagioli totali",
        goal: 1000,
        reward: 500,
        trigger: MissionTrigger::Counter(ProgressCounter::CoinsCollected),
        toast: "Bean Master! (+500)",
    },
    Mission {
        id: "reach_stomach",
        description: "Raggiungi lo Stomaco",
        goal: 1,
        reward: 200,
        trigger: MissionTrigger::StageReached(1),
        toast: "Stomach Reached! (+200)",
    },
    Mission {
        id: "reach_intestine_c",
        description: "Raggiungi l'Intestino Crasso",
        goal: 1,
        reward: 1000,
        trigger: MissionTrigger::StageReached(3),
        toast: "Large Intestine! (+1000)",
    },
];

pub fn find(id: &str) -> Option<&'static Mission> {
    MISSIONS.iter().find(|m| m.id == id)
}

/// Missions fed by a progress counter
pub fn for_counter(counter: ProgressCounter) -> impl Iterator<Item = &'static Mission> {
    MISSIONS
        .iter()
        .filter(move |m| m.trigger == MissionTrigger::Counter(counter))
}

/// Missions completed by entering a stage
pub fn for_stage(index: usize) -> impl Iterator<Item = &'static Mission> {
    MISSIONS
        .iter()
        .filter(move |m| m.trigger == MissionTrigger::StageReached(index))
}

/// Whether advancing from `old` to `new` crosses the goal for the first time
pub fn completes(mission: &Mission, old: u64, new: u64) -> bool {
    old < mission.goal && new >= mission.goal
}

/// Missions not yet completed, given a progress lookup
pub fn active<F: Fn(&str) -> u64>(progress: F) -> Vec<&'static Mission> {
    MISSIONS.iter().filter(|m| progress(m.id) < m.goal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let ids: Vec<&str> = for_stage(1).map(|m| m.id).collect();
        assert_eq!(ids, vec!["reach_stomach"]);
        assert_eq!(for_stage(2).count(), 0);
        assert_eq!(for_stage(3).next().map(|m| m.reward), Some(1000));
    }

    #[test]
    fn test_counter_mapping() {
        let ids: Vec<&str> = for_counter(ProgressCounter::CoinsCollected).map(|m| m.id).collect();
        assert_eq!(ids, vec!["collect_beans_total"]);
        assert_eq!(for_counter(ProgressCounter::TurboUsed).count(), 0);
    }

    #[test]
    fn test_completes_once() {
        let m = find("collect_beans_total").unwrap();
        assert!(!completes(m, 998, 999));
        assert!(completes(m, 999, 1000));
        assert!(!completes(m, 1000, 1001));
    }

    #[test]
    fn test_active_filters_completed() {
        let active = active(|id| if id == "reach_stomach" { 1 } else { 0 });
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|m| m.id != "reach_stomach"));
    }
}
