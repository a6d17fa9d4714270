//! High score leaderboard
//!
//! Stored inside the save record; keeps the top 10 runs by score.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    /// Distance reached (meters)
    pub distance: u64,
    /// Display date, formatted by the host when recorded
    #[serde(default)]
    pub date: String,
}

/// Top runs, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rank a score would achieve (1-indexed, None if it would be cut)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        // Ties rank below existing entries
        let rank = self.entries.iter().position(|e| score > e.score).unwrap_or(self.entries.len()) + 1;
        (rank <= MAX_HIGH_SCORES).then_some(rank)
    }

    /// Add a run. Returns the rank achieved (1-indexed) or None if it fell off the table.
    pub fn add(&mut self, score: u64, distance: u64, date: impl Into<String>) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            LeaderboardEntry {
                score,
                distance,
                date: date.into(),
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Restore ordering and size after loading untrusted data
    pub fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_capped() {
        let mut board = Leaderboard::new();
        for score in [50, 10, 90, 30, 70, 20, 80, 40, 60, 100, 5, 55] {
            board.add(score, score / 2, "today");
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![100, 90, 80, 70, 60, 55, 50, 40, 30, 20]);
        assert_eq!(board.top_score(), Some(100));
    }

    #[test]
    fn test_rank_reporting() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add(0, 0, ""), Some(1));
        assert_eq!(board.add(100, 10, ""), Some(1));
        assert_eq!(board.add(50, 5, ""), Some(2));
        // Ties go below the existing entry
        assert_eq!(board.add(50, 6, ""), Some(3));
        assert_eq!(board.entries[2].distance, 6);
    }

    #[test]
    fn test_full_board_rejects_low_score() {
        let mut board = Leaderboard::new();
        for score in 1..=10 {
            board.add(score * 10, 0, "");
        }
        assert_eq!(board.potential_rank(10), None);
        assert_eq!(board.add(5, 0, ""), None);
        assert_eq!(board.add(15, 0, ""), Some(10));
        assert_eq!(board.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_normalize_untrusted() {
        let mut board: Leaderboard =
            serde_json::from_str(r#"[{"score":1,"distance":1},{"score":9,"distance":2,"date":"x"}]"#).unwrap();
        board.normalize();
        assert_eq!(board.top_score(), Some(9));
        assert_eq!(board.entries[1].date, "");
    }
}
