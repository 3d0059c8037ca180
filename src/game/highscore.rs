//! High score persistence with a Top 10 leaderboard.
//!
//! Scores are saved to a local JSON file in the user's data directory.
//! Storage problems are never fatal: a missing or corrupt file just means a
//! fresh leaderboard.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScores>();

    // Load high scores on startup
    app.add_systems(Startup, load_high_scores);
}

/// Maximum number of high scores to keep.
const MAX_HIGH_SCORES: usize = 10;

/// A score considered too absurd to be real. Corrupt files are clamped out
/// rather than trusted.
const MAX_SANE_SCORE: u32 = 9_999;

/// A single leaderboard entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub powerups_collected: u32,
}

impl ScoreEntry {
    pub fn new(score: u32, powerups_collected: u32) -> Self {
        Self {
            score,
            powerups_collected,
        }
    }
}

/// Resource holding the top 10 scores, best first.
#[derive(Resource, Debug, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// The best score ever recorded, 0 for a fresh leaderboard.
    pub fn best(&self) -> u32 {
        self.entries.first().map(|entry| entry.score).unwrap_or(0)
    }

    /// Would this score make the board?
    #[allow(dead_code)]
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|lowest| score > lowest.score)
            .unwrap_or(true)
    }

    /// Add an entry to the leaderboard if it qualifies.
    /// Returns true if the entry was added.
    pub fn record(&mut self, entry: ScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }

        // Insert in sorted position (descending by score)
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());

        if pos >= MAX_HIGH_SCORES {
            return false;
        }

        self.entries.insert(pos, entry);

        if self.entries.len() > MAX_HIGH_SCORES {
            self.entries.truncate(MAX_HIGH_SCORES);
        }

        true
    }

    /// Drop nonsense that may have come from a hand-edited or corrupt file.
    fn sanitize(mut self) -> Self {
        self.entries
            .retain(|entry| entry.score > 0 && entry.score <= MAX_SANE_SCORE);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self
    }

    /// Get the file path for storing high scores.
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("flappy-bird").join("highscores.json"))
    }

    /// Load high scores from disk.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for high scores");
            return Self::default();
        };

        if !path.exists() {
            info!("No high scores file found at {:?}, starting fresh", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HighScores>(&contents) {
                Ok(scores) => {
                    info!("Loaded high scores from {:?}", path);
                    scores.sanitize()
                }
                Err(e) => {
                    warn!("Failed to parse high scores: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read high scores file: {}", e);
                Self::default()
            }
        }
    }

    /// Save high scores to disk.
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for saving high scores");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create high scores directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => info!("Saved high scores to {:?}", path),
                Err(e) => warn!("Failed to write high scores: {}", e),
            },
            Err(e) => warn!("Failed to serialize high scores: {}", e),
        }
    }
}

/// Load high scores on startup.
fn load_high_scores(mut high_scores: ResMut<HighScores>) {
    *high_scores = HighScores::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_descending_order() {
        let mut scores = HighScores::default();
        assert!(scores.record(ScoreEntry::new(5, 0)));
        assert!(scores.record(ScoreEntry::new(12, 1)));
        assert!(scores.record(ScoreEntry::new(8, 0)));

        let order: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![12, 8, 5]);
        assert_eq!(scores.best(), 12);
    }

    #[test]
    fn zero_scores_never_qualify() {
        let mut scores = HighScores::default();
        assert!(!scores.qualifies(0));
        assert!(!scores.record(ScoreEntry::new(0, 0)));
        assert!(scores.entries.is_empty());
    }

    #[test]
    fn board_is_capped_at_ten() {
        let mut scores = HighScores::default();
        for score in 1..=15 {
            scores.record(ScoreEntry::new(score, 0));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.best(), 15);
        // The weakest surviving entry is 6: 1..=5 were pushed off.
        assert_eq!(scores.entries.last().unwrap().score, 6);

        assert!(!scores.qualifies(6));
        assert!(scores.qualifies(7));
        assert!(!scores.record(ScoreEntry::new(5, 0)));
    }

    #[test]
    fn sanitize_drops_corrupt_entries() {
        let scores = HighScores {
            entries: vec![
                ScoreEntry::new(3, 0),
                ScoreEntry::new(0, 0),
                ScoreEntry::new(50_000, 2),
                ScoreEntry::new(10, 1),
            ],
        }
        .sanitize();

        let order: Vec<u32> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![10, 3]);
    }
}
