use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::KeyValueStore;
use crate::tier::DifficultyTier;

/// Store key of the running score.
pub const SCORE_KEY: &str = "score";
/// Store key of the per-tier high score record.
pub const HIGH_SCORE_KEY: &str = "highScore";
pub const HIGH_SCORE_VERSION: u32 = 1;

fn current_version() -> u32 {
    HIGH_SCORE_VERSION
}

/// Best score per tier, persisted as one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub normal: u32,
    #[serde(default)]
    pub hard: u32,
    #[serde(default)]
    pub hardcore: u32,
}

impl Default for HighScores {
    fn default() -> Self {
        Self {
            version: HIGH_SCORE_VERSION,
            normal: 0,
            hard: 0,
            hardcore: 0,
        }
    }
}

impl HighScores {
    pub fn get(&self, tier: DifficultyTier) -> u32 {
        match tier {
            DifficultyTier::Normal => self.normal,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Hardcore => self.hardcore,
        }
    }

    /// Raises the tier's record to `score` if it beats it. Returns true when
    /// the record changed.
    pub fn raise(&mut self, tier: DifficultyTier, score: u32) -> bool {
        let slot = match tier {
            DifficultyTier::Normal => &mut self.normal,
            DifficultyTier::Hard => &mut self.hard,
            DifficultyTier::Hardcore => &mut self.hardcore,
        };
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let mut scores: HighScores = store.get(HIGH_SCORE_KEY, HighScores::default());
        scores.version = HIGH_SCORE_VERSION;
        scores
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<()> {
        store.set(HIGH_SCORE_KEY, self)
    }
}

pub fn load_score<S: KeyValueStore>(store: &S) -> u32 {
    store.get(SCORE_KEY, 0u32)
}

pub fn save_score<S: KeyValueStore>(store: &mut S, score: u32) -> Result<()> {
    store.set(SCORE_KEY, &score)
}
