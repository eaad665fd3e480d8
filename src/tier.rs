use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty mode. Each tier fixes how long a round lasts and which symbols
/// can show up.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifficultyTier {
    #[default]
    Normal,
    Hard,
    Hardcore,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Normal,
        DifficultyTier::Hard,
        DifficultyTier::Hardcore,
    ];

    /// Milliseconds the player has to hit a target.
    pub fn round_duration_ms(&self) -> u64 {
        match self {
            DifficultyTier::Normal => 2000,
            DifficultyTier::Hard => 1000,
            DifficultyTier::Hardcore => 700,
        }
    }

    /// Scales remaining milliseconds into a 0..=100 progress value.
    pub fn timer_tick_divisor(&self) -> u64 {
        match self {
            DifficultyTier::Normal => 20,
            DifficultyTier::Hard => 10,
            DifficultyTier::Hardcore => 7,
        }
    }

    /// Next tier in display order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            DifficultyTier::Normal => DifficultyTier::Hard,
            DifficultyTier::Hard => DifficultyTier::Hardcore,
            DifficultyTier::Hardcore => DifficultyTier::Normal,
        }
    }
}
